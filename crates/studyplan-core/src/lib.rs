//! # Studyplan Core Library
//!
//! This library provides the core business logic for the Studyplan study
//! scheduler. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary over the same core library.
//!
//! ## Architecture
//!
//! - **Calculator**: Deterministic exam-schedule generation from subjects,
//!   an exam date, and a daily hour budget
//! - **Adjuster**: Missed-day marking and flat rebalancing of the remaining
//!   schedule
//! - **Storage**: SQLite-based plan storage and TOML-based configuration
//! - **Advisor**: LLM-backed study tips with static fallbacks, over an
//!   OpenRouter-compatible API
//!
//! ## Key Components
//!
//! - [`ScheduleCalculator`]: Per-day, per-subject hour allocation
//! - [`ScheduleAdjuster`]: Missed-day rebalancing
//! - [`StudyPlanner`]: Facade applying engine outcomes to the store
//! - [`PlannerDb`]: Plan, schedule, and progress persistence
//! - [`Config`]: Application configuration management

pub mod adjuster;
pub mod advisor;
pub mod calculator;
pub mod error;
pub mod integrations;
pub mod plan;
pub mod planner;
pub mod progress;
pub mod storage;

pub use adjuster::{AdjustOutcome, EntryAdjustment, RebalanceScope, ScheduleAdjuster};
pub use advisor::StudyAdvisor;
pub use calculator::{ComputedPlan, PlanRequest, PlannedEntry, ScheduleCalculator};
pub use error::{ConfigError, CoreError, StoreError, TextGenError, ValidationError};
pub use plan::{Difficulty, PlanStatus, ProgressRecord, ScheduleEntry, StudyPlan};
pub use planner::{CompletionOutcome, CreatedPlan, StudyPlanner};
pub use progress::{ProgressPoint, ProgressReport};
pub use storage::{Config, PlannerDb};
