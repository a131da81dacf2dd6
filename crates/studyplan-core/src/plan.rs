//! Domain model for study plans and their day-by-day schedules.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Subject difficulty. Drives the per-subject hour target via
/// [`Difficulty::multiplier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to the base subject hours.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 1.0,
            Self::Hard => 1.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Lenient parse: unknown values fall back to `Medium` (multiplier 1.0).
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// Lifecycle state of a stored plan. Managed by the store, never by the
/// scheduling engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Active,
    Archived,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Lenient parse: unknown values fall back to `Active`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

impl Default for PlanStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// A persisted study commitment for one subject: exam date, daily budget,
/// and the hour target computed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: String,
    pub user_id: i64,
    pub subject: String,
    pub exam_date: NaiveDate,
    pub daily_hours: f64,
    pub difficulty: Difficulty,
    /// Feasibility-adjusted target for this subject.
    pub total_hours: f64,
    /// Rollup of completed hours, kept in sync by the completion flow.
    pub completed_hours: f64,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

/// One (date, subject, planned-hours) unit of a plan.
///
/// `completed` and `missed` are mutually exclusive; an entry transitions at
/// most once from pending to one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub plan_id: String,
    pub study_date: NaiveDate,
    pub subject: String,
    pub planned_hours: f64,
    /// Hours actually studied, recorded on completion.
    pub actual_hours: f64,
    pub completed: bool,
    pub missed: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScheduleEntry {
    pub fn is_pending(&self) -> bool {
        !self.completed && !self.missed
    }
}

/// One logged study session, appended when an entry is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: String,
    pub plan_id: String,
    pub date: NaiveDate,
    pub subject: String,
    pub hours_completed: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parse an ISO `YYYY-MM-DD` calendar date.
pub fn parse_iso_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
}

/// Round hours to 2 decimals, the resolution used everywhere hours are
/// recorded.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
