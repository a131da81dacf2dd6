//! Planner facade tying the scheduling engines to storage.
//!
//! `StudyPlanner` owns the database handle plus a calculator and an
//! adjuster, and applies engine outcomes transactionally.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::adjuster::{AdjustOutcome, RebalanceScope, ScheduleAdjuster};
use crate::calculator::{ComputedPlan, PlanRequest, ScheduleCalculator};
use crate::error::{CoreError, Result, ValidationError};
use crate::plan::{round_hours, PlanStatus, ProgressRecord, ScheduleEntry, StudyPlan};
use crate::progress::{self, ProgressReport};
use crate::storage::PlannerDb;

/// kv key holding the CLI's current user id.
const DEFAULT_USER_KEY: &str = "default_user";

/// Persisted result of plan creation: one plan row per subject plus the
/// computed schedule they came from.
#[derive(Debug, Clone)]
pub struct CreatedPlan {
    pub plans: Vec<StudyPlan>,
    pub computed: ComputedPlan,
}

/// Result of completing an entry: the updated row and the plan's new
/// logged-hours total.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub entry: ScheduleEntry,
    pub total_completed_hours: f64,
}

/// High-level planner API over the store and scheduling engines.
pub struct StudyPlanner {
    db: PlannerDb,
    calculator: ScheduleCalculator,
    adjuster: ScheduleAdjuster,
}

impl StudyPlanner {
    /// Create a planner with default engine settings.
    pub fn new(db: PlannerDb) -> Self {
        Self {
            db,
            calculator: ScheduleCalculator::new(),
            adjuster: ScheduleAdjuster::new(),
        }
    }

    /// Create a planner with an explicit rebalance scope.
    pub fn with_scope(db: PlannerDb, scope: RebalanceScope) -> Self {
        Self {
            db,
            calculator: ScheduleCalculator::new(),
            adjuster: ScheduleAdjuster::with_scope(scope),
        }
    }

    /// Get a reference to the underlying store.
    pub fn db(&self) -> &PlannerDb {
        &self.db
    }

    /// Resolve the current user from the kv store, creating a user row on
    /// first use.
    pub fn default_user(&self) -> Result<i64> {
        if let Some(raw) = self.db.kv_get(DEFAULT_USER_KEY)? {
            if let Ok(id) = raw.parse::<i64>() {
                return Ok(id);
            }
        }
        let id = self.db.create_user()?;
        self.db.kv_set(DEFAULT_USER_KEY, &id.to_string())?;
        Ok(id)
    }

    /// Compute and persist a schedule for a set of subjects.
    ///
    /// One plan row is stored per subject, carrying that subject's
    /// feasibility-adjusted target; each schedule entry links to its
    /// subject's plan row.
    pub fn create_plan(&self, user_id: i64, request: &PlanRequest) -> Result<CreatedPlan> {
        self.create_plan_on(user_id, request, Utc::now().date_naive())
    }

    /// Deterministic variant of [`create_plan`](Self::create_plan) taking
    /// the planning start date.
    pub fn create_plan_on(
        &self,
        user_id: i64,
        request: &PlanRequest,
        today: NaiveDate,
    ) -> Result<CreatedPlan> {
        let computed = self.calculator.compute(request, today)?;
        let now = Utc::now();

        // 1. One plan row per subject with its adjusted target
        let mut plans = Vec::with_capacity(computed.subjects.len());
        for subject in &computed.subjects {
            let plan = StudyPlan {
                id: Uuid::new_v4().to_string(),
                user_id,
                subject: subject.clone(),
                exam_date: computed.exam_date,
                daily_hours: computed.daily_hours,
                difficulty: request.difficulty_for(subject),
                total_hours: computed.target_for(subject),
                completed_hours: 0.0,
                status: PlanStatus::Active,
                created_at: now,
            };
            self.db.create_plan(&plan)?;
            plans.push(plan);
        }

        // 2. Entries, linked to their subject's plan row
        let mut entries = Vec::with_capacity(computed.entries.len());
        for planned in &computed.entries {
            let plan = plans
                .iter()
                .find(|p| p.subject == planned.subject)
                .ok_or_else(|| {
                    CoreError::NotFound(format!("plan for subject '{}'", planned.subject))
                })?;
            entries.push(ScheduleEntry {
                id: Uuid::new_v4().to_string(),
                plan_id: plan.id.clone(),
                study_date: planned.study_date,
                subject: planned.subject.clone(),
                planned_hours: planned.hours,
                actual_hours: 0.0,
                completed: false,
                missed: false,
                notes: None,
                created_at: now,
            });
        }
        self.db.create_schedule_entries(&entries)?;

        Ok(CreatedPlan { plans, computed })
    }

    /// Mark a plan's entry on `date` missed and rebalance the later
    /// entries. The mark and the hour rewrites land in one transaction.
    ///
    /// An absent plan id is an error; an absent pending entry on the date
    /// is the `NotFound` outcome.
    pub fn mark_day_missed(&self, plan_id: &str, date: NaiveDate) -> Result<AdjustOutcome> {
        if self.db.get_plan(plan_id)?.is_none() {
            return Err(CoreError::NotFound(format!("plan {plan_id}")));
        }

        let mut entries = self.db.get_schedule_entries(plan_id, None)?;
        let outcome = self.adjuster.adjust_after_missed_day(&mut entries, date);

        match &outcome {
            AdjustOutcome::NotFound => {}
            AdjustOutcome::NothingToRebalance { missed_entry_id } => {
                self.db.mark_entry_missed(missed_entry_id)?;
            }
            AdjustOutcome::Rebalanced {
                missed_entry_id,
                adjustments,
            } => {
                self.db
                    .apply_missed_day_adjustment(missed_entry_id, adjustments)?;
            }
        }
        Ok(outcome)
    }

    /// Complete a pending entry with the hours actually studied.
    ///
    /// In one transaction: marks the entry completed, appends a progress
    /// record dated with the entry's study date, and rolls the hours up
    /// into the plan.
    pub fn complete_entry(
        &self,
        entry_id: &str,
        actual_hours: f64,
        notes: Option<String>,
    ) -> Result<CompletionOutcome> {
        if !actual_hours.is_finite() || actual_hours < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "actual_hours".into(),
                message: format!("must be a non-negative number of hours, got {actual_hours}"),
            }
            .into());
        }

        let entry = self
            .db
            .get_schedule_entry(entry_id)?
            .ok_or_else(|| CoreError::NotFound(format!("schedule entry {entry_id}")))?;
        if !entry.is_pending() {
            return Err(ValidationError::InvalidValue {
                field: "entry".into(),
                message: "already completed or missed".into(),
            }
            .into());
        }

        let hours = round_hours(actual_hours);
        let record = ProgressRecord {
            id: Uuid::new_v4().to_string(),
            plan_id: entry.plan_id.clone(),
            date: entry.study_date,
            subject: entry.subject.clone(),
            hours_completed: hours,
            notes,
            created_at: Utc::now(),
        };
        self.db.apply_entry_completion(entry_id, hours, &record)?;

        let entry = self
            .db
            .get_schedule_entry(entry_id)?
            .ok_or_else(|| CoreError::NotFound(format!("schedule entry {entry_id}")))?;
        let total_completed_hours = self.db.sum_completed_hours(&entry.plan_id)?;
        Ok(CompletionOutcome {
            entry,
            total_completed_hours,
        })
    }

    /// Progress report for a plan, as of today.
    pub fn progress(&self, plan_id: &str) -> Result<ProgressReport> {
        self.progress_as_of(plan_id, Utc::now().date_naive())
    }

    /// Deterministic variant of [`progress`](Self::progress) taking the
    /// reporting date.
    pub fn progress_as_of(&self, plan_id: &str, today: NaiveDate) -> Result<ProgressReport> {
        let plan = self
            .db
            .get_plan(plan_id)?
            .ok_or_else(|| CoreError::NotFound(format!("plan {plan_id}")))?;
        let records = self.db.get_progress(plan_id)?;
        Ok(progress::summarize(&plan, &records, today))
    }

    /// A user's active plans, newest first.
    pub fn list_plans(&self, user_id: i64) -> Result<Vec<StudyPlan>> {
        Ok(self.db.list_active_plans(user_id)?)
    }

    /// Load one plan.
    pub fn plan(&self, plan_id: &str) -> Result<StudyPlan> {
        self.db
            .get_plan(plan_id)?
            .ok_or_else(|| CoreError::NotFound(format!("plan {plan_id}")))
    }

    /// A plan's entries in date order, optionally filtered to one date.
    pub fn schedule(
        &self,
        plan_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleEntry>> {
        if self.db.get_plan(plan_id)?.is_none() {
            return Err(CoreError::NotFound(format!("plan {plan_id}")));
        }
        Ok(self.db.get_schedule_entries(plan_id, date)?)
    }

    /// Archive a plan, hiding it from listings.
    pub fn archive_plan(&self, plan_id: &str) -> Result<()> {
        let plan = self.plan(plan_id)?;
        self.db.update_plan_status(&plan.id, PlanStatus::Archived)?;
        Ok(())
    }
}
