//! Schedule calculator for study plans.
//!
//! This module turns a plan request into a day-by-day study schedule:
//! - Derives per-subject hour targets from a difficulty heuristic
//! - Scales all targets down uniformly when the available time is short
//! - Distributes hours across days proportionally to remaining need
//!
//! The distribution visits subjects in request order and stops a day early
//! once its budget is exhausted to within [`DAILY_BUDGET_EPSILON`], so
//! subjects late in the list can receive nothing on a tight day. That
//! order dependence is part of the heuristic's contract.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::plan::{round_hours, Difficulty};

/// Hour floor at which a day's allocation loop stops early.
pub const DAILY_BUDGET_EPSILON: f64 = 0.1;

/// Baseline hours assumed per subject before the difficulty multiplier.
pub const BASE_SUBJECT_HOURS: f64 = 20.0;

/// Request to compute a schedule. Subjects are assumed distinct; their
/// order determines allocation order on every day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub subjects: Vec<String>,
    pub exam_date: NaiveDate,
    pub daily_hours: f64,
    /// Per-subject difficulty; subjects missing here default to medium.
    #[serde(default)]
    pub difficulties: HashMap<String, Difficulty>,
}

impl PlanRequest {
    pub fn new(subjects: Vec<String>, exam_date: NaiveDate, daily_hours: f64) -> Self {
        Self {
            subjects,
            exam_date,
            daily_hours,
            difficulties: HashMap::new(),
        }
    }

    pub fn difficulty_for(&self, subject: &str) -> Difficulty {
        self.difficulties.get(subject).copied().unwrap_or_default()
    }
}

/// One planned study unit produced by the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedEntry {
    pub study_date: NaiveDate,
    pub subject: String,
    pub hours: f64,
}

/// Full calculator output, including the intermediate figures callers
/// display alongside the schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputedPlan {
    pub subjects: Vec<String>,
    pub exam_date: NaiveDate,
    pub daily_hours: f64,
    pub available_days: i64,
    /// Per-subject targets after feasibility scaling.
    pub subject_hours: HashMap<String, f64>,
    /// Sum of targets before feasibility scaling.
    pub total_hours_needed: f64,
    pub total_available_hours: f64,
    pub entries: Vec<PlannedEntry>,
}

impl ComputedPlan {
    /// Target hours for one subject after feasibility scaling.
    pub fn target_for(&self, subject: &str) -> f64 {
        self.subject_hours.get(subject).copied().unwrap_or(0.0)
    }
}

/// Calculator tuning knobs.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Baseline hours per subject before the difficulty multiplier.
    pub base_subject_hours: f64,
    /// Budget floor that ends a day's allocation pass.
    pub budget_epsilon: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            base_subject_hours: BASE_SUBJECT_HOURS,
            budget_epsilon: DAILY_BUDGET_EPSILON,
        }
    }
}

/// Deterministic schedule calculator.
pub struct ScheduleCalculator {
    config: CalculatorConfig,
}

impl ScheduleCalculator {
    /// Create a new calculator with default config
    pub fn new() -> Self {
        Self {
            config: CalculatorConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Compute the full schedule for a request.
    ///
    /// # Arguments
    /// * `request` - Subjects, exam date, daily budget, difficulties
    /// * `today` - Planning start date; entries run from this date
    ///
    /// # Returns
    /// The computed plan with per-subject targets and entry list.
    ///
    /// # Errors
    /// Empty subject list or a non-finite/non-positive daily budget.
    pub fn compute(&self, request: &PlanRequest, today: NaiveDate) -> Result<ComputedPlan> {
        // 1. Validate inputs
        if request.subjects.is_empty() {
            return Err(ValidationError::Empty("subjects".into()).into());
        }
        if !request.daily_hours.is_finite() || request.daily_hours <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "daily_hours".into(),
                message: format!("must be a positive number of hours, got {}", request.daily_hours),
            }
            .into());
        }

        // 2. Available days, floored at one so an imminent exam still plans
        let mut available_days = (request.exam_date - today).num_days();
        if available_days <= 0 {
            available_days = 1;
        }

        // 3. Per-subject targets from the difficulty heuristic
        let mut targets: Vec<f64> = request
            .subjects
            .iter()
            .map(|s| self.config.base_subject_hours * request.difficulty_for(s).multiplier())
            .collect();
        let total_hours_needed: f64 = targets.iter().sum();

        // 4. Feasibility scaling when available time is short
        let total_available_hours = available_days as f64 * request.daily_hours;
        if total_available_hours < total_hours_needed {
            let scaling_factor = total_available_hours / total_hours_needed;
            for target in &mut targets {
                *target *= scaling_factor;
            }
        }

        // 5. Distribute hours day by day
        let entries = self.distribute(&request.subjects, &targets, available_days, request.daily_hours, today);

        let subject_hours = request
            .subjects
            .iter()
            .cloned()
            .zip(targets.iter().copied())
            .collect();

        Ok(ComputedPlan {
            subjects: request.subjects.clone(),
            exam_date: request.exam_date,
            daily_hours: request.daily_hours,
            available_days,
            subject_hours,
            total_hours_needed,
            total_available_hours,
            entries,
        })
    }

    /// Spread subject targets across the available days proportionally to
    /// each subject's remaining need.
    fn distribute(
        &self,
        subjects: &[String],
        targets: &[f64],
        available_days: i64,
        daily_hours: f64,
        start_date: NaiveDate,
    ) -> Vec<PlannedEntry> {
        let mut entries = Vec::new();
        let mut progress = vec![0.0_f64; subjects.len()];

        for day_offset in 0..available_days {
            let study_date = start_date + Duration::days(day_offset);
            let mut remaining_daily_hours = daily_hours;

            // Subjects that still need hours, in request order
            let remaining: Vec<(usize, f64)> = targets
                .iter()
                .enumerate()
                .map(|(i, target)| (i, target - progress[i]))
                .filter(|(_, left)| *left > 0.0)
                .collect();

            if remaining.is_empty() {
                break; // All subjects covered
            }
            let total_remaining: f64 = remaining.iter().map(|(_, left)| left).sum();

            for (i, left) in remaining {
                let proportion = left / total_remaining;
                let allocated = remaining_daily_hours.min(round_hours(proportion * daily_hours));

                if allocated > 0.0 && remaining_daily_hours >= allocated {
                    entries.push(PlannedEntry {
                        study_date,
                        subject: subjects[i].clone(),
                        hours: allocated,
                    });
                    progress[i] += allocated;
                    remaining_daily_hours -= allocated;

                    // Day exhausted; later subjects get nothing today
                    if remaining_daily_hours <= self.config.budget_epsilon {
                        break;
                    }
                }
            }
        }

        entries
    }
}

impl Default for ScheduleCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_request(subjects: &[&str], exam: NaiveDate, daily: f64) -> PlanRequest {
        PlanRequest::new(subjects.iter().map(|s| s.to_string()).collect(), exam, daily)
    }

    #[test]
    fn two_medium_subjects_split_evenly() {
        let today = day(2025, 6, 1);
        let request = make_request(&["Math", "Physics"], day(2025, 6, 11), 4.0);

        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();

        assert_eq!(plan.available_days, 10);
        assert_eq!(plan.total_hours_needed, 40.0);
        assert_eq!(plan.total_available_hours, 40.0);
        // 40 needed vs 40 available: no scaling
        assert_eq!(plan.target_for("Math"), 20.0);
        assert_eq!(plan.target_for("Physics"), 20.0);

        assert_eq!(plan.entries.len(), 20);
        for entry in &plan.entries {
            assert_eq!(entry.hours, 2.0);
            assert!(entry.study_date >= today);
            assert!(entry.study_date < day(2025, 6, 11));
        }
        for offset in 0..10 {
            let date = today + Duration::days(offset);
            let day_total: f64 = plan
                .entries
                .iter()
                .filter(|e| e.study_date == date)
                .map(|e| e.hours)
                .sum();
            assert!(day_total <= 4.0 + 1e-9);
        }
    }

    #[test]
    fn infeasible_plan_scales_down() {
        let today = day(2025, 6, 1);
        let mut request = make_request(&["Bio"], day(2025, 6, 6), 2.0);
        request.difficulties.insert("Bio".into(), Difficulty::Hard);

        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();

        assert_eq!(plan.available_days, 5);
        assert_eq!(plan.total_hours_needed, 30.0);
        assert_eq!(plan.total_available_hours, 10.0);
        assert!((plan.target_for("Bio") - 10.0).abs() < 1e-9);

        assert_eq!(plan.entries.len(), 5);
        for entry in &plan.entries {
            assert_eq!(entry.hours, 2.0);
        }
    }

    #[test]
    fn exam_today_still_plans_one_day() {
        let today = day(2025, 6, 1);
        let request = make_request(&["Math"], today, 4.0);

        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();

        assert_eq!(plan.available_days, 1);
        assert_eq!(plan.entries.len(), 1);
        assert_eq!(plan.entries[0].study_date, today);
        assert_eq!(plan.entries[0].hours, 4.0);
    }

    #[test]
    fn exam_in_the_past_floors_to_one_day() {
        let today = day(2025, 6, 10);
        let request = make_request(&["Math"], day(2025, 6, 1), 3.0);

        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();
        assert_eq!(plan.available_days, 1);
        assert!(!plan.entries.is_empty());
    }

    #[test]
    fn empty_subjects_rejected() {
        let today = day(2025, 6, 1);
        let request = make_request(&[], day(2025, 6, 11), 4.0);
        assert!(ScheduleCalculator::new().compute(&request, today).is_err());
    }

    #[test]
    fn bad_daily_hours_rejected() {
        let today = day(2025, 6, 1);
        let exam = day(2025, 6, 11);
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let request = make_request(&["Math"], exam, bad);
            assert!(
                ScheduleCalculator::new().compute(&request, today).is_err(),
                "daily_hours {bad} should be rejected"
            );
        }
    }

    #[test]
    fn tight_budget_starves_later_subject() {
        let today = day(2025, 6, 1);
        let mut request = make_request(&["Deep", "Light"], day(2025, 6, 4), 0.25);
        request.difficulties.insert("Deep".into(), Difficulty::Hard);
        request.difficulties.insert("Light".into(), Difficulty::Easy);

        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();

        // Day one budget collapses below the epsilon after the first
        // allocation, so the easy subject gets nothing that day.
        let first_day: Vec<_> = plan
            .entries
            .iter()
            .filter(|e| e.study_date == today)
            .collect();
        assert_eq!(first_day.len(), 1);
        assert_eq!(first_day[0].subject, "Deep");
        assert!(plan.target_for("Light") > 0.0);
    }

    #[test]
    fn budget_epsilon_is_probeable() {
        let today = day(2025, 6, 1);
        let exam = day(2025, 6, 11);
        let request = make_request(&["A", "B"], exam, 2.0);

        // Default epsilon: both subjects fit on the first day.
        let plan = ScheduleCalculator::new().compute(&request, today).unwrap();
        let first_day = plan.entries.iter().filter(|e| e.study_date == today).count();
        assert_eq!(first_day, 2);

        // A whole-hour epsilon ends the day after the first allocation.
        let calculator = ScheduleCalculator::with_config(CalculatorConfig {
            budget_epsilon: 1.0,
            ..CalculatorConfig::default()
        });
        let plan = calculator.compute(&request, today).unwrap();
        let first_day = plan.entries.iter().filter(|e| e.study_date == today).count();
        assert_eq!(first_day, 1);
    }

    #[test]
    fn feasible_targets_never_exceed_available_time() {
        let today = day(2025, 6, 1);
        for (subjects, days, daily) in [
            (vec!["A", "B", "C"], 3, 2.5),
            (vec!["A"], 30, 1.0),
            (vec!["A", "B", "C", "D", "E"], 7, 6.0),
        ] {
            let request = make_request(&subjects, today + Duration::days(days), daily);
            let plan = ScheduleCalculator::new().compute(&request, today).unwrap();
            let target_sum: f64 = plan.subject_hours.values().sum();
            assert!(
                target_sum <= plan.total_available_hours + 1e-9,
                "targets {target_sum} exceed available {}",
                plan.total_available_hours
            );
        }
    }
}
