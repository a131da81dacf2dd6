//! Progress summaries for stored plans.
//!
//! Pure helpers over a plan and its logged study sessions; the facade
//! feeds them from the store and the CLI renders the result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::plan::{round_hours, ProgressRecord, StudyPlan};

/// One logged session with the running total up to and including it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub subject: String,
    pub hours: f64,
    pub cumulative_hours: f64,
}

/// Snapshot of a plan's progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub plan_id: String,
    pub subject: String,
    pub exam_date: NaiveDate,
    pub total_hours: f64,
    pub completed_hours: f64,
    /// 0 when the plan has no hour target.
    pub percent_complete: f64,
    /// Days until the exam, floored at 0.
    pub remaining_days: i64,
    pub hours_left: f64,
    pub series: Vec<ProgressPoint>,
}

/// Build a progress report from a plan and its records.
///
/// Records are expected in date order; the store returns them that way.
pub fn summarize(plan: &StudyPlan, records: &[ProgressRecord], today: NaiveDate) -> ProgressReport {
    // Sum from +0.0 explicitly: std's float `sum()` identity is -0.0, which
    // an empty record set would carry into output formatted as "-0.0".
    let completed_hours: f64 = records
        .iter()
        .map(|r| r.hours_completed)
        .fold(0.0, |acc, h| acc + h);
    let percent_complete = if plan.total_hours > 0.0 {
        completed_hours / plan.total_hours * 100.0
    } else {
        0.0
    };
    let remaining_days = (plan.exam_date - today).num_days().max(0);
    let hours_left = (plan.total_hours - completed_hours).max(0.0);

    let mut series = Vec::with_capacity(records.len());
    let mut running_total = 0.0;
    for record in records {
        running_total += record.hours_completed;
        series.push(ProgressPoint {
            date: record.date,
            subject: record.subject.clone(),
            hours: record.hours_completed,
            cumulative_hours: round_hours(running_total),
        });
    }

    ProgressReport {
        plan_id: plan.id.clone(),
        subject: plan.subject.clone(),
        exam_date: plan.exam_date,
        total_hours: plan.total_hours,
        completed_hours: round_hours(completed_hours),
        percent_complete,
        remaining_days,
        hours_left: round_hours(hours_left),
        series,
    }
}
