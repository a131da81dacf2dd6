//! Schedule adjuster for missed study days.
//!
//! Marks the missed day's entry and flattens the planned hours of all
//! strictly later entries to a uniform per-entry value, independent of
//! subject. The flattening discards the calculator's proportional shares;
//! it redistributes only what those later entries already held.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::plan::{round_hours, ScheduleEntry};

/// Which later entries a rebalance selects and rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebalanceScope {
    /// Only entries still pending.
    Pending,
    /// Every later entry regardless of status. Completed and missed
    /// entries get rewritten too, which is almost never what you want.
    AllFuture,
}

impl Default for RebalanceScope {
    fn default() -> Self {
        Self::Pending
    }
}

/// One rewritten entry, returned for display and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAdjustment {
    pub entry_id: String,
    pub study_date: NaiveDate,
    pub subject: String,
    pub original_hours: f64,
    pub new_hours: f64,
}

/// Result of a missed-day adjustment. Lookup misses are outcomes, not
/// errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustOutcome {
    /// No pending entry exists on the missed date; nothing changed.
    NotFound,
    /// The entry was marked missed but no later entry qualifies for
    /// rebalancing.
    NothingToRebalance { missed_entry_id: String },
    /// The entry was marked missed and the selected later entries were
    /// flattened.
    Rebalanced {
        missed_entry_id: String,
        adjustments: Vec<EntryAdjustment>,
    },
}

/// Rebalances a plan's schedule after a missed day.
pub struct ScheduleAdjuster {
    scope: RebalanceScope,
}

impl ScheduleAdjuster {
    /// Create a new adjuster with the default (pending-only) scope
    pub fn new() -> Self {
        Self {
            scope: RebalanceScope::default(),
        }
    }

    /// Create with an explicit scope
    pub fn with_scope(scope: RebalanceScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> RebalanceScope {
        self.scope
    }

    /// Mark the first pending entry on `missed_date` as missed, then
    /// flatten the planned hours of all strictly later entries in scope.
    ///
    /// Mutates `entries` in place; callers persist the change using the
    /// returned outcome. Running it twice for the same date is a no-op the
    /// second time (the entry is no longer pending).
    pub fn adjust_after_missed_day(
        &self,
        entries: &mut [ScheduleEntry],
        missed_date: NaiveDate,
    ) -> AdjustOutcome {
        // 1. Mark the missed day
        let missed_entry_id = match entries
            .iter_mut()
            .find(|e| e.study_date == missed_date && e.is_pending())
        {
            Some(entry) => {
                entry.missed = true;
                entry.id.clone()
            }
            None => return AdjustOutcome::NotFound,
        };

        // 2. Select strictly later entries in scope
        let selected: Vec<usize> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.study_date > missed_date)
            .filter(|(_, e)| match self.scope {
                RebalanceScope::Pending => e.is_pending(),
                RebalanceScope::AllFuture => true,
            })
            .map(|(i, _)| i)
            .collect();

        if selected.is_empty() {
            return AdjustOutcome::NothingToRebalance { missed_entry_id };
        }

        // 3. Flatten their planned hours to a uniform value
        let total_remaining_hours: f64 = selected.iter().map(|&i| entries[i].planned_hours).sum();
        let new_hours = round_hours(total_remaining_hours / selected.len() as f64);

        let mut adjustments = Vec::with_capacity(selected.len());
        for i in selected {
            let entry = &mut entries[i];
            adjustments.push(EntryAdjustment {
                entry_id: entry.id.clone(),
                study_date: entry.study_date,
                subject: entry.subject.clone(),
                original_hours: entry.planned_hours,
                new_hours,
            });
            entry.planned_hours = new_hours;
        }

        AdjustOutcome::Rebalanced {
            missed_entry_id,
            adjustments,
        }
    }
}

impl Default for ScheduleAdjuster {
    fn default() -> Self {
        Self::new()
    }
}
