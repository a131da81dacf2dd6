use chrono::Utc;
use clap::Subcommand;
use studyplan_core::plan::parse_iso_date;
use studyplan_core::storage::{Config, PlannerDb};
use studyplan_core::{AdjustOutcome, RebalanceScope, ScheduleEntry, StudyPlanner};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show a plan's schedule
    Show {
        /// Plan ID
        plan_id: String,
        /// Only entries on this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show today's entries across all active plans
    Today {
        /// Print the entries as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a study day as missed and rebalance the remaining schedule
    Miss {
        /// Plan ID
        plan_id: String,
        /// Missed date (YYYY-MM-DD)
        date: String,
        /// Rewrite completed and missed later entries too
        #[arg(long)]
        all_future: bool,
    },
    /// Record the hours actually studied for an entry
    Complete {
        /// Entry ID
        entry_id: String,
        /// Hours actually studied
        hours: f64,
        /// Session notes
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlannerDb::open()?;

    match action {
        ScheduleAction::Show {
            plan_id,
            date,
            json,
        } => {
            let planner = StudyPlanner::new(db);
            let date = date.map(|d| parse_iso_date(&d)).transpose()?;
            let entries = planner.schedule(&plan_id, date)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("no entries");
            } else {
                print_entries(&entries);
            }
        }
        ScheduleAction::Today { json } => {
            let planner = StudyPlanner::new(db);
            let user_id = planner.default_user()?;
            let today = Utc::now().date_naive();
            let mut entries = Vec::new();
            for plan in planner.list_plans(user_id)? {
                entries.extend(planner.schedule(&plan.id, Some(today))?);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("nothing scheduled for {today}");
            } else {
                print_entries(&entries);
            }
        }
        ScheduleAction::Miss {
            plan_id,
            date,
            all_future,
        } => {
            let scope = if all_future {
                RebalanceScope::AllFuture
            } else {
                Config::load_or_default().planner.rebalance_scope
            };
            let planner = StudyPlanner::with_scope(db, scope);
            let date = parse_iso_date(&date)?;
            match planner.mark_day_missed(&plan_id, date)? {
                AdjustOutcome::NotFound => println!("no pending entry on {date}"),
                AdjustOutcome::NothingToRebalance { .. } => {
                    println!("marked {date} missed; no later entries to rebalance");
                }
                AdjustOutcome::Rebalanced { adjustments, .. } => {
                    println!(
                        "marked {date} missed; {} entries rebalanced:",
                        adjustments.len()
                    );
                    for adj in &adjustments {
                        println!(
                            "  {}  {:<14} {:>5.2}h -> {:>5.2}h",
                            adj.study_date, adj.subject, adj.original_hours, adj.new_hours
                        );
                    }
                }
            }
        }
        ScheduleAction::Complete {
            entry_id,
            hours,
            notes,
        } => {
            let planner = StudyPlanner::new(db);
            let outcome = planner.complete_entry(&entry_id, hours, notes)?;
            println!(
                "logged {:.2}h of {} on {} ({:.2}h total for the plan)",
                outcome.entry.actual_hours,
                outcome.entry.subject,
                outcome.entry.study_date,
                outcome.total_completed_hours
            );
        }
    }
    Ok(())
}

fn entry_status(entry: &ScheduleEntry) -> &'static str {
    if entry.completed {
        "done"
    } else if entry.missed {
        "missed"
    } else {
        "pending"
    }
}

fn print_entries(entries: &[ScheduleEntry]) {
    println!(
        "{:<36}  {:<10}  {:<14} {:>7}  {}",
        "ID", "DATE", "SUBJECT", "PLANNED", "STATUS"
    );
    for e in entries {
        println!(
            "{:<36}  {}  {:<14} {:>6.2}h  {}",
            e.id,
            e.study_date,
            e.subject,
            e.planned_hours,
            entry_status(e)
        );
    }
}
