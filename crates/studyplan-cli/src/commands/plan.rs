//! Study plan commands for CLI.

use std::collections::HashMap;

use clap::Subcommand;
use studyplan_core::plan::parse_iso_date;
use studyplan_core::storage::PlannerDb;
use studyplan_core::{Difficulty, PlanRequest, StudyPlanner};

#[derive(Subcommand)]
pub enum PlanAction {
    /// Create plans and a day-by-day schedule for a set of subjects
    Create {
        /// Comma-separated subjects (e.g. "Math,Physics")
        subjects: String,
        /// Exam date (YYYY-MM-DD)
        #[arg(long)]
        exam_date: String,
        /// Study hours available per day
        #[arg(long)]
        daily_hours: f64,
        /// Per-subject difficulty as subject=easy|medium|hard (repeatable)
        #[arg(long)]
        difficulty: Vec<String>,
        /// Print the created plans as JSON
        #[arg(long)]
        json: bool,
    },
    /// List active plans
    List {
        /// Print the plans as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show plan details
    Show {
        /// Plan ID
        id: String,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Archive a plan, hiding it from listings
    Archive {
        /// Plan ID
        id: String,
    },
}

pub fn run(action: PlanAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = PlannerDb::open()?;
    let planner = StudyPlanner::new(db);

    match action {
        PlanAction::Create {
            subjects,
            exam_date,
            daily_hours,
            difficulty,
            json,
        } => {
            let subjects: Vec<String> = subjects
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let mut request = PlanRequest::new(subjects, parse_iso_date(&exam_date)?, daily_hours);
            request.difficulties = parse_difficulties(&difficulty)?;

            let user_id = planner.default_user()?;
            let created = planner.create_plan(user_id, &request)?;

            if json {
                let out = serde_json::json!({
                    "plans": created.plans,
                    "computed": created.computed,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let c = &created.computed;
                println!(
                    "Created {} plan(s) over {} day(s):",
                    created.plans.len(),
                    c.available_days
                );
                for plan in &created.plans {
                    println!(
                        "  {}  {:<14} {:>6.1}h  ({})",
                        plan.id,
                        plan.subject,
                        plan.total_hours,
                        plan.difficulty.as_str()
                    );
                }
                if c.total_hours_needed > c.total_available_hours {
                    println!(
                        "note: targets scaled down to fit {:.1} available hours ({:.1} needed)",
                        c.total_available_hours, c.total_hours_needed
                    );
                }
                if let (Some(first), Some(last)) = (c.entries.first(), c.entries.last()) {
                    println!(
                        "{} schedule entries from {} to {}",
                        c.entries.len(),
                        first.study_date,
                        last.study_date
                    );
                }
            }
        }
        PlanAction::List { json } => {
            let user_id = planner.default_user()?;
            let plans = planner.list_plans(user_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&plans)?);
            } else if plans.is_empty() {
                println!("no active plans");
            } else {
                println!(
                    "{:<36}  {:<14} {:<10}  {:>7} {:>7}  {}",
                    "ID", "SUBJECT", "EXAM", "TARGET", "DONE", "DIFFICULTY"
                );
                for p in &plans {
                    println!(
                        "{:<36}  {:<14} {}  {:>6.1}h {:>6.1}h  {}",
                        p.id,
                        p.subject,
                        p.exam_date,
                        p.total_hours,
                        p.completed_hours,
                        p.difficulty.as_str()
                    );
                }
            }
        }
        PlanAction::Show { id, json } => {
            let plan = planner.plan(&id)?;
            let entries = planner.schedule(&plan.id, None)?;
            if json {
                let out = serde_json::json!({ "plan": plan, "entries": entries });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let done = entries.iter().filter(|e| e.completed).count();
                let missed = entries.iter().filter(|e| e.missed).count();
                println!("Subject:     {}", plan.subject);
                println!("Status:      {}", plan.status.as_str());
                println!("Difficulty:  {}", plan.difficulty.as_str());
                println!("Exam date:   {}", plan.exam_date);
                println!("Daily hours: {:.1}", plan.daily_hours);
                println!(
                    "Hours:       {:.1} of {:.1} completed",
                    plan.completed_hours, plan.total_hours
                );
                println!(
                    "Entries:     {} ({} done, {} missed, {} pending)",
                    entries.len(),
                    done,
                    missed,
                    entries.len() - done - missed
                );
            }
        }
        PlanAction::Archive { id } => {
            planner.archive_plan(&id)?;
            println!("Plan archived: {id}");
        }
    }
    Ok(())
}

fn parse_difficulties(pairs: &[String]) -> Result<HashMap<String, Difficulty>, String> {
    let mut map = HashMap::new();
    for pair in pairs {
        let (subject, level) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected subject=level, got '{pair}'"))?;
        map.insert(subject.trim().to_string(), Difficulty::parse(level));
    }
    Ok(map)
}
