use clap::Subcommand;
use studyplan_core::integrations::{openrouter, OpenRouterClient};
use studyplan_core::storage::{Config, PlannerDb};
use studyplan_core::{CoreError, StudyAdvisor, StudyPlanner, TextGenError};

#[derive(Subcommand)]
pub enum AdviceAction {
    /// Motivational tip for a plan's subject
    Tip {
        /// Plan ID
        plan_id: String,
    },
    /// Study advice tailored to a plan's difficulty and remaining work
    Subject {
        /// Plan ID
        plan_id: String,
    },
}

pub fn run(action: AdviceAction) -> Result<(), Box<dyn std::error::Error>> {
    let advisor = build_advisor(&Config::load_or_default());
    let db = PlannerDb::open()?;
    let planner = StudyPlanner::new(db);

    match action {
        AdviceAction::Tip { plan_id } => {
            let report = planner.progress(&plan_id)?;
            println!(
                "{}",
                advisor.motivational_tip(&report.subject, report.percent_complete)
            );
        }
        AdviceAction::Subject { plan_id } => {
            let plan = planner.plan(&plan_id)?;
            let report = planner.progress(&plan_id)?;
            println!(
                "{}",
                advisor.study_advice(
                    &plan.subject,
                    plan.difficulty,
                    report.remaining_days,
                    report.hours_left
                )
            );
        }
    }
    Ok(())
}

/// Build an advisor from config, degrading to the offline fallbacks when
/// the client cannot be constructed.
fn build_advisor(config: &Config) -> StudyAdvisor {
    if !config.advisor.enabled {
        return StudyAdvisor::offline();
    }
    match OpenRouterClient::from_config(&config.advisor) {
        Ok(client) => StudyAdvisor::new(Box::new(client)),
        Err(CoreError::TextGen(TextGenError::NotConfigured)) => {
            eprintln!(
                "warning: no OpenRouter API key; set {} or run `studyplan-cli auth openrouter login`",
                openrouter::API_KEY_ENV
            );
            StudyAdvisor::offline()
        }
        Err(e) => {
            eprintln!("warning: advisor unavailable ({e}); using built-in tips");
            StudyAdvisor::offline()
        }
    }
}
