pub mod config;
pub mod planner_db;

pub use config::Config;
pub use planner_db::PlannerDb;

use std::path::PathBuf;

use crate::error::Result;

/// Resolve (and create) the directory holding the database and config.
///
/// Set STUDYPLAN_ENV=dev to keep development data separate.
pub fn data_dir() -> Result<PathBuf> {
    let name = match std::env::var("STUDYPLAN_ENV").as_deref() {
        Ok("dev") => "studyplan-dev",
        _ => "studyplan",
    };

    let dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(name);

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
