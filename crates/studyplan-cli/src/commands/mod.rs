pub mod advice;
pub mod auth;
pub mod config;
pub mod plan;
pub mod progress;
pub mod schedule;
