//! Error types for studyplan-core.
//!
//! One top-level [`CoreError`] wraps a small enum per concern so callers
//! can match on the failure class without caring which collaborator
//! produced it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error for all core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed calendar date input
    #[error("invalid date: {0}")]
    DateParse(#[from] chrono::format::ParseError),

    /// Rejected input
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced plan or entry does not exist
    #[error("not found: {0}")]
    NotFound(String),

    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("text generation: {0}")]
    TextGen(#[from] TextGenError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// SQLite store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("schema migration failed: {0}")]
    MigrationFailed(String),
}

/// Config file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config at {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("cannot write config at {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// The value does not fit the key's type
    #[error("bad value for config key '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The dot-path names no known config field
    #[error("no such config key: {0}")]
    UnknownKey(String),
}

/// Text-generation errors. Always absorbed into fallback strings at the
/// advisor boundary; surfaced directly only by the raw client.
#[derive(Error, Debug)]
pub enum TextGenError {
    /// No API key available in the environment or credential store
    #[error("no API key configured for text generation")]
    NotConfigured,

    /// Credential store access failed
    #[error("credential store: {0}")]
    Credentials(String),

    /// Request could not be sent or completed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not contain generated text
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Input validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(String),

    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
