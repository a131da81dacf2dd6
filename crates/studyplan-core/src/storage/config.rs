//! Application configuration, persisted as TOML.
//!
//! Covers the missed-day rebalance scope and the LLM advisor settings
//! (model, endpoint, ranking headers, timeout). The file lives at
//! `~/.config/studyplan/config.toml` and every field has a serde default,
//! so a partial or absent file always loads.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::adjuster::RebalanceScope;
use crate::error::{ConfigError, Result};

/// Schedule-planning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Which schedule entries a missed-day rebalance may rewrite.
    #[serde(default)]
    pub rebalance_scope: RebalanceScope,
}

/// LLM advisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_advisor_model")]
    pub model: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// HTTP-Referer sent to OpenRouter for app rankings (optional).
    #[serde(default)]
    pub referer: Option<String>,
    /// X-Title sent to OpenRouter for app rankings.
    #[serde(default = "default_advisor_title")]
    pub title: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_advisor_model() -> String {
    "qwen/qwen3-coder:free".into()
}
fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_advisor_title() -> String {
    "Study Planner".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            rebalance_scope: RebalanceScope::default(),
        }
    }
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_advisor_model(),
            api_base: default_api_base(),
            referer: None,
            title: default_advisor_title(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            advisor: AdvisorConfig::default(),
        }
    }
}

impl Config {
    /// Walk a dot-separated path through the JSON image of the config.
    fn value_at_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        key.split('.').try_fold(root, |node, part| node.get(part))
    }

    /// Overwrite the leaf named by `key`, keeping the field's JSON type.
    fn set_value_at_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };

        let mut node = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                node = node.get_mut(part).ok_or_else(unknown)?;
            }
        }
        let fields = node.as_object_mut().ok_or_else(unknown)?;
        let current = fields.get(leaf).ok_or_else(unknown)?;
        let replacement = Self::coerce_like(key, current, value)?;
        fields.insert(leaf.to_string(), replacement);
        Ok(())
    }

    /// Parse `value` into the same JSON type as `current`. Strings (and
    /// anything else) pass through verbatim.
    fn coerce_like(
        key: &str,
        current: &serde_json::Value,
        value: &str,
    ) -> std::result::Result<serde_json::Value, ConfigError> {
        use serde_json::Value;

        let bad = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let parsed = match current {
            Value::Bool(_) => Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| bad(format!("expected true or false, got '{value}'")))?,
            ),
            Value::Number(_) => match (value.parse::<u64>(), value.parse::<f64>()) {
                (Ok(n), _) => Value::Number(n.into()),
                (_, Ok(f)) => serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| bad(format!("expected a number, got '{value}'")))?,
                _ => return Err(bad(format!("expected a number, got '{value}'"))),
            },
            Value::Object(_) | Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| bad(e.to_string()))?
            }
            _ => Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Read the config file, writing out defaults when it is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed, or if the
    /// default file cannot be written.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path,
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Write the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Look up a value by dot-separated key, rendered as a string.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = Self::value_at_path(&json, key)?;
        Some(match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Update a value by dot-separated key and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key, a value that does not fit the
    /// field's type, or a failed write.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_value_at_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// Read the config, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
