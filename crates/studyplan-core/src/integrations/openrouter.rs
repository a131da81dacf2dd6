//! OpenRouter text generation -- chat-completions client for the advisor.
//!
//! The API key comes from the environment or the OS keyring, never from
//! source. The client owns a current-thread tokio runtime so callers get a
//! plain synchronous call.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tokio::runtime::Runtime;
use url::Url;

use crate::error::{ConfigError, Result, TextGenError};
use crate::integrations::{keyring_store, TextGenerator};
use crate::storage::config::AdvisorConfig;

/// Environment variable consulted before the OS keyring.
pub const API_KEY_ENV: &str = "STUDYPLAN_OPENROUTER_API_KEY";

/// Keyring entry holding the API key.
pub const API_KEY_ENTRY: &str = "openrouter_api_key";

pub struct OpenRouterClient {
    api_key: String,
    model: String,
    endpoint: Url,
    referer: Option<String>,
    title: String,
    client: Client,
    runtime: Runtime,
}

impl OpenRouterClient {
    /// Build a client from config, resolving the API key from
    /// [`API_KEY_ENV`] and then the OS keyring.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let api_key = resolve_api_key()?.ok_or(TextGenError::NotConfigured)?;
        Self::with_api_key(config, api_key)
    }

    /// Build a client with an explicit API key.
    pub fn with_api_key(config: &AdvisorConfig, api_key: String) -> Result<Self> {
        let endpoint = format!("{}/chat/completions", config.api_base.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| ConfigError::InvalidValue {
            key: "advisor.api_base".into(),
            message: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TextGenError::Request)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            endpoint,
            referer: config.referer.clone(),
            title: config.title.clone(),
            client,
            runtime,
        })
    }
}

impl TextGenerator for OpenRouterClient {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn generate_text(&self, prompt: &str) -> Result<String, TextGenError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt,
                }
            ],
        });

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");
        if let Some(referer) = &self.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if !self.title.is_empty() {
            request = request.header("X-Title", &self.title);
        }

        // reqwest's `send()` eagerly creates its timeout timer, so it must be
        // called from within the runtime context rather than as a `block_on`
        // argument.
        let resp = self
            .runtime
            .block_on(async { request.json(&body).send().await })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = self.runtime.block_on(resp.text()).unwrap_or_default();
            return Err(TextGenError::Status { status, message });
        }

        let body: serde_json::Value = self.runtime.block_on(resp.json())?;
        body.get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                TextGenError::MalformedResponse("no message content in choices".into())
            })
    }
}

/// Resolve the API key from the environment, then the OS keyring.
pub fn resolve_api_key() -> Result<Option<String>, TextGenError> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        let key = key.trim();
        if !key.is_empty() {
            return Ok(Some(key.to_string()));
        }
    }
    keyring_store::get(API_KEY_ENTRY).map_err(|e| TextGenError::Credentials(e.to_string()))
}
