pub mod openrouter;

pub use openrouter::OpenRouterClient;

use crate::error::TextGenError;

/// Text-generation collaborator seam. The advisor talks to this trait so
/// the HTTP client can be swapped out in tests.
pub trait TextGenerator: Send + Sync {
    /// Short generator name for diagnostics.
    fn name(&self) -> &str;

    /// Generate text for a single prompt.
    fn generate_text(&self, prompt: &str) -> Result<String, TextGenError>;
}

/// Thin wrapper around the OS keyring for credential storage. Reads treat
/// an absent entry as `None`; deletes treat it as already done.
pub mod keyring_store {
    const SERVICE: &str = "studyplan";

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    fn entry(key: &str) -> Result<keyring::Entry> {
        Ok(keyring::Entry::new(SERVICE, key)?)
    }

    pub fn get(key: &str) -> Result<Option<String>> {
        match entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<()> {
        entry(key)?.set_password(value)?;
        Ok(())
    }

    pub fn delete(key: &str) -> Result<()> {
        match entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
