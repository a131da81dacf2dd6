use clap::Subcommand;
use studyplan_core::integrations::keyring_store;
use studyplan_core::integrations::openrouter::{API_KEY_ENTRY, API_KEY_ENV};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Manage the OpenRouter API key
    Openrouter {
        #[command(subcommand)]
        action: AuthOp,
    },
}

#[derive(Subcommand)]
pub enum AuthOp {
    /// Save an API key to the OS keyring
    Login {
        /// OpenRouter API key
        #[arg(long)]
        token: Option<String>,
    },
    /// Delete the saved API key
    Logout,
    /// Report where the API key comes from, if anywhere
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Openrouter { action: op } => handle_openrouter(op),
    }
}

fn handle_openrouter(op: AuthOp) -> Result<(), Box<dyn std::error::Error>> {
    match op {
        AuthOp::Login { token } => {
            let tok = token.ok_or("--token required for OpenRouter")?;
            keyring_store::set(API_KEY_ENTRY, tok.trim())?;
            println!("OpenRouter API key stored");
        }
        AuthOp::Logout => {
            keyring_store::delete(API_KEY_ENTRY)?;
            println!("OpenRouter API key removed");
        }
        AuthOp::Status => {
            let env_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty());
            if env_key.is_some() {
                println!("configured via {API_KEY_ENV}");
            } else if keyring_store::get(API_KEY_ENTRY)?.is_some() {
                println!("configured via OS keyring");
            } else {
                println!("not configured");
            }
        }
    }
    Ok(())
}
