use clap::Subcommand;
use studyplan_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value
    Get {
        /// Dot-separated key (e.g. "advisor.model", "planner.rebalance_scope")
        key: String,
    },
    /// Change a value and persist it
    Set {
        /// Dot-separated key
        key: String,
        /// New value, parsed to the field's type
        value: String,
    },
    /// Print the whole config as JSON
    List,
    /// Write the default config back to disk
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let Some(value) = Config::load()?.get(&key) else {
                eprintln!("unknown key: {key}");
                std::process::exit(1);
            };
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            Config::load()?.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&Config::load()?)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("reset to defaults");
        }
    }
    Ok(())
}
