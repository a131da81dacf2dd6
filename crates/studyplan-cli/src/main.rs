use clap::{CommandFactory, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyplan-cli", version, about = "Studyplan CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Study plan management
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Day-by-day schedule operations
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Progress report for a plan
    Progress {
        /// Plan ID
        plan_id: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Study tips and advice
    Advice {
        #[command(subcommand)]
        action: commands::advice::AdviceAction,
    },
    /// Credential management for the advisor
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Read and change settings
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Progress { plan_id, json } => commands::progress::run(&plan_id, json),
        Commands::Advice { action } => commands::advice::run(action),
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "studyplan-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
