use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pomodesk_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod notifier;

/// Environment variable that overrides the configured log filter.
const LOG_ENV: &str = "POMODESK_LOG";

#[derive(Parser)]
#[command(name = "pomodesk", version, about = "Pomodesk pomodoro timer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Focus statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "pomodesk", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
