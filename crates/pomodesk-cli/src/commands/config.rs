use clap::Subcommand;
use pomodesk_core::{Config, EngineConfig, NoopNotifier};

use super::{open_engine, print_json};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "notifications.bell", "driver.tick_interval_ms")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
    /// Show or change the interval durations in minutes
    Durations {
        #[arg(long)]
        focus: Option<i64>,
        #[arg(long)]
        short_break: Option<i64>,
        #[arg(long)]
        long_break: Option<i64>,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            print_json(&config)?;
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Durations {
            focus,
            short_break,
            long_break,
        } => {
            let mut engine = open_engine(NoopNotifier)?;
            let current = engine.config();
            if focus.is_none() && short_break.is_none() && long_break.is_none() {
                return print_json(&current);
            }
            let updated = EngineConfig::new(
                focus.unwrap_or(current.focus),
                short_break.unwrap_or(current.short_break),
                long_break.unwrap_or(current.long_break),
            );
            print_json(&engine.set_config(updated)?)?;
        }
    }
    Ok(())
}
