mod config;
pub mod database;
mod snapshot_store;

pub use config::{Config, DriverConfig, LoggingConfig, NotificationsConfig};
pub use database::{Database, SessionRecord, Stats};
pub use snapshot_store::{MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore, ENGINE_KEY};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/pomodesk[-dev]/` based on POMODESK_ENV.
///
/// Set POMODESK_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMODESK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomodesk-dev")
    } else {
        base_dir.join("pomodesk")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
