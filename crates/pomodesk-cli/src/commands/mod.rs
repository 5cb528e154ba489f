pub mod config;
pub mod stats;
pub mod timer;

use pomodesk_core::storage::ENGINE_KEY;
use pomodesk_core::{Database, Notifier, PomodoroEngine, SqliteSnapshotStore, SystemClock};

/// Load the persisted engine as-is, for read-only views.
///
/// The snapshot lives in the kv table under [`ENGINE_KEY`]; completions are
/// delivered to `notifier`.
pub fn load_engine(
    notifier: impl Notifier + 'static,
) -> Result<PomodoroEngine, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    tracing::debug!(key = ENGINE_KEY, "loading engine snapshot");
    Ok(PomodoroEngine::load(SystemClock, SqliteSnapshotStore::new(db), notifier))
}

/// Load the engine and catch up on time spent while no process was running.
pub fn open_engine(
    notifier: impl Notifier + 'static,
) -> Result<PomodoroEngine, Box<dyn std::error::Error>> {
    let mut engine = load_engine(notifier)?;
    engine.resync();
    Ok(engine)
}

/// Pretty-print any serializable value on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
