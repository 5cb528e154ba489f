use std::sync::{Arc, Mutex};

use crate::error::{CoreError, Result};
use crate::timer::Snapshot;

use super::Database;

/// Key under which the engine snapshot lives in the kv table.
pub const ENGINE_KEY: &str = "pomodoro_engine";

/// Where the engine keeps its single snapshot record.
pub trait SnapshotStore: Send {
    /// Raw stored JSON, if any.
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

pub struct SqliteSnapshotStore {
    db: Database,
}

impl SqliteSnapshotStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.db.kv_get(ENGINE_KEY)?)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.db.kv_set(ENGINE_KEY, &snapshot.to_json()?)?;
        Ok(())
    }
}

/// In-memory store; clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Arc<Mutex<Option<String>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with raw JSON, as if written by an earlier run.
    pub fn with_raw(json: impl Into<String>) -> Self {
        let store = Self::default();
        store.put_raw(json);
        store
    }

    pub fn put_raw(&self, json: impl Into<String>) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(json.into());
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }

    /// Number of successful saves so far.
    pub fn writes(&self) -> usize {
        self.writes.lock().map(|w| *w).unwrap_or(0)
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<String>> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|e| CoreError::Io(std::io::Error::other(e.to_string())))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| CoreError::Io(std::io::Error::other(e.to_string())))?;
        *slot = Some(json);
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
