//! SQLite-based persistence.
//!
//! Provides:
//! - Key-value store for the engine snapshot
//! - A log of completed intervals with per-mode aggregates

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timer::TimerMode;

use super::data_dir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub mode: TimerMode,
    pub duration_min: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_pomodoros: u64,
    pub focus_min: u64,
    pub short_break_min: u64,
    pub long_break_min: u64,
}

/// SQLite database for snapshot and session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/pomodesk/pomodesk.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomodesk.db"))
    }

    /// Open (or create) a database file at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                mode         TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_mode ON sessions(mode);",
        )?;
        Ok(())
    }

    /// Append a completed interval to the session log.
    pub fn record_interval(
        &self,
        mode: TimerMode,
        duration_min: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO sessions (mode, duration_min, completed_at) VALUES (?1, ?2, ?3)",
            params![mode.key(), duration_min, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Intervals completed on or after `since`, newest first.
    pub fn sessions_since(&self, since: DateTime<Utc>) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mode, duration_min, completed_at
             FROM sessions
             WHERE completed_at >= ?1
             ORDER BY completed_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![since.to_rfc3339()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, mode, duration_min, completed_at) = row?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| crate::CoreError::CorruptSnapshot(format!("session {id}: {e}")))?
                .with_timezone(&Utc);
            out.push(SessionRecord {
                id,
                mode: TimerMode::parse_or_focus(&mode),
                duration_min,
                completed_at,
            });
        }
        Ok(out)
    }

    pub fn all_sessions(&self) -> Result<Vec<SessionRecord>> {
        self.sessions_since(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Intervals completed since local midnight.
    pub fn sessions_today(&self) -> Result<Vec<SessionRecord>> {
        self.sessions_since(local_midnight_utc(Local::now().date_naive()))
    }

    /// Aggregates for intervals completed since local midnight.
    pub fn stats_today(&self) -> Result<Stats, rusqlite::Error> {
        self.stats_since(local_midnight_utc(Local::now().date_naive()))
    }

    pub fn stats_all(&self) -> Result<Stats, rusqlite::Error> {
        self.stats_since(DateTime::<Utc>::UNIX_EPOCH)
    }

    fn stats_since(&self, since: DateTime<Utc>) -> Result<Stats, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT mode, COUNT(*), COALESCE(SUM(duration_min), 0)
             FROM sessions
             WHERE completed_at >= ?1
             GROUP BY mode",
        )?;

        let mut stats = Stats::default();
        let rows = stmt.query_map(params![since.to_rfc3339()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        for row in rows {
            let (mode, count, minutes) = row?;
            stats.total_sessions += count;
            match TimerMode::parse_or_focus(&mode) {
                TimerMode::Focus => {
                    stats.completed_pomodoros += count;
                    stats.focus_min += minutes;
                }
                TimerMode::ShortBreak => stats.short_break_min += minutes,
                TimerMode::LongBreak => stats.long_break_min += minutes,
            }
        }
        Ok(stats)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn local_midnight_utc(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
