//! # Pomodesk Core Library
//!
//! This library provides the core logic for the Pomodesk pomodoro timer.
//! The `pomodesk` CLI is a thin layer over the same engine a GUI would use.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A three-mode state machine that the caller drives with
//!   `tick()` once per second and corrects with `resync()` after suspends
//! - **Storage**: SQLite snapshot and session storage, TOML configuration
//! - **Notifications**: A sink signalled once per completed interval
//! - **Stats**: Weekly, monthly, and overall aggregation of focus history
//!
//! ## Key Components
//!
//! - [`PomodoroEngine`]: Core timer state machine
//! - [`TickDriver`]: 1 Hz tokio loop over a [`SharedEngine`]
//! - [`Database`]: Snapshot and session persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, Result};
pub use events::Event;
pub use notify::{Completion, NoopNotifier, Notifier, RecordingNotifier};
pub use storage::{Config, Database, MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore};
pub use timer::{
    format_clock, Clock, EngineConfig, EngineState, ManualClock, PomodoroEngine, SharedEngine,
    Snapshot, SystemClock, TickDriver, TimerMode,
};
