pub mod clock;
pub mod driver;
mod engine;
mod mode;
mod snapshot;
mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{SharedEngine, TickDriver};
pub use engine::{PomodoroEngine, TICK_PERIOD_MS, TICK_TOLERANCE_MS};
pub use mode::{EngineConfig, TimerMode, SESSIONS_PER_LONG_BREAK};
pub use snapshot::{Restore, Snapshot, SCHEMA_VERSION};
pub use state::EngineState;

/// Zero-padded `MM:SS`; minutes keep growing past 99 rather than wrapping.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
