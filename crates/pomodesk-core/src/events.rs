use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{EngineConfig, TimerMode};

/// Every state change in the engine produces an Event.
/// Views subscribe to them instead of polling shared state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        from: TimerMode,
        to: TimerMode,
        auto_start: bool,
        at: DateTime<Utc>,
    },
    ConfigChanged {
        durations: EngineConfig,
        at: DateTime<Utc>,
    },
    /// Wall-clock correction after a suspend or focus regain.
    Resynced {
        elapsed_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    IntervalCompleted {
        mode: TimerMode,
        credited_min: u64,
        next_mode: TimerMode,
        sessions_completed: u64,
        streak_days: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        remaining_secs: u64,
        total_secs: u64,
        running: bool,
        progress_pct: f64,
        sessions_completed: u64,
        session_indicator: u64,
        streak_days: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine-friendly name, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::ModeSwitched { .. } => "mode_switched",
            Event::ConfigChanged { .. } => "config_changed",
            Event::Resynced { .. } => "resynced",
            Event::IntervalCompleted { .. } => "interval_completed",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
