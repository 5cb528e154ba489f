use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of focus intervals per cycle; every third completion earns a long break.
pub const SESSIONS_PER_LONG_BREAK: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Stable key used in snapshots and on the command line.
    pub fn key(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "shortBreak",
            TimerMode::LongBreak => "longBreak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    /// Parse a mode key, falling back to `Focus` for anything unrecognised.
    pub fn parse_or_focus(key: &str) -> Self {
        key.parse().unwrap_or_else(|e: CoreError| {
            tracing::warn!("{e}; falling back to focus");
            TimerMode::Focus
        })
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TimerMode {
    type Err = CoreError;

    /// Accepts the snapshot keys plus the kebab/snake spellings used by the CLI.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "focus" | "pomodoro" => Ok(TimerMode::Focus),
            "shortBreak" | "short-break" | "short_break" => Ok(TimerMode::ShortBreak),
            "longBreak" | "long-break" | "long_break" => Ok(TimerMode::LongBreak),
            other => Err(CoreError::InvalidMode(other.to_string())),
        }
    }
}

/// Interval durations in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub focus: i64,
    pub short_break: i64,
    pub long_break: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            focus: 25,
            short_break: 5,
            long_break: 15,
        }
    }
}

impl EngineConfig {
    pub fn new(focus: i64, short_break: i64, long_break: i64) -> Self {
        Self {
            focus,
            short_break,
            long_break,
        }
    }

    /// Minutes configured for `mode`.
    pub fn minutes(&self, mode: TimerMode) -> i64 {
        match mode {
            TimerMode::Focus => self.focus,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }

    /// Full interval length in seconds, zero for non-positive durations.
    ///
    /// Uses saturating arithmetic so absurd values cannot overflow.
    pub fn duration_secs(&self, mode: TimerMode) -> u64 {
        u64::try_from(self.minutes(mode))
            .unwrap_or(0)
            .saturating_mul(60)
    }

    /// Every duration must be a positive number of minutes.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("focus", self.focus),
            ("shortBreak", self.short_break),
            ("longBreak", self.long_break),
        ] {
            if value <= 0 {
                return Err(CoreError::InvalidConfig { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_spelling() {
        assert_eq!("focus".parse::<TimerMode>().unwrap(), TimerMode::Focus);
        assert_eq!("short-break".parse::<TimerMode>().unwrap(), TimerMode::ShortBreak);
        assert_eq!("longBreak".parse::<TimerMode>().unwrap(), TimerMode::LongBreak);
        assert!(matches!(
            "nap".parse::<TimerMode>(),
            Err(CoreError::InvalidMode(m)) if m == "nap"
        ));
    }

    #[test]
    fn unknown_mode_falls_back_to_focus() {
        assert_eq!(TimerMode::parse_or_focus("siesta"), TimerMode::Focus);
        assert_eq!(TimerMode::parse_or_focus("long_break"), TimerMode::LongBreak);
    }

    #[test]
    fn validate_rejects_non_positive() {
        assert!(EngineConfig::default().validate().is_ok());
        let err = EngineConfig::new(25, 0, 15).validate().unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidConfig { field: "shortBreak", value: 0 }
        ));
        assert!(EngineConfig::new(-1, 5, 15).validate().is_err());
    }

    #[test]
    fn mode_serializes_as_camel_case_key() {
        let json = serde_json::to_string(&TimerMode::ShortBreak).unwrap();
        assert_eq!(json, "\"shortBreak\"");
    }
}
