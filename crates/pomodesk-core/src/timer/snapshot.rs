//! Persisted engine snapshot and its schema migration.
//!
//! The on-disk shape is a flat camelCase JSON record. An older
//! `schemaVersion` is never upgraded field by field: it is discarded and the
//! engine starts from defaults. Structurally invalid data gets the same
//! treatment.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::mode::{EngineConfig, TimerMode};
use super::state::EngineState;
use crate::error::CoreError;

/// Current snapshot layout. Version 1 stored one kv entry per field.
pub const SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub durations: EngineConfig,
    pub mode: TimerMode,
    pub remaining_seconds: u64,
    pub running: bool,
    pub sessions_completed: u64,
    pub streak_days: u64,
    pub last_streak_date: Option<NaiveDate>,
    pub total_focus_minutes: u64,
    pub total_short_break_minutes: u64,
    pub total_long_break_minutes: u64,
    pub daily_history: BTreeMap<NaiveDate, u64>,
    /// Zero when the timer is stopped.
    pub last_tick_epoch_ms: u64,
    pub schema_version: u32,
}

/// Outcome of reading a stored snapshot.
#[derive(Debug)]
pub enum Restore {
    Loaded(EngineConfig, EngineState),
    /// Written by an older schema; start over from defaults.
    Outdated { found: u32 },
    /// Unreadable or inconsistent; start over from defaults.
    Corrupt(CoreError),
}

impl Snapshot {
    pub fn capture(config: &EngineConfig, state: &EngineState) -> Self {
        Self {
            durations: *config,
            mode: state.mode,
            remaining_seconds: state.remaining_secs,
            running: state.running,
            sessions_completed: state.sessions_completed,
            streak_days: state.streak_days,
            last_streak_date: state.last_streak_date,
            total_focus_minutes: state.total_focus_min,
            total_short_break_minutes: state.total_short_break_min,
            total_long_break_minutes: state.total_long_break_min,
            daily_history: state.daily_history.clone(),
            last_tick_epoch_ms: state.last_tick_epoch_ms.unwrap_or(0),
            schema_version: SCHEMA_VERSION,
        }
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the invariants a live engine relies on.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.durations
            .validate()
            .map_err(|e| CoreError::CorruptSnapshot(e.to_string()))?;
        let limit = self.durations.duration_secs(self.mode);
        if self.remaining_seconds > limit {
            return Err(CoreError::CorruptSnapshot(format!(
                "remainingSeconds {} exceeds {} interval of {limit}s",
                self.remaining_seconds, self.mode
            )));
        }
        if self.running && self.last_tick_epoch_ms == 0 {
            return Err(CoreError::CorruptSnapshot(
                "running without a last tick timestamp".into(),
            ));
        }
        Ok(())
    }

    pub fn into_parts(self) -> Result<(EngineConfig, EngineState), CoreError> {
        self.validate()?;
        let state = EngineState {
            mode: self.mode,
            remaining_secs: self.remaining_seconds,
            running: self.running,
            last_tick_epoch_ms: (self.last_tick_epoch_ms > 0).then_some(self.last_tick_epoch_ms),
            sessions_completed: self.sessions_completed,
            streak_days: self.streak_days,
            last_streak_date: self.last_streak_date,
            total_focus_min: self.total_focus_minutes,
            total_short_break_min: self.total_short_break_minutes,
            total_long_break_min: self.total_long_break_minutes,
            daily_history: self.daily_history,
        };
        Ok((self.durations, state))
    }

    /// Decode stored JSON, applying the version policy.
    pub fn restore(json: &str) -> Restore {
        let value: serde_json::Value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => return Restore::Corrupt(e.into()),
        };
        let found = value
            .get("schemaVersion")
            .and_then(serde_json::Value::as_u64)
            .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
            .unwrap_or(0);
        if found < SCHEMA_VERSION {
            return Restore::Outdated { found };
        }
        let snapshot: Snapshot = match serde_json::from_value(value) {
            Ok(s) => s,
            Err(e) => return Restore::Corrupt(CoreError::CorruptSnapshot(e.to_string())),
        };
        match snapshot.into_parts() {
            Ok((config, state)) => Restore::Loaded(config, state),
            Err(e) => Restore::Corrupt(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (EngineConfig, EngineState) {
        let config = EngineConfig::new(30, 5, 20);
        let mut state = EngineState::initial(&config);
        state.mode = TimerMode::ShortBreak;
        state.remaining_secs = 120;
        state.running = true;
        state.last_tick_epoch_ms = Some(1_700_000_000_000);
        state.sessions_completed = 4;
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        state.credit_focus(30, day);
        (config, state)
    }

    #[test]
    fn capture_and_restore_preserves_every_field() {
        let (config, state) = sample();
        let json = Snapshot::capture(&config, &state).to_json().unwrap();
        match Snapshot::restore(&json) {
            Restore::Loaded(c, s) => {
                assert_eq!(c, config);
                assert_eq!(s, state);
            }
            other => panic!("expected Loaded, got {other:?}"),
        }
    }

    #[test]
    fn wire_format_uses_camel_case_and_date_keys() {
        let (config, state) = sample();
        let value = serde_json::to_value(Snapshot::capture(&config, &state)).unwrap();
        assert_eq!(value["mode"], "shortBreak");
        assert_eq!(value["durations"]["shortBreak"], 5);
        assert_eq!(value["dailyHistory"]["2024-01-15"], 30);
        assert_eq!(value["lastStreakDate"], "2024-01-15");
        assert_eq!(value["schemaVersion"], SCHEMA_VERSION);
    }

    #[test]
    fn stopped_timer_persists_zero_tick() {
        let config = EngineConfig::default();
        let state = EngineState::initial(&config);
        let snap = Snapshot::capture(&config, &state);
        assert_eq!(snap.last_tick_epoch_ms, 0);
        let (_, restored) = snap.into_parts().unwrap();
        assert_eq!(restored.last_tick_epoch_ms, None);
    }

    #[test]
    fn older_schema_is_outdated() {
        let json = r#"{"durations":{"pomodoro":25,"shortBreak":5,"longBreak":15},"mode":"pomodoro","timeLeft":1500}"#;
        assert!(matches!(Snapshot::restore(json), Restore::Outdated { found: 0 }));

        let (config, state) = sample();
        let mut snap = Snapshot::capture(&config, &state);
        snap.schema_version = 1;
        let json = snap.to_json().unwrap();
        assert!(matches!(Snapshot::restore(&json), Restore::Outdated { found: 1 }));
    }

    #[test]
    fn invalid_data_is_corrupt() {
        assert!(matches!(Snapshot::restore("{not json"), Restore::Corrupt(_)));

        let (config, state) = sample();
        let mut snap = Snapshot::capture(&config, &state);
        snap.remaining_seconds = 10_000;
        assert!(matches!(
            Snapshot::restore(&snap.to_json().unwrap()),
            Restore::Corrupt(CoreError::CorruptSnapshot(_))
        ));

        let mut snap = Snapshot::capture(&config, &state);
        snap.durations.focus = 0;
        assert!(matches!(
            Snapshot::restore(&snap.to_json().unwrap()),
            Restore::Corrupt(_)
        ));

        let mut snap = Snapshot::capture(&config, &state);
        snap.last_tick_epoch_ms = 0;
        assert!(matches!(
            Snapshot::restore(&snap.to_json().unwrap()),
            Restore::Corrupt(_)
        ));
    }

    #[test]
    fn negative_counter_is_corrupt() {
        let json = format!(
            r#"{{"durations":{{"focus":25,"shortBreak":5,"longBreak":15}},"mode":"focus",
            "remainingSeconds":10,"running":false,"sessionsCompleted":-1,"streakDays":0,
            "lastStreakDate":null,"totalFocusMinutes":0,"totalShortBreakMinutes":0,
            "totalLongBreakMinutes":0,"dailyHistory":{{}},"lastTickEpochMs":0,
            "schemaVersion":{SCHEMA_VERSION}}}"#
        );
        assert!(matches!(Snapshot::restore(&json), Restore::Corrupt(_)));
    }
}
