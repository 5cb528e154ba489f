use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::mode::{EngineConfig, TimerMode};

/// Live engine state. The engine owns the only instance and hands out clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub mode: TimerMode,
    pub remaining_secs: u64,
    pub running: bool,
    /// Epoch ms of the last applied tick or resync; `None` while stopped.
    pub last_tick_epoch_ms: Option<u64>,
    pub sessions_completed: u64,
    pub streak_days: u64,
    pub last_streak_date: Option<NaiveDate>,
    pub total_focus_min: u64,
    pub total_short_break_min: u64,
    pub total_long_break_min: u64,
    /// Focus minutes per local calendar day.
    pub daily_history: BTreeMap<NaiveDate, u64>,
}

impl EngineState {
    /// Fresh state: stopped at the top of a focus interval.
    pub fn initial(config: &EngineConfig) -> Self {
        Self {
            mode: TimerMode::Focus,
            remaining_secs: config.duration_secs(TimerMode::Focus),
            running: false,
            last_tick_epoch_ms: None,
            sessions_completed: 0,
            streak_days: 0,
            last_streak_date: None,
            total_focus_min: 0,
            total_short_break_min: 0,
            total_long_break_min: 0,
            daily_history: BTreeMap::new(),
        }
    }

    /// Credit a finished focus interval to the totals and today's history.
    pub(crate) fn credit_focus(&mut self, minutes: u64, today: NaiveDate) {
        self.sessions_completed = self.sessions_completed.saturating_add(1);
        self.total_focus_min = self.total_focus_min.saturating_add(minutes);
        let day = self.daily_history.entry(today).or_insert(0);
        *day = day.saturating_add(minutes);
        self.update_streak(today);
    }

    pub(crate) fn credit_break(&mut self, mode: TimerMode, minutes: u64) {
        match mode {
            TimerMode::ShortBreak => {
                self.total_short_break_min = self.total_short_break_min.saturating_add(minutes)
            }
            TimerMode::LongBreak => {
                self.total_long_break_min = self.total_long_break_min.saturating_add(minutes)
            }
            TimerMode::Focus => {}
        }
    }

    /// One credit per calendar day; a missed day restarts the count.
    pub(crate) fn update_streak(&mut self, today: NaiveDate) {
        match self.last_streak_date {
            Some(last) if last == today => {}
            Some(last) if today.pred_opt() == Some(last) => {
                self.streak_days = self.streak_days.saturating_add(1);
                self.last_streak_date = Some(today);
            }
            _ => {
                self.streak_days = 1;
                self.last_streak_date = Some(today);
            }
        }
    }

    /// Position within the long-break cycle, as shown by the session dots.
    pub fn session_indicator(&self) -> u64 {
        self.sessions_completed % super::mode::SESSIONS_PER_LONG_BREAK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_credit_starts_streak() {
        let mut state = EngineState::initial(&EngineConfig::default());
        state.update_streak(date(2024, 5, 1));
        assert_eq!(state.streak_days, 1);
        assert_eq!(state.last_streak_date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn same_day_does_not_double_count() {
        let mut state = EngineState::initial(&EngineConfig::default());
        state.streak_days = 4;
        state.last_streak_date = Some(date(2024, 5, 1));
        state.update_streak(date(2024, 5, 1));
        assert_eq!(state.streak_days, 4);
    }

    #[test]
    fn consecutive_day_extends_across_month_boundary() {
        let mut state = EngineState::initial(&EngineConfig::default());
        state.streak_days = 4;
        state.last_streak_date = Some(date(2024, 2, 29));
        state.update_streak(date(2024, 3, 1));
        assert_eq!(state.streak_days, 5);
        assert_eq!(state.last_streak_date, Some(date(2024, 3, 1)));
    }

    #[test]
    fn gap_resets_streak() {
        let mut state = EngineState::initial(&EngineConfig::default());
        state.streak_days = 9;
        state.last_streak_date = Some(date(2024, 5, 1));
        state.update_streak(date(2024, 5, 3));
        assert_eq!(state.streak_days, 1);
        assert_eq!(state.last_streak_date, Some(date(2024, 5, 3)));
    }

    #[test]
    fn credit_focus_accumulates_history() {
        let mut state = EngineState::initial(&EngineConfig::default());
        let today = date(2024, 5, 1);
        state.credit_focus(25, today);
        state.credit_focus(25, today);
        assert_eq!(state.daily_history.get(&today), Some(&50));
        assert_eq!(state.total_focus_min, 50);
        assert_eq!(state.sessions_completed, 2);
        assert_eq!(state.session_indicator(), 2);
    }
}
