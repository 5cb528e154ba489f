use serde::{Deserialize, Serialize};

use crate::timer::EngineState;

/// Headline numbers for the stats card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsOverview {
    pub streak_days: u64,
    pub sessions_completed: u64,
    pub total_focus_min: u64,
    pub total_short_break_min: u64,
    pub total_long_break_min: u64,
    /// Focus share of all tracked time, rounded to a whole percent.
    pub focus_share_pct: u64,
    /// Focus time in hours, one decimal place.
    pub focus_hours: f64,
}

pub fn overview(state: &EngineState) -> StatsOverview {
    let total = state
        .total_focus_min
        .saturating_add(state.total_short_break_min)
        .saturating_add(state.total_long_break_min);
    let focus_share_pct = if total == 0 {
        0
    } else {
        (state.total_focus_min as f64 / total as f64 * 100.0).round() as u64
    };
    StatsOverview {
        streak_days: state.streak_days,
        sessions_completed: state.sessions_completed,
        total_focus_min: state.total_focus_min,
        total_short_break_min: state.total_short_break_min,
        total_long_break_min: state.total_long_break_min,
        focus_share_pct,
        focus_hours: (state.total_focus_min as f64 / 60.0 * 10.0).round() / 10.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::EngineConfig;

    #[test]
    fn empty_state_has_zero_share() {
        let state = EngineState::initial(&EngineConfig::default());
        let o = overview(&state);
        assert_eq!(o.focus_share_pct, 0);
        assert_eq!(o.focus_hours, 0.0);
    }

    #[test]
    fn share_and_hours_are_rounded() {
        let mut state = EngineState::initial(&EngineConfig::default());
        state.total_focus_min = 100;
        state.total_short_break_min = 20;
        state.total_long_break_min = 30;
        state.streak_days = 3;
        let o = overview(&state);
        assert_eq!(o.focus_share_pct, 67);
        assert_eq!(o.focus_hours, 1.7);
        assert_eq!(o.streak_days, 3);
    }
}
