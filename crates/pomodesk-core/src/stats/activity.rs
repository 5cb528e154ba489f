//! Date-bucketed views over the engine's daily focus history.
//!
//! Every function takes the history map and "today" explicitly, so callers
//! pick the clock and tests stay deterministic.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

const WEEKDAY_LABELS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];

/// One bar of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayActivity {
    pub label: &'static str,
    pub date: NaiveDate,
    pub minutes: u64,
    pub is_today: bool,
}

/// How a calendar cell is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Today,
    /// Past day with focus time.
    Active,
    /// Past day without focus time.
    Missed,
    Future,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub minutes: u64,
    pub status: DayStatus,
}

/// The Sunday-to-Saturday week containing `today`.
pub fn week_activity(history: &BTreeMap<NaiveDate, u64>, today: NaiveDate) -> Vec<DayActivity> {
    let offset = i64::from(today.weekday().num_days_from_sunday());
    let sunday = today - Duration::days(offset);
    sunday
        .iter_days()
        .take(7)
        .zip(WEEKDAY_LABELS)
        .map(|(date, label)| DayActivity {
            label,
            date,
            minutes: history.get(&date).copied().unwrap_or(0),
            is_today: date == today,
        })
        .collect()
}

pub fn day_status(history: &BTreeMap<NaiveDate, u64>, date: NaiveDate, today: NaiveDate) -> DayStatus {
    if date == today {
        DayStatus::Today
    } else if date > today {
        DayStatus::Future
    } else if history.get(&date).copied().unwrap_or(0) > 0 {
        DayStatus::Active
    } else {
        DayStatus::Missed
    }
}

/// Every day of `year`-`month`, or an empty list for an invalid month.
pub fn month_calendar(
    history: &BTreeMap<NaiveDate, u64>,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| CalendarDay {
            date,
            minutes: history.get(&date).copied().unwrap_or(0),
            status: day_status(history, date, today),
        })
        .collect()
}

/// Dense per-day series from `from` to `to` inclusive; empty if reversed.
pub fn history_range(
    history: &BTreeMap<NaiveDate, u64>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<(NaiveDate, u64)> {
    if from > to {
        return Vec::new();
    }
    from.iter_days()
        .take_while(|d| *d <= to)
        .map(|d| (d, history.get(&d).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-15 is a Wednesday.
        let mut history = BTreeMap::new();
        history.insert(date(2024, 5, 12), 50);
        history.insert(date(2024, 5, 15), 25);
        history.insert(date(2024, 5, 19), 99);

        let week = week_activity(&history, date(2024, 5, 15));
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2024, 5, 12));
        assert_eq!(week[0].minutes, 50);
        assert_eq!(week[3].minutes, 25);
        assert!(week[3].is_today);
        assert_eq!(week[6].date, date(2024, 5, 18));
        assert_eq!(week.iter().map(|d| d.minutes).sum::<u64>(), 75);
        assert_eq!(
            week.iter().map(|d| d.label).collect::<Vec<_>>(),
            WEEKDAY_LABELS.to_vec()
        );
    }

    #[test]
    fn week_on_sunday_starts_today() {
        let week = week_activity(&BTreeMap::new(), date(2024, 5, 12));
        assert_eq!(week[0].date, date(2024, 5, 12));
        assert!(week[0].is_today);
    }

    #[test]
    fn calendar_marks_status() {
        let mut history = BTreeMap::new();
        history.insert(date(2024, 2, 3), 25);
        let today = date(2024, 2, 10);

        let days = month_calendar(&history, 2024, 2, today);
        assert_eq!(days.len(), 29);
        assert_eq!(days[2].status, DayStatus::Active);
        assert_eq!(days[3].status, DayStatus::Missed);
        assert_eq!(days[9].status, DayStatus::Today);
        assert_eq!(days[10].status, DayStatus::Future);
        assert!(month_calendar(&history, 2024, 13, today).is_empty());
    }

    #[test]
    fn history_range_is_dense() {
        let mut history = BTreeMap::new();
        history.insert(date(2024, 12, 31), 10);
        history.insert(date(2025, 1, 2), 20);
        let series = history_range(&history, date(2024, 12, 30), date(2025, 1, 2));
        assert_eq!(
            series,
            vec![
                (date(2024, 12, 30), 0),
                (date(2024, 12, 31), 10),
                (date(2025, 1, 1), 0),
                (date(2025, 1, 2), 20),
            ]
        );
        assert!(history_range(&history, date(2025, 1, 2), date(2024, 1, 1)).is_empty());
    }
}
