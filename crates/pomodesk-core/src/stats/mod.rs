//! Statistics module for Pomodesk
//!
//! Aggregations over the engine's counters and daily focus history:
//! the weekly bar chart, the month calendar, and the headline overview.

mod activity;
mod overview;

pub use activity::{
    day_status, history_range, month_calendar, week_activity, CalendarDay, DayActivity,
    DayStatus,
};

pub use overview::{overview, StatsOverview};
