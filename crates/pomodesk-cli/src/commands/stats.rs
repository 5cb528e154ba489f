use chrono::{Datelike, Days, NaiveDate};
use clap::Subcommand;
use pomodesk_core::stats;
use pomodesk_core::{Database, NoopNotifier};
use serde_json::json;

use super::{load_engine, print_json};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Streak, session count and time totals
    Overview,
    /// Focus minutes for each day of the current week
    Week,
    /// Calendar view of one month
    Month {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Daily focus minutes over a date range
    History {
        /// Number of days ending today
        #[arg(long, default_value = "7", conflicts_with = "from")]
        days: u32,
        /// First day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, requires = "to")]
        from: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Completed intervals from the session log
    Sessions {
        /// Only intervals completed today
        #[arg(long)]
        today: bool,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("{s}: {e}"))
}

/// The `days`-long window ending on `today`.
fn trailing_days(today: NaiveDate, days: u32) -> Result<(NaiveDate, NaiveDate), String> {
    let back = u64::from(days.max(1) - 1);
    let from = today
        .checked_sub_days(Days::new(back))
        .ok_or_else(|| format!("--days {days} reaches past the supported date range"))?;
    Ok((from, today))
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        StatsAction::Overview => {
            let engine = load_engine(NoopNotifier)?;
            print_json(&stats::overview(&engine.state()))
        }
        StatsAction::Week => {
            let engine = load_engine(NoopNotifier)?;
            print_json(&stats::week_activity(&engine.daily_history(), engine.today()))
        }
        StatsAction::Month { year, month } => {
            let engine = load_engine(NoopNotifier)?;
            let today = engine.today();
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            if !(1..=12).contains(&month) {
                return Err(format!("invalid month: {month}").into());
            }
            print_json(&stats::month_calendar(&engine.daily_history(), year, month, today))
        }
        StatsAction::History { days, from, to } => {
            let engine = load_engine(NoopNotifier)?;
            let today = engine.today();
            let (from, to) = match (from, to) {
                (Some(from), Some(to)) => (from, to),
                _ => trailing_days(today, days)?,
            };
            let series: Vec<_> = stats::history_range(&engine.daily_history(), from, to)
                .into_iter()
                .map(|(date, minutes)| json!({ "date": date, "minutes": minutes }))
                .collect();
            print_json(&series)
        }
        StatsAction::Sessions { today } => {
            let db = Database::open()?;
            let (totals, sessions) = if today {
                (db.stats_today()?, db.sessions_today()?)
            } else {
                (db.stats_all()?, db.all_sessions()?)
            };
            print_json(&json!({ "totals": totals, "sessions": sessions }))
        }
    }
}
