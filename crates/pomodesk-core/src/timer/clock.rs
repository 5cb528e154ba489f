//! Time sources for the engine.
//!
//! Elapsed time is measured in Unix epoch milliseconds so it survives a
//! process restart. Calendar dates come from the same source but are
//! compared as [`NaiveDate`]s, never by subtracting milliseconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate};

pub trait Clock: Send {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// The user's current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock with the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Hand-advanced clock. Clones share the same instant.
///
/// `today()` is the UTC date of the current instant, which keeps tests
/// independent of the machine's time zone.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// Start at midnight UTC of `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let ms = date
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(0);
        Self::new(u64::try_from(ms).unwrap_or(0))
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }

    pub fn set_ms(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        let ms = i64::try_from(self.now_ms()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.date_naive())
            .unwrap_or_default()
    }
}
