//! Completion alerts.
//!
//! The engine signals a [`Notifier`] exactly once per finished interval.
//! What happens next (a chime, a desktop toast, a log row) is the sink's
//! business; the engine never waits on it and never sees its failures.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::TimerMode;

/// Details of one finished interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub mode: TimerMode,
    pub credited_min: u64,
    pub next_mode: TimerMode,
    pub sessions_completed: u64,
    pub at: DateTime<Utc>,
}

pub trait Notifier: Send {
    fn interval_complete(&self, completion: &Completion);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn interval_complete(&self, _completion: &Completion) {}
}

/// Keeps every notification; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Completion>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completions(&self) -> Vec<Completion> {
        self.received
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.received.lock().map(|log| log.len()).unwrap_or(0)
    }
}

impl Notifier for RecordingNotifier {
    fn interval_complete(&self, completion: &Completion) {
        if let Ok(mut log) = self.received.lock() {
            log.push(completion.clone());
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for Box<N> {
    fn interval_complete(&self, completion: &Completion) {
        (**self).interval_complete(completion)
    }
}

/// Fan a completion out to several sinks in order.
impl Notifier for Vec<Box<dyn Notifier>> {
    fn interval_complete(&self, completion: &Completion) {
        for sink in self {
            sink.interval_complete(completion);
        }
    }
}
