use std::io::Write;

use pomodesk_core::storage::NotificationsConfig;
use pomodesk_core::{Completion, Database, Notifier};

/// Completion sink for the terminal.
///
/// Rings the bell and prints a line when notifications are enabled, and
/// always appends the interval to the session log.
pub struct TerminalNotifier {
    settings: NotificationsConfig,
    log: Option<Database>,
}

impl TerminalNotifier {
    pub fn new(settings: NotificationsConfig) -> Self {
        let log = match Database::open() {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("session log unavailable: {e}");
                None
            }
        };
        Self { settings, log }
    }
}

impl Notifier for TerminalNotifier {
    fn interval_complete(&self, completion: &Completion) {
        if let Some(db) = &self.log {
            if let Err(e) = db.record_interval(completion.mode, completion.credited_min, completion.at)
            {
                tracing::warn!("failed to record {} interval: {e}", completion.mode);
            }
        }

        if !self.settings.enabled {
            return;
        }
        let mut err = std::io::stderr().lock();
        if self.settings.bell {
            let _ = write!(err, "\x07");
        }
        let _ = writeln!(
            err,
            "{} finished ({} min). Next: {}. Sessions: {}",
            completion.mode.label(),
            completion.credited_min,
            completion.next_mode.label(),
            completion.sessions_completed,
        );
    }
}
