//! Pomodoro engine implementation.
//!
//! The engine is a three-mode state machine driven from outside: a
//! scheduler calls `tick()` about once per second while the timer runs, and
//! a lifecycle hook calls `resync()` on startup and whenever the host
//! regains focus. It has no threads of its own.
//!
//! ## State Transitions
//!
//! ```text
//! Focus --(expire, n % 3 != 0)--> ShortBreak --(expire)--> Focus
//! Focus --(expire, n % 3 == 0)--> LongBreak  --(expire)--> Focus
//! ```
//!
//! Every mutation persists a full [`Snapshot`] and publishes an [`Event`]
//! to subscribers.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = PomodoroEngine::load(SystemClock, store, NoopNotifier);
//! engine.resync();
//! engine.toggle();
//! // Once per second:
//! engine.tick();
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::broadcast;

use super::clock::Clock;
use super::mode::{EngineConfig, TimerMode, SESSIONS_PER_LONG_BREAK};
use super::snapshot::{Restore, Snapshot};
use super::state::EngineState;
use crate::error::CoreError;
use crate::events::Event;
use crate::notify::{Completion, Notifier};
use crate::storage::SnapshotStore;

/// Wall-clock time one tick accounts for.
pub const TICK_PERIOD_MS: u64 = 1000;

/// How early a tick may arrive and still count for the current second.
pub const TICK_TOLERANCE_MS: u64 = 100;

const EVENT_CAPACITY: usize = 64;

pub struct PomodoroEngine {
    config: EngineConfig,
    state: EngineState,
    clock: Box<dyn Clock>,
    store: Box<dyn SnapshotStore>,
    notifier: Box<dyn Notifier>,
    events: broadcast::Sender<Event>,
}

impl PomodoroEngine {
    /// Build the engine from whatever the store holds.
    ///
    /// Missing, outdated or corrupt data falls back to defaults; in the
    /// last two cases the fresh state is written back immediately.
    pub fn load(
        clock: impl Clock + 'static,
        store: impl SnapshotStore + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        let (config, state, rewrite) = match store.load() {
            Ok(Some(json)) => match Snapshot::restore(&json) {
                Restore::Loaded(config, state) => (config, state, false),
                Restore::Outdated { found } => {
                    tracing::info!(
                        "discarding snapshot with schema version {found}; starting from defaults"
                    );
                    Self::defaults_with_rewrite()
                }
                Restore::Corrupt(e) => {
                    tracing::warn!("{e}; starting from defaults");
                    Self::defaults_with_rewrite()
                }
            },
            Ok(None) => {
                let config = EngineConfig::default();
                (config, EngineState::initial(&config), false)
            }
            Err(e) => {
                tracing::warn!("failed to read engine snapshot: {e}; starting from defaults");
                let config = EngineConfig::default();
                (config, EngineState::initial(&config), false)
            }
        };

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let engine = Self {
            config,
            state,
            clock: Box::new(clock),
            store: Box::new(store),
            notifier: Box::new(notifier),
            events,
        };
        if rewrite {
            engine.persist();
        }
        engine
    }

    fn defaults_with_rewrite() -> (EngineConfig, EngineState, bool) {
        let config = EngineConfig::default();
        (config, EngineState::initial(&config), true)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// A copy of the full live state.
    pub fn state(&self) -> EngineState {
        self.state.clone()
    }

    pub fn mode(&self) -> TimerMode {
        self.state.mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn last_tick_epoch_ms(&self) -> Option<u64> {
        self.state.last_tick_epoch_ms
    }

    pub fn total_secs(&self) -> u64 {
        self.config.duration_secs(self.state.mode)
    }

    /// Fraction of the interval still to go, 1.0 at the start and 0.0 at expiry.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        self.state.remaining_secs as f64 / total as f64
    }

    /// [`progress`](Self::progress) as a percentage, for the countdown ring.
    pub fn progress_pct(&self) -> f64 {
        self.progress() * 100.0
    }

    pub fn sessions_completed(&self) -> u64 {
        self.state.sessions_completed
    }

    pub fn session_indicator(&self) -> u64 {
        self.state.session_indicator()
    }

    pub fn streak_days(&self) -> u64 {
        self.state.streak_days
    }

    pub fn last_streak_date(&self) -> Option<NaiveDate> {
        self.state.last_streak_date
    }

    pub fn total_focus_min(&self) -> u64 {
        self.state.total_focus_min
    }

    pub fn total_short_break_min(&self) -> u64 {
        self.state.total_short_break_min
    }

    pub fn total_long_break_min(&self) -> u64 {
        self.state.total_long_break_min
    }

    pub fn daily_history(&self) -> BTreeMap<NaiveDate, u64> {
        self.state.daily_history.clone()
    }

    /// The clock's current calendar date.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn to_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.config, &self.state)
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            total_secs: self.total_secs(),
            running: self.state.running,
            progress_pct: self.progress_pct(),
            sessions_completed: self.state.sessions_completed,
            session_indicator: self.session_indicator(),
            streak_days: self.state.streak_days,
            at: self.now_utc(),
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the durations. Stops the timer and refills the current mode.
    pub fn set_config(&mut self, config: EngineConfig) -> Result<Event, CoreError> {
        config.validate()?;
        self.config = config;
        self.state.remaining_secs = config.duration_secs(self.state.mode);
        self.stop_clock();
        tracing::debug!(?config, "durations updated");
        Ok(self.commit(Event::ConfigChanged {
            durations: config,
            at: self.now_utc(),
        }))
    }

    /// Jump to `target` with a full interval, optionally running.
    pub fn switch_mode(&mut self, target: TimerMode, auto_start: bool) -> Event {
        let from = self.state.mode;
        self.enter_mode(target, auto_start);
        self.commit(Event::ModeSwitched {
            from,
            to: target,
            auto_start,
            at: self.now_utc(),
        })
    }

    /// Start or pause without changing mode.
    pub fn toggle(&mut self) -> Event {
        if self.state.running {
            self.stop_clock();
            self.commit(Event::TimerPaused {
                mode: self.state.mode,
                remaining_secs: self.state.remaining_secs,
                at: self.now_utc(),
            })
        } else {
            self.state.running = true;
            self.state.last_tick_epoch_ms = Some(self.clock.now_ms());
            self.commit(Event::TimerStarted {
                mode: self.state.mode,
                remaining_secs: self.state.remaining_secs,
                at: self.now_utc(),
            })
        }
    }

    /// Start if stopped; `None` when already running.
    pub fn start(&mut self) -> Option<Event> {
        (!self.state.running).then(|| self.toggle())
    }

    /// Pause if running; `None` when already stopped.
    pub fn pause(&mut self) -> Option<Event> {
        self.state.running.then(|| self.toggle())
    }

    /// Stop and refill the current mode.
    pub fn reset(&mut self) -> Event {
        self.stop_clock();
        self.state.remaining_secs = self.total_secs();
        self.commit(Event::TimerReset {
            mode: self.state.mode,
            remaining_secs: self.state.remaining_secs,
            at: self.now_utc(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// The last-tick timestamp is an anchor that moves forward by exactly
    /// [`TICK_PERIOD_MS`] per applied tick, so at most one decrement lands
    /// per wall-clock second no matter how many drivers deliver ticks or
    /// how their phases line up. No-op while stopped. Reaching zero
    /// completes the interval in the same call. Returns the completion
    /// event, if any.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        let now = self.clock.now_ms();

        if self.state.remaining_secs > 0 {
            let last = match self.state.last_tick_epoch_ms {
                Some(last) if last <= now.saturating_add(TICK_TOLERANCE_MS) => last,
                // Missing anchor, or the wall clock stepped back.
                _ => {
                    self.reanchor(now);
                    return None;
                }
            };
            if now.saturating_sub(last) + TICK_TOLERANCE_MS < TICK_PERIOD_MS {
                return None;
            }
            self.state.remaining_secs -= 1;
            self.state.last_tick_epoch_ms = Some(last + TICK_PERIOD_MS);
            if self.state.remaining_secs > 0 {
                self.persist();
                return None;
            }
        }

        Some(self.expire())
    }

    /// Subtract the wall-clock time elapsed since the last tick.
    ///
    /// Never fires completion effects, even when the countdown floors at
    /// zero; the next `tick()` does that.
    pub fn resync(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        let now = self.clock.now_ms();
        let last = match self.state.last_tick_epoch_ms {
            // An early tick may leave the anchor slightly ahead of now.
            Some(last) if last <= now.saturating_add(TICK_TOLERANCE_MS) => last,
            _ => {
                self.reanchor(now);
                return None;
            }
        };
        let elapsed_secs = now.saturating_sub(last) / 1000;
        if elapsed_secs == 0 {
            return None;
        }
        self.state.remaining_secs = self.state.remaining_secs.saturating_sub(elapsed_secs);
        self.state.last_tick_epoch_ms = Some(now);
        tracing::debug!(
            elapsed_secs,
            remaining_secs = self.state.remaining_secs,
            "resynced countdown"
        );
        Some(self.commit(Event::Resynced {
            elapsed_secs,
            remaining_secs: self.state.remaining_secs,
            at: self.now_utc(),
        }))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Apply completion effects for the current mode and roll over.
    fn expire(&mut self) -> Event {
        let finished = self.state.mode;
        let credited_min = u64::try_from(self.config.minutes(finished)).unwrap_or(0);

        let next = match finished {
            TimerMode::Focus => {
                let today = self.clock.today();
                self.state.credit_focus(credited_min, today);
                if self.state.sessions_completed % SESSIONS_PER_LONG_BREAK != 0 {
                    TimerMode::ShortBreak
                } else {
                    TimerMode::LongBreak
                }
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                self.state.credit_break(finished, credited_min);
                TimerMode::Focus
            }
        };

        let at = self.now_utc();
        tracing::info!(
            mode = %finished,
            next = %next,
            sessions = self.state.sessions_completed,
            "interval complete"
        );
        self.notifier.interval_complete(&Completion {
            mode: finished,
            credited_min,
            next_mode: next,
            sessions_completed: self.state.sessions_completed,
            at,
        });

        self.enter_mode(next, true);
        self.commit(Event::IntervalCompleted {
            mode: finished,
            credited_min,
            next_mode: next,
            sessions_completed: self.state.sessions_completed,
            streak_days: self.state.streak_days,
            at,
        })
    }

    fn enter_mode(&mut self, target: TimerMode, auto_start: bool) {
        self.state.mode = target;
        self.state.remaining_secs = self.config.duration_secs(target);
        self.state.running = auto_start;
        self.state.last_tick_epoch_ms = auto_start.then(|| self.clock.now_ms());
    }

    /// Restart the tick period from `now` without touching the countdown.
    fn reanchor(&mut self, now: u64) {
        tracing::debug!(
            previous = ?self.state.last_tick_epoch_ms,
            now,
            "re-anchoring tick clock"
        );
        self.state.last_tick_epoch_ms = Some(now);
        self.persist();
    }

    fn stop_clock(&mut self) {
        self.state.running = false;
        self.state.last_tick_epoch_ms = None;
    }

    /// Persist, publish, and hand the event back to the caller.
    fn commit(&self, event: Event) -> Event {
        self.persist();
        tracing::debug!(event = event.kind(), "engine event");
        // No subscribers is not an error.
        let _ = self.events.send(event.clone());
        event
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.to_snapshot()) {
            tracing::warn!("failed to persist engine snapshot: {e}");
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.clock.now_ms()).unwrap_or(i64::MAX);
        DateTime::from_timestamp_millis(ms).unwrap_or_default()
    }
}

impl std::fmt::Debug for PomodoroEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PomodoroEngine")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
