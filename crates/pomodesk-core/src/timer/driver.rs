//! Periodic tick delivery.
//!
//! The engine is shared behind one mutex; every `tick()` and `resync()`
//! reads and writes state inside that critical section, so overlapping
//! drivers cannot double-count.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::engine::PomodoroEngine;

pub type SharedEngine = Arc<Mutex<PomodoroEngine>>;

/// Shortest period a driver will tick at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub fn shared(engine: PomodoroEngine) -> SharedEngine {
    Arc::new(Mutex::new(engine))
}

/// Lock the engine, recovering from a poisoned mutex.
///
/// Each engine operation leaves the state consistent before it can
/// panic, so a poisoned guard is still safe to use.
pub fn lock(engine: &SharedEngine) -> MutexGuard<'_, PomodoroEngine> {
    engine.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle to a running tick loop. Dropping it stops the loop.
pub struct TickDriver {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl TickDriver {
    /// Spawn a loop that ticks `engine` every `interval` on the current runtime.
    ///
    /// Late wake-ups are skipped rather than bunched; `resync()` recovers
    /// the lost wall-clock time.
    pub fn spawn(engine: SharedEngine, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let (stop, mut stopped) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        lock(&engine).tick();
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("tick driver stopped");
        });
        Self {
            stop,
            task: Some(task),
        }
    }

    /// Stop ticking and wait for the loop to exit.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use crate::storage::MemorySnapshotStore;
    use crate::timer::clock::ManualClock;
    use crate::timer::TimerMode;

    const T0: u64 = 1_700_000_000_000;

    /// Let `n` driver ticks land, moving the wall clock half a period ahead
    /// of each one so test and driver never act on the same instant.
    async fn run_seconds(clock: &ManualClock, n: u64) {
        tokio::time::sleep(Duration::from_millis(500)).await;
        for _ in 0..n {
            clock.advance_secs(1);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    fn running_engine(clock: &ManualClock) -> SharedEngine {
        let mut engine =
            PomodoroEngine::load(clock.clone(), MemorySnapshotStore::new(), NoopNotifier);
        engine.toggle();
        shared(engine)
    }

    #[tokio::test(start_paused = true)]
    async fn driver_ticks_on_interval() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        let driver = TickDriver::spawn(engine.clone(), Duration::from_secs(1));

        run_seconds(&clock, 3).await;
        driver.stop().await;

        assert_eq!(lock(&engine).remaining_seconds(), 25 * 60 - 3);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_drivers_do_not_double_count() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        let a = TickDriver::spawn(engine.clone(), Duration::from_secs(1));
        let b = TickDriver::spawn(engine.clone(), Duration::from_secs(1));

        run_seconds(&clock, 5).await;
        a.stop().await;
        b.stop().await;

        assert_eq!(lock(&engine).remaining_seconds(), 25 * 60 - 5);
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_phase_drivers_do_not_double_count() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        let a = TickDriver::spawn(engine.clone(), Duration::from_secs(1));

        // Second driver ticks at +1.5 s, +2.5 s, ...
        tokio::time::sleep(Duration::from_millis(500)).await;
        clock.advance_ms(500);
        let b = TickDriver::spawn(engine.clone(), Duration::from_secs(1));

        // Keep the wall clock level with tokio time, stepping between ticks.
        tokio::time::sleep(Duration::from_millis(125)).await;
        for _ in 0..38 {
            clock.advance_ms(250);
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        a.stop().await;
        b.stop().await;

        assert_eq!(lock(&engine).remaining_seconds(), 25 * 60 - 10);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_clamped() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        let driver = TickDriver::spawn(engine.clone(), Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!driver.is_finished());
        driver.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stale_ticks_after_pause_are_noops() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        let driver = TickDriver::spawn(engine.clone(), Duration::from_secs(1));

        run_seconds(&clock, 1).await;
        lock(&engine).toggle();
        let paused_at = lock(&engine).remaining_seconds();
        assert_eq!(paused_at, 25 * 60 - 1);

        for _ in 0..3 {
            clock.advance_secs(1);
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
        driver.stop().await;

        let engine = lock(&engine);
        assert_eq!(engine.remaining_seconds(), paused_at);
        assert_eq!(engine.mode(), TimerMode::Focus);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_loop() {
        let clock = ManualClock::new(T0);
        let engine = running_engine(&clock);
        drop(TickDriver::spawn(engine.clone(), Duration::from_secs(1)));

        run_seconds(&clock, 3).await;
        assert_eq!(lock(&engine).remaining_seconds(), 25 * 60);
    }
}
