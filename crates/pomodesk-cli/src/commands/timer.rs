use std::io::Write;
use std::time::Duration;

use clap::Subcommand;
use pomodesk_core::timer::driver::{self, SharedEngine};
use pomodesk_core::timer::SESSIONS_PER_LONG_BREAK;
use pomodesk_core::{
    format_clock, Clock, Config, Event, PomodoroEngine, SystemClock, TickDriver, TimerMode,
};
use tokio::sync::broadcast::error::RecvError;

use super::{open_engine, print_json};
use crate::notifier::TerminalNotifier;

/// A tick older than this while running means the process was suspended.
const STALL_THRESHOLD_MS: u64 = 2_000;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start if stopped, pause if running
    Toggle,
    /// Stop and refill the current interval
    Reset,
    /// Deliver a single tick
    Tick,
    /// Catch up on wall-clock time since the last tick
    Resync,
    /// Switch to another interval
    Mode {
        /// focus, short-break or long-break
        #[arg(value_parser = parse_mode)]
        mode: TimerMode,
        /// Start the new interval immediately
        #[arg(long)]
        auto_start: bool,
    },
    /// Run the countdown in the foreground until Ctrl-C
    Run,
}

fn parse_mode(s: &str) -> Result<TimerMode, String> {
    s.parse::<TimerMode>().map_err(|e| e.to_string())
}

pub fn run(action: TimerAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine(TerminalNotifier::new(config.notifications.clone()))?;

    let event = match action {
        TimerAction::Status => None,
        TimerAction::Start => engine.start(),
        TimerAction::Pause => engine.pause(),
        TimerAction::Toggle => Some(engine.toggle()),
        TimerAction::Reset => Some(engine.reset()),
        TimerAction::Tick => engine.tick(),
        TimerAction::Resync => engine.resync(),
        TimerAction::Mode { mode, auto_start } => Some(engine.switch_mode(mode, auto_start)),
        TimerAction::Run => {
            let interval = Duration::from_millis(config.driver.tick_interval_ms);
            return run_foreground(engine, interval);
        }
    };

    if let Some(event) = event {
        print_json(&event)?;
    }
    print_json(&engine.snapshot_event())
}

/// Tick the engine on a tokio runtime, redrawing the countdown until Ctrl-C.
fn run_foreground(
    mut engine: PomodoroEngine,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    engine.start();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut events = engine.subscribe();
        let shared = driver::shared(engine);
        let ticker = TickDriver::spawn(shared.clone(), interval);
        let mut redraw = tokio::time::interval(Duration::from_millis(250));
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                _ = redraw.tick() => draw(&shared),
                received = events.recv() => match received {
                    Ok(Event::IntervalCompleted { .. }) => println!(),
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }

        ticker.stop().await;
        println!();
        tracing::debug!("foreground timer stopped");
    });
    Ok(())
}

fn draw(shared: &SharedEngine) {
    let mut engine = driver::lock(shared);
    let stalled = engine
        .last_tick_epoch_ms()
        .is_some_and(|last| SystemClock.now_ms().saturating_sub(last) > STALL_THRESHOLD_MS);
    if stalled {
        engine.resync();
    }

    let state = if engine.is_running() { "" } else { " (paused)" };
    print!(
        "\r{:<11} {}  [{}/{}]{state}   ",
        engine.mode().label(),
        format_clock(engine.remaining_seconds()),
        engine.session_indicator(),
        SESSIONS_PER_LONG_BREAK,
    );
    let _ = std::io::stdout().flush();
}
