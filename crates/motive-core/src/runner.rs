//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`Simulation::tick`] until a bound is reached
//! or a stop is requested, pacing ticks in real time with
//! `tokio::time::sleep` when an interval is configured. A [`TickCallback`]
//! runs after every tick with mutable access to the simulation, which is
//! where scripted spatial events and director commands are injected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::simulation::{Simulation, SimulationError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick failed as a whole.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },
}

/// Why the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `max_ticks` ticks ran.
    MaxTicksReached,
    /// [`RunControl::request_stop`] was called.
    StopRequested,
}

/// Bounds and the stop flag for one run.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    max_ticks: u64,
    tick_interval_ms: u64,
    stop: Arc<AtomicBool>,
}

impl RunControl {
    /// `max_ticks == 0` runs until stopped.
    pub fn new(max_ticks: u64, tick_interval_ms: u64) -> Self {
        Self {
            max_ticks,
            tick_interval_ms,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Ask the loop to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// The tick bound, `0` for none.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    const fn tick_limit_reached(&self, tick: u64) -> bool {
        self.max_ticks > 0 && tick >= self.max_ticks
    }
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: EndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// Agent faults across the whole run.
    pub total_faults: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, sim: &mut Simulation);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _sim: &mut Simulation) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails as a whole (clock overflow).
/// Individual agent failures are counted and the run continues.
pub async fn run_simulation(
    sim: &mut Simulation,
    control: &RunControl,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut total_faults: u64 = 0;

    info!(
        max_ticks = control.max_ticks,
        tick_interval_ms = control.tick_interval_ms,
        tick_seconds = sim.clock().delta(),
        "Simulation starting"
    );

    loop {
        if control.is_stop_requested() {
            info!("Stop requested");
            return Ok(SimulationResult {
                end_reason: EndReason::StopRequested,
                final_summary: last_summary,
                total_ticks,
                total_faults,
            });
        }

        let summary = sim.tick()?;
        total_ticks = total_ticks.saturating_add(1);
        total_faults =
            total_faults.saturating_add(u64::try_from(summary.faults.len()).unwrap_or(u64::MAX));

        callback.on_tick(&summary, sim);

        if control.tick_limit_reached(summary.tick) {
            info!(tick = summary.tick, max_ticks = control.max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: EndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
                total_faults,
            });
        }

        last_summary = Some(summary);

        if control.tick_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(control.tick_interval_ms)).await;
        } else {
            tokio::task::yield_now().await;
        }
    }
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        total_faults = result.total_faults,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_time = result.final_summary.as_ref().map(|s| s.time),
        "Simulation ended"
    );
    if result.final_summary.is_none() {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motive_stats::StatRegistry;

    use super::*;
    use crate::clock::SimulationClock;

    fn empty_sim() -> Simulation {
        Simulation::new(
            SimulationClock::new(0.25).unwrap(),
            Arc::new(StatRegistry::new()),
        )
    }

    struct StopAfter {
        control: RunControl,
        at: u64,
        seen: u64,
    }

    impl TickCallback for StopAfter {
        fn on_tick(&mut self, summary: &TickSummary, _sim: &mut Simulation) {
            self.seen = summary.tick;
            if summary.tick >= self.at {
                self.control.request_stop();
            }
        }
    }

    #[tokio::test]
    async fn stops_at_tick_limit() {
        let mut sim = empty_sim();
        let control = RunControl::new(5, 0);
        let result = run_simulation(&mut sim, &control, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, EndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(result.final_summary.map(|s| s.tick), Some(5));
        assert!((sim.clock().time() - 1.25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn stop_flag_ends_unbounded_run() {
        let mut sim = empty_sim();
        let control = RunControl::new(0, 1);
        let mut callback = StopAfter {
            control: control.clone(),
            at: 3,
            seen: 0,
        };
        let result = run_simulation(&mut sim, &control, &mut callback)
            .await
            .unwrap();
        assert_eq!(result.end_reason, EndReason::StopRequested);
        assert_eq!(result.total_ticks, 3);
        assert_eq!(callback.seen, 3);
    }

    #[tokio::test]
    async fn stop_before_first_tick() {
        let mut sim = empty_sim();
        let control = RunControl::new(10, 0);
        control.request_stop();
        let result = run_simulation(&mut sim, &control, &mut NoOpCallback)
            .await
            .unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        log_simulation_end(&result);
    }
}
