//! Tick callback that plays the configured script.
//!
//! Stands in for the movement and dialogue layers: spatial enter/stay
//! events and director commands are replayed at their scheduled times.
//! A failing step is logged and skipped.

use motive_agents::BrainEvent;
use motive_core::{ScriptEntry, Simulation, TickCallback, TickSummary};
use tracing::{debug, info, warn};

/// Replays [`ScriptEntry`] steps in time order.
pub struct ScriptCallback {
    /// Remaining steps, latest first so the next one pops off the end.
    pending: Vec<ScriptEntry>,
}

impl ScriptCallback {
    /// Schedule `entries`. Steps with equal times keep their file order.
    pub fn new(mut entries: Vec<ScriptEntry>) -> Self {
        entries.sort_by(|a, b| a.at().total_cmp(&b.at()));
        entries.reverse();
        Self { pending: entries }
    }

    /// Steps not yet run.
    pub const fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Run every step scheduled at or before the simulation's current time.
    pub fn apply_due(&mut self, sim: &mut Simulation) {
        let now = sim.clock().time();
        while self.pending.last().is_some_and(|e| e.at() <= now) {
            let Some(entry) = self.pending.pop() else {
                break;
            };
            match sim.apply_script(&entry) {
                Ok(events) => {
                    debug!(t = now, ?entry, "Script step applied");
                    log_events(&events);
                }
                Err(e) => warn!(t = now, ?entry, error = %e, "Script step failed"),
            }
        }
    }
}

impl TickCallback for ScriptCallback {
    fn on_tick(&mut self, summary: &TickSummary, sim: &mut Simulation) {
        for event in &summary.events {
            if !matches!(event.event, BrainEvent::StatChanged(_)) {
                info!(tick = summary.tick, agent = %event.agent, event = ?event.event, "Agent event");
            }
        }
        self.apply_due(sim);
    }
}

fn log_events(events: &[BrainEvent]) {
    for event in events {
        info!(?event, "Script event");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motive_core::SimulationConfig;

    use super::*;

    const YAML: &str = r#"
simulation:
  tick_seconds: 1.0
stats:
  - id: hunger
    min: 0
    max: 100
agents:
  - name: ada
script:
  - { kind: command, at: 2, line: "set ada hunger 90" }
  - { kind: command, at: 0, line: "set ada hunger 20" }
  - { kind: command, at: 1, line: "set nobody hunger 5" }
"#;

    fn hunger(sim: &Simulation) -> f64 {
        let ada = sim.find_agent("ada").unwrap();
        sim.brain(ada)
            .unwrap()
            .tracker()
            .value_of(&"hunger".into())
            .unwrap()
    }

    #[test]
    fn steps_run_in_time_order() {
        let config = SimulationConfig::parse(YAML).unwrap();
        let mut sim = config.build().unwrap();
        let mut script = ScriptCallback::new(config.script);

        script.apply_due(&mut sim);
        assert_eq!(script.remaining(), 2);
        assert!((hunger(&sim) - 0.2).abs() < 1e-9);

        let summary = sim.tick().unwrap();
        script.on_tick(&summary, &mut sim);
        assert_eq!(script.remaining(), 1);

        let summary = sim.tick().unwrap();
        script.on_tick(&summary, &mut sim);
        assert_eq!(script.remaining(), 0);
        assert!((hunger(&sim) - 0.9).abs() < 1e-9);
    }
}
