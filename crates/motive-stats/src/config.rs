//! Tunables for the stats tracker.
//!
//! [`TrackerConfig`] bundles every knob of the per-agent stats update so
//! that the simulation config, tests, and resources with their own object
//! stats can override the defaults.

use serde::Deserialize;

/// Distance from baseline below which decay stops.
pub const BASELINE_EPSILON: f64 = 1e-4;

/// Slack used when deciding whether an influencer has applied all of its
/// change. Absorbs the rounding left by summing many small increments.
pub const INFLUENCE_EPSILON: f64 = 1e-9;

/// Configuration for one stats tracker.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Minimum simulated seconds between two tracker updates (default: 0).
    ///
    /// Elapsed time accumulates while the tracker is gated and is applied
    /// in a single step once the interval is reached.
    pub min_update_interval: f64,

    /// Tolerance for the `Approximately` objective (default: 0.05).
    pub approximately_tolerance: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_update_interval: 0.0,
            approximately_tolerance: 0.05,
        }
    }
}
