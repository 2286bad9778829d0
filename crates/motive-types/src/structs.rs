//! Core data structs: stat definitions, desired states, influencers, and
//! behaviour definitions.
//!
//! These are plain data. The logic that operates on them lives in
//! `motive-stats` (decay, influencer stepping, goal resolution),
//! `motive-world` (resource interaction) and `motive-agents` (arbitration).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Objective;
use crate::ids::{BehaviourId, ResourceId, StatId};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in world space, as reported by the movement layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Position {
    /// Create a position from its three coordinates.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx.mul_add(dx, dy.mul_add(dy, dz * dz)).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Immutable definition of a stat, shared by every agent that tracks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatDefinition {
    /// Identity of the stat.
    pub id: StatId,
    /// Human-readable name for status output.
    pub display_name: String,
    /// Raw value mapped to normalized 0.
    pub min: f64,
    /// Raw value mapped to normalized 1.
    pub max: f64,
    /// Normalized value the stat drifts back to over time.
    pub baseline: f64,
    /// Seconds over which a full step toward baseline is taken.
    pub speed_to_baseline: f64,
    /// Whether the stat drifts toward its baseline at all.
    pub decays: bool,
}

impl StatDefinition {
    /// Whether this definition actually decays.
    ///
    /// A non-positive `speed_to_baseline` is a configuration error and is
    /// treated as "does not decay".
    pub fn decays_over_time(&self) -> bool {
        self.decays && self.speed_to_baseline > 0.0
    }

    /// Convert a raw value in `[min, max]` to a normalized value in `[0, 1]`.
    pub fn normalize(&self, raw: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() <= f64::EPSILON {
            return 0.0;
        }
        ((raw - self.min) / span).clamp(0.0, 1.0)
    }

    /// Convert a normalized value to the raw `[min, max]` range.
    pub fn denormalize(&self, normalized: f64) -> f64 {
        normalized.clamp(0.0, 1.0).mul_add(self.max - self.min, self.min)
    }
}

/// A condition on a stat that an agent wants to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Human-readable name ("not hungry").
    pub name: String,
    /// Stat the condition is about.
    pub stat: StatId,
    /// Relation that must hold between the stat and `target`.
    pub objective: Objective,
    /// Normalized target value.
    pub target: f64,
    /// Nested refinements. Only the root takes part in arbitration.
    #[serde(default)]
    pub sub_states: Vec<DesiredState>,
}

/// A precondition a behaviour needs before it becomes available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRequirement {
    /// Stat being tested.
    pub stat: StatId,
    /// Relation that must hold.
    pub objective: Objective,
    /// Normalized threshold.
    pub threshold: f64,
}

/// The effect a behaviour is expected to have on a stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatImpact {
    /// Stat the behaviour moves.
    pub stat: StatId,
    /// Direction the behaviour moves it in.
    pub objective: Objective,
}

// ---------------------------------------------------------------------------
// Influencers
// ---------------------------------------------------------------------------

/// A timed, bounded change applied to one stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Influencer {
    /// Stat the change is applied to.
    pub stat: StatId,
    /// Total signed change, in normalized units.
    pub max_change: f64,
    /// Seconds over which the change is spread. `0` applies it at once.
    pub duration: f64,
    /// Seconds before the same source may influence the agent again.
    pub cooldown: f64,
    /// Portion of `max_change` applied so far.
    pub applied_so_far: f64,
    /// Resource that generated the influencer, if any.
    pub source: Option<ResourceId>,
    /// Where the influencer came from, for status output.
    pub origin: String,
}

impl Influencer {
    /// Create an influencer that has not applied anything yet.
    pub fn new(stat: StatId, max_change: f64, duration: f64, origin: impl Into<String>) -> Self {
        Self {
            stat,
            max_change,
            duration,
            cooldown: 0.0,
            applied_so_far: 0.0,
            source: None,
            origin: origin.into(),
        }
    }

    /// Attach a source resource and its cooldown.
    #[must_use]
    pub fn with_source(mut self, source: ResourceId, cooldown: f64) -> Self {
        self.source = Some(source);
        self.cooldown = cooldown;
        self
    }
}

/// Template a resource turns into an [`Influencer`] per interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfluenceTemplate {
    /// Stat the influencer will target.
    pub stat: StatId,
    /// Signed total change.
    pub max_change: f64,
}

// ---------------------------------------------------------------------------
// Behaviours
// ---------------------------------------------------------------------------

/// Immutable definition of a behaviour, shared by every brain that
/// registers it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourDefinition {
    /// Identity of the behaviour.
    pub id: BehaviourId,
    /// Seconds between availability checks.
    pub retry_frequency: f64,
    /// Seconds after which a started behaviour ends (also the timeout for
    /// reaching a target resource).
    pub abort_duration: f64,
    /// Whether the behaviour occupies the agent's primary action slot.
    pub blocking: bool,
    /// Whether a higher-weight candidate may interrupt it.
    pub interruptible: bool,
    /// Preconditions that must all hold for the behaviour to be available.
    pub requirements: Vec<StatRequirement>,
    /// Stats the behaviour is expected to move.
    pub impacts: Vec<StatImpact>,
    /// Influences applied directly when no resource is targeted.
    pub character_influences: Vec<InfluenceTemplate>,
    /// Whether the behaviour is carried out at an interactable resource.
    pub targets_resource: bool,
    /// Fixed weight replacing the default impact weighting.
    pub weight_override: Option<f64>,
    /// Set when the definition failed validation; the behaviour is then
    /// never available.
    pub misconfigured: Option<String>,
}

impl BehaviourDefinition {
    /// A definition with no preconditions, impacts or influences.
    pub fn new(id: impl Into<BehaviourId>) -> Self {
        Self {
            id: id.into(),
            retry_frequency: 0.0,
            abort_duration: 5.0,
            blocking: true,
            interruptible: true,
            requirements: Vec::new(),
            impacts: Vec::new(),
            character_influences: Vec::new(),
            targets_resource: false,
            weight_override: None,
            misconfigured: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunger() -> StatDefinition {
        StatDefinition {
            id: StatId::from("hunger"),
            display_name: String::from("Hunger"),
            min: 0.0,
            max: 100.0,
            baseline: 0.5,
            speed_to_baseline: 10.0,
            decays: true,
        }
    }

    #[test]
    fn normalize_maps_range_to_unit_interval() {
        let def = hunger();
        assert!((def.normalize(25.0) - 0.25).abs() < 1e-9);
        assert!((def.normalize(250.0) - 1.0).abs() < 1e-9);
        assert!((def.denormalize(0.75) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn zero_speed_does_not_decay() {
        let mut def = hunger();
        def.speed_to_baseline = 0.0;
        assert!(!def.decays_over_time());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-6);
    }
}
