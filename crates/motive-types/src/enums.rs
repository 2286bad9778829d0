//! Enumeration types for the Motive decision engine.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Objectives and goals
// ---------------------------------------------------------------------------

/// Relational test applied between a stat value and a target.
///
/// Used by desired states ("keep hunger below 0.3") and by behaviour
/// preconditions ("only available while energy is above 0.2").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Objective {
    /// Satisfied while the value is strictly below the target.
    LessThan,
    /// Satisfied while the value is strictly above the target.
    GreaterThan,
    /// Satisfied while the value is within tolerance of the target.
    Approximately,
}

impl Objective {
    /// Test `value` against `target` using this objective.
    ///
    /// `tolerance` only matters for [`Objective::Approximately`].
    pub fn test(self, value: f64, target: f64, tolerance: f64) -> bool {
        match self {
            Self::LessThan => value < target,
            Self::GreaterThan => value > target,
            Self::Approximately => (value - target).abs() <= tolerance,
        }
    }
}

impl core::fmt::Display for Objective {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let symbol = match self {
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Approximately => "~",
        };
        f.write_str(symbol)
    }
}

/// Error returned when an objective string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownObjective(pub String);

impl core::fmt::Display for UnknownObjective {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unrecognized objective `{}`", self.0)
    }
}

impl std::error::Error for UnknownObjective {}

impl core::str::FromStr for Objective {
    type Err = UnknownObjective;

    /// Accepts the snake case names, the `PascalCase` names and the
    /// comparison symbols `<`, `>` and `~`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "less_than" | "lessthan" | "<" => Ok(Self::LessThan),
            "greater_than" | "greaterthan" | ">" => Ok(Self::GreaterThan),
            "approximately" | "~" | "=" => Ok(Self::Approximately),
            _ => Err(UnknownObjective(s.to_owned())),
        }
    }
}

/// Direction a stat needs to move to satisfy the agent's desires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Goal {
    /// The stat should go up.
    Increase,
    /// The stat should go down.
    Decrease,
    /// Nothing needs to change.
    NoAction,
}

// ---------------------------------------------------------------------------
// Behaviour lifecycle
// ---------------------------------------------------------------------------

/// Why an executing (or pending) behaviour stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FinishReason {
    /// The behaviour's end time passed.
    Completed,
    /// A higher-weight candidate took the blocking slot.
    Interrupted,
    /// A pending behaviour never reached its resource in time.
    Abandoned,
    /// A director command stopped the agent.
    Stopped,
    /// The behaviour was removed from the brain while active.
    Deregistered,
}

/// Which slot a behaviour occupies while it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BehaviourSlot {
    /// The agent's single primary action slot.
    Blocking,
    /// One of any number of background slots.
    NonBlocking,
}
