//! Read-only inspection snapshots for HUDs, logs, and the engine binary.
//!
//! Snapshots are copies: holding one never borrows the live brain or
//! resource. They serialize to JSON and export to `TypeScript`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Objective;
use crate::ids::{AgentId, BehaviourId, ResourceId, StatId};
use crate::structs::Position;

/// Current value of one stat instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatSnapshot {
    /// Stat identity.
    pub stat: StatId,
    /// Normalized value in `[0, 1]`.
    pub normalized: f64,
    /// Value in the definition's raw range.
    pub raw: f64,
}

/// Progress of one active influencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InfluencerSnapshot {
    /// Targeted stat.
    pub stat: StatId,
    /// Where the influencer came from.
    pub origin: String,
    /// Total signed change.
    pub max_change: f64,
    /// Change applied so far.
    pub applied_so_far: f64,
}

/// A desired state that is not currently satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UnsatisfiedSnapshot {
    /// Desired state name.
    pub name: String,
    /// Stat it is about.
    pub stat: StatId,
    /// Relation that should hold.
    pub objective: Objective,
    /// Normalized target.
    pub target: f64,
}

/// Everything the stats tracker knows at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TrackerSnapshot {
    /// Instantiated stats in id order.
    pub stats: Vec<StatSnapshot>,
    /// Active influencers in application order.
    pub influencers: Vec<InfluencerSnapshot>,
    /// Unsatisfied desired states.
    pub unsatisfied: Vec<UnsatisfiedSnapshot>,
}

/// Inspection view of one agent's brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BrainSnapshot {
    /// Agent identity.
    pub agent: AgentId,
    /// Agent name.
    pub name: String,
    /// Simulation time the snapshot was taken at.
    pub time: f64,
    /// Stats tracker state.
    pub tracker: TrackerSnapshot,
    /// Executing blocking behaviour.
    pub blocking: Option<BehaviourId>,
    /// Blocking behaviour waiting to reach its resource.
    pub pending: Option<BehaviourId>,
    /// Executing non-blocking behaviours.
    pub non_blocking: Vec<BehaviourId>,
    /// Resource the agent is heading to or using.
    pub target_resource: Option<ResourceId>,
    /// Where the movement layer should take the agent.
    pub move_target: Option<Position>,
}

/// Inspection view of one interactable resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceSnapshot {
    /// Resource identity.
    pub id: ResourceId,
    /// Resource name.
    pub name: String,
    /// Capacity.
    pub max_interactors: u32,
    /// Agents holding a reservation.
    pub reservations: Vec<AgentId>,
    /// Agents currently interacting.
    pub active: Vec<AgentId>,
    /// Object-side stats.
    pub tracker: TrackerSnapshot,
    /// Whether the resource will be removed at the end of the tick.
    pub pending_removal: bool,
}
