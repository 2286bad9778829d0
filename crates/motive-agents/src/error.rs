//! Error types for the motive-agents crate.
//!
//! Brain operations return typed errors rather than panicking. A failing
//! brain only affects its own agent; the simulation logs the error and
//! moves on to the next one.

use motive_stats::StatError;
use motive_types::{AgentId, BehaviourId, ResourceId};
use motive_world::WorldError;

/// Errors that can occur during brain and behaviour operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    /// No behaviour with this id is registered on the brain.
    #[error("behaviour not registered: {0}")]
    UnknownBehaviour(BehaviourId),

    /// A behaviour with this id is already registered on the brain.
    #[error("behaviour already registered: {0}")]
    DuplicateBehaviour(BehaviourId),

    /// A resource-targeting behaviour found nothing it could use.
    #[error("no usable resource for behaviour {behaviour}")]
    NoResourceAvailable {
        /// The behaviour that needed a resource.
        behaviour: BehaviourId,
    },

    /// The agent entered a resource its brain is not heading to or using.
    #[error("agent {agent} is not targeting resource {resource}")]
    NotTargeting {
        /// The agent.
        agent: AgentId,
        /// The resource it entered.
        resource: ResourceId,
    },

    /// A tick was requested with a negative or non-finite delta.
    #[error("invalid tick delta: {0}")]
    InvalidDelta(f64),

    /// A tick was requested for a time before the brain's last tick.
    #[error("time went backwards: t={now} is before t={last}")]
    TimeReversed {
        /// Requested time.
        now: f64,
        /// Time of the previous tick.
        last: f64,
    },

    /// A stat operation failed.
    #[error(transparent)]
    Stat(#[from] StatError),

    /// A resource operation failed.
    #[error(transparent)]
    World(#[from] WorldError),
}
