//! Error types for the `motive-world` crate.
//!
//! Reservation and interaction failures are ordinary outcomes: an agent that
//! finds a resource full picks another or stays idle. They are returned as
//! [`WorldError`] values and never panic.

use motive_stats::StatError;
use motive_types::{AgentId, ResourceId};

/// Errors that can occur while reserving or using a resource.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// Reservations plus active interactors already fill the resource.
    #[error("resource {resource} is at capacity ({capacity})")]
    CapacityExceeded {
        /// The full resource.
        resource: ResourceId,
        /// Its `max_interactors`.
        capacity: u32,
    },

    /// The agent already holds a reservation on the resource.
    #[error("agent {agent} already holds a reservation on resource {resource}")]
    AlreadyReserved {
        /// The resource.
        resource: ResourceId,
        /// The agent.
        agent: AgentId,
    },

    /// The agent is already interacting with the resource.
    #[error("agent {agent} is already interacting with resource {resource}")]
    AlreadyActive {
        /// The resource.
        resource: ResourceId,
        /// The agent.
        agent: AgentId,
    },

    /// The agent entered without a reservation and the resource does not
    /// repeat.
    #[error("agent {agent} has no reservation on resource {resource}")]
    NotReserved {
        /// The resource.
        resource: ResourceId,
        /// The agent.
        agent: AgentId,
    },

    /// The agent used the resource too recently.
    #[error("agent {agent} is on cooldown for resource {resource} until t={until}")]
    OnCooldown {
        /// The resource.
        resource: ResourceId,
        /// The agent.
        agent: AgentId,
        /// Simulation time at which the cooldown ends.
        until: f64,
    },

    /// The resource is not in the registry.
    #[error("resource not found: {0}")]
    UnknownResource(ResourceId),

    /// An object-side influencer referenced an unknown stat.
    #[error(transparent)]
    Stat(#[from] StatError),
}
