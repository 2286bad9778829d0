//! Agent decision-making for the Motive decision engine.
//!
//! A [`Brain`] owns one agent's stats and behaviours and decides each tick
//! which behaviour runs in the blocking slot and which run beside it.
//!
//! # Modules
//!
//! - [`behaviour`] -- Runtime state of a registered behaviour: executing
//!   flag, end time, retry timer.
//! - [`brain`] -- Arbitration, resource entry, director operations,
//!   snapshots.
//! - [`config`] -- Brain tunables.
//! - [`error`] -- Agent errors.
//! - [`memory`] -- The [`Memory`] collaborator trait and the bounded
//!   [`InteractionLog`].
//! - [`weight`] -- Weighting strategies.

pub mod behaviour;
pub mod brain;
pub mod config;
pub mod error;
pub mod memory;
pub mod weight;

pub use behaviour::Behaviour;
pub use brain::{Brain, BrainEvent};
pub use config::BrainConfig;
pub use error::AgentError;
pub use memory::{InteractionLog, Memory, Observation, RecalledObservation};
pub use weight::{FixedWeight, ImpactWeighting, MIN_WEIGHT, WeightStrategy};
