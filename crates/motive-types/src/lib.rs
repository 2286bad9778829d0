//! Shared type definitions for the Motive decision engine.
//!
//! This crate is the single source of truth for the data passed between
//! the stats, world, agents, and core crates. Inspection snapshots flow
//! downstream to `TypeScript` via `ts-rs` for debugging HUDs.
//!
//! # Modules
//!
//! - [`ids`] -- UUID identifiers for agents and resources, name keys for
//!   stats and behaviours
//! - [`enums`] -- Objectives, goals, and behaviour lifecycle enums
//! - [`structs`] -- Stat definitions, desired states, influencers, behaviour
//!   definitions, positions
//! - [`snapshot`] -- Serializable inspection snapshots

pub mod enums;
pub mod ids;
pub mod snapshot;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{BehaviourSlot, FinishReason, Goal, Objective, UnknownObjective};
pub use ids::{AgentId, BehaviourId, ResourceId, StatId};
pub use snapshot::{
    BrainSnapshot, InfluencerSnapshot, ResourceSnapshot, StatSnapshot, TrackerSnapshot,
    UnsatisfiedSnapshot,
};
pub use structs::{
    BehaviourDefinition, DesiredState, InfluenceTemplate, Influencer, Position, StatDefinition,
    StatImpact, StatRequirement,
};
