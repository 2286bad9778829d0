//! Shared environmental resources for the Motive decision engine.
//!
//! Resources ("interactables") are capacity-limited objects that hand out
//! timed stat influencers to the agents using them, with a per-agent
//! cooldown between uses.
//!
//! # Modules
//!
//! - [`error`] -- Reservation and interaction errors.
//! - [`interactable`] -- [`Interactable`]: reservation, activation,
//!   cooldown, and destroy-on-use.
//! - [`registry`] -- [`ResourceRegistry`]: the single owner of every
//!   resource, with nearest-candidate search.

pub mod error;
pub mod interactable;
pub mod registry;

pub use error::WorldError;
pub use interactable::{Interactable, InteractableSettings, Interaction};
pub use registry::ResourceRegistry;
