//! Stat tracking for the Motive decision engine.
//!
//! Every agent (and every interactable resource) owns a [`StatsTracker`]:
//! a set of normalized stats that decay toward their baselines, a list of
//! timed influencers that push them around, and the desired states the
//! owner wants to hold.
//!
//! # Modules
//!
//! - [`config`] -- Tracker tuning and numeric tolerances
//! - [`desired`] -- Desired-state satisfaction and goal resolution
//! - [`error`] -- Stat errors
//! - [`influencer`] -- Influencer stepping
//! - [`registry`] -- Shared stat definitions
//! - [`stat`] -- Per-agent stat instances and decay
//! - [`tracker`] -- The per-owner tracker

pub mod config;
pub mod desired;
pub mod error;
pub mod influencer;
pub mod registry;
pub mod stat;
pub mod tracker;

pub use config::{BASELINE_EPSILON, INFLUENCE_EPSILON, TrackerConfig};
pub use desired::StatGoal;
pub use error::StatError;
pub use registry::StatRegistry;
pub use stat::{StatChange, StatInstance};
pub use tracker::{CompletedInfluence, StatsTracker, TrackerTick};
