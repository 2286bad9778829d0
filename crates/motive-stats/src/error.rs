//! Error types for the motive-stats crate.
//!
//! Stat operations never panic. Anything that can go wrong (a reference to
//! a stat nobody defined, a non-finite value from a script) is reported as a
//! [`StatError`] so the caller can log it and carry on.

use motive_types::StatId;

/// Errors that can occur while reading or mutating stats.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatError {
    /// The stat id is not present in the definition registry.
    #[error("unknown stat definition: {0}")]
    UnknownStat(StatId),

    /// A NaN or infinite value was supplied for a stat.
    #[error("non-finite value {value} supplied for stat {stat}")]
    NonFiniteValue {
        /// The stat being written.
        stat: StatId,
        /// The rejected value.
        value: f64,
    },

    /// A stat definition was registered twice.
    #[error("duplicate stat definition: {0}")]
    DuplicateStat(StatId),
}
