//! Error types for the engine binary.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or building failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: motive_core::ConfigError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: motive_core::RunnerError,
    },

    /// The final snapshot could not be serialised.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
