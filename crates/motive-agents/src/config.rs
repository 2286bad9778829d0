//! Tunables shared by every brain.

use serde::Deserialize;

use crate::weight::MIN_WEIGHT;

/// Configuration applied to each brain at construction.
///
/// Read from the `agents` section defaults in `motive-config.yaml`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    /// Floor applied by the default impact weighting (default: 0.01).
    ///
    /// Keeps an always-available fallback behaviour selectable when no
    /// desired state is unsatisfied.
    pub min_weight: f64,

    /// Observations kept by an agent's interaction log (default: 64).
    pub memory_capacity: usize,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            min_weight: MIN_WEIGHT,
            memory_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BrainConfig::default();
        assert!((cfg.min_weight - 0.01).abs() < f64::EPSILON);
        assert_eq!(cfg.memory_capacity, 64);
    }
}
