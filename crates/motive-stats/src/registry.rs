//! Immutable registry of stat definitions.
//!
//! Built once before the simulation starts and shared by `Arc` between every
//! stats tracker. Trackers key their instances by [`StatId`], never by the
//! address of a definition.

use std::collections::BTreeMap;
use std::sync::Arc;

use motive_types::{StatDefinition, StatId};
use tracing::warn;

use crate::error::StatError;

/// Lookup table from stat id to its shared definition.
#[derive(Debug, Clone, Default)]
pub struct StatRegistry {
    definitions: BTreeMap<StatId, Arc<StatDefinition>>,
}

impl StatRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            definitions: BTreeMap::new(),
        }
    }

    /// Add a definition.
    ///
    /// A definition that claims to decay but has a non-positive
    /// `speed_to_baseline` is accepted and logged; it will never decay.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::DuplicateStat`] if the id is already registered.
    pub fn insert(&mut self, definition: StatDefinition) -> Result<(), StatError> {
        if self.definitions.contains_key(&definition.id) {
            return Err(StatError::DuplicateStat(definition.id));
        }
        if definition.decays && definition.speed_to_baseline <= 0.0 {
            warn!(
                stat = %definition.id,
                speed_to_baseline = definition.speed_to_baseline,
                "Non-positive speed_to_baseline; stat will not decay"
            );
        }
        self.definitions
            .insert(definition.id.clone(), Arc::new(definition));
        Ok(())
    }

    /// Look up a definition.
    pub fn get(&self, id: &StatId) -> Option<&Arc<StatDefinition>> {
        self.definitions.get(id)
    }

    /// Whether the id is registered.
    pub fn contains(&self, id: &StatId) -> bool {
        self.definitions.contains_key(id)
    }

    /// Iterate over all definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<StatDefinition>> {
        self.definitions.values()
    }

    /// Number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl FromIterator<StatDefinition> for StatRegistry {
    /// Collect definitions, keeping the first of any duplicate ids.
    fn from_iter<I: IntoIterator<Item = StatDefinition>>(iter: I) -> Self {
        let mut registry = Self::new();
        for definition in iter {
            if let Err(err) = registry.insert(definition) {
                warn!(error = %err, "Skipping stat definition");
            }
        }
        registry
    }
}
