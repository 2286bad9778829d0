//! The explicitly owned set of interactables.
//!
//! There is one [`ResourceRegistry`] per simulation. It is passed by `&mut`
//! to whichever brain is ticking, so reservations are single-writer: the
//! first agent to reserve in a frame wins and later agents in the same
//! frame see the updated counts.

use std::collections::BTreeMap;

use motive_types::{AgentId, Position, ResourceId, ResourceSnapshot};
use tracing::info;

use crate::error::WorldError;
use crate::interactable::Interactable;

/// All interactables in the world, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<ResourceId, Interactable>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
        }
    }

    /// Add a resource and return its id.
    pub fn insert(&mut self, resource: Interactable) -> ResourceId {
        let id = resource.id();
        self.resources.insert(id, resource);
        id
    }

    /// Look up a resource.
    pub fn get(&self, id: ResourceId) -> Option<&Interactable> {
        self.resources.get(&id)
    }

    /// Look up a resource mutably.
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Interactable> {
        self.resources.get_mut(&id)
    }

    /// Look up a resource mutably, failing if it is gone.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownResource`] if `id` is not registered.
    pub fn require_mut(&mut self, id: ResourceId) -> Result<&mut Interactable, WorldError> {
        self.resources
            .get_mut(&id)
            .ok_or(WorldError::UnknownResource(id))
    }

    /// Find a resource by display name.
    pub fn find_by_name(&self, name: &str) -> Option<ResourceId> {
        self.resources
            .values()
            .find(|r| r.name() == name)
            .map(Interactable::id)
    }

    /// Iterate resources in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Interactable> {
        self.resources.values()
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The nearest resource `agent` could use now that also passes `accept`.
    ///
    /// A resource qualifies when it has space and the agent is not on
    /// cooldown for it.
    pub fn nearest_candidate<F>(
        &self,
        agent: AgentId,
        from: Position,
        now: f64,
        accept: F,
    ) -> Option<ResourceId>
    where
        F: Fn(&Interactable) -> bool,
    {
        self.resources
            .values()
            .filter(|r| !r.is_pending_removal())
            .filter(|r| r.has_space_for(agent) && !r.is_on_cooldown_for(agent, now))
            .filter(|r| accept(r))
            .min_by(|a, b| {
                from.distance_to(&a.position())
                    .total_cmp(&from.distance_to(&b.position()))
            })
            .map(Interactable::id)
    }

    /// Advance every resource's own stats.
    pub fn tick(&mut self, dt: f64) {
        for resource in self.resources.values_mut() {
            let _ = resource.tick(dt);
        }
    }

    /// Remove resources marked for removal and return their ids.
    pub fn remove_spent(&mut self) -> Vec<ResourceId> {
        let spent: Vec<ResourceId> = self
            .resources
            .values()
            .filter(|r| r.is_pending_removal())
            .map(Interactable::id)
            .collect();
        for id in &spent {
            if let Some(resource) = self.resources.remove(id) {
                info!(resource = resource.name(), "Removed spent resource");
            }
        }
        spent
    }

    /// Snapshots of every resource in id order.
    pub fn snapshots(&self) -> Vec<ResourceSnapshot> {
        self.resources.values().map(Interactable::snapshot).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use motive_stats::{StatRegistry, TrackerConfig};
    use motive_types::{Goal, InfluenceTemplate, StatDefinition, StatId};

    use super::*;
    use crate::interactable::InteractableSettings;

    fn stats() -> Arc<StatRegistry> {
        Arc::new(
            std::iter::once(StatDefinition {
                id: StatId::from("hunger"),
                display_name: String::from("Hunger"),
                min: 0.0,
                max: 1.0,
                baseline: 0.5,
                speed_to_baseline: 10.0,
                decays: true,
            })
            .collect(),
        )
    }

    fn food(name: &str, x: f32, max_change: f64) -> Interactable {
        Interactable::new(
            InteractableSettings {
                name: name.to_owned(),
                position: Position::new(x, 0.0, 0.0),
                character_influences: vec![InfluenceTemplate {
                    stat: StatId::from("hunger"),
                    max_change,
                }],
                cooldown: 10.0,
                destroy_on_use: name == "apple",
                ..InteractableSettings::default()
            },
            stats(),
            TrackerConfig::default(),
        )
    }

    #[test]
    fn nearest_candidate_skips_full_and_unsuitable() {
        let mut registry = ResourceRegistry::new();
        let near = registry.insert(food("near", 1.0, -0.3));
        let far = registry.insert(food("far", 9.0, -0.3));
        let salty = registry.insert(food("salty", 0.5, 0.3));

        let agent = AgentId::new();
        let hunger = StatId::from("hunger");
        let wants_less = |r: &Interactable| r.moves_stat(&hunger, Goal::Decrease);

        let origin = Position::default();
        assert_eq!(registry.nearest_candidate(agent, origin, 0.0, wants_less), Some(near));

        registry.get_mut(near).unwrap().reserve_for(AgentId::new()).unwrap();
        assert_eq!(registry.nearest_candidate(agent, origin, 0.0, wants_less), Some(far));

        assert_ne!(registry.nearest_candidate(agent, origin, 0.0, wants_less), Some(salty));
    }

    #[test]
    fn nearest_candidate_respects_cooldown() {
        let mut registry = ResourceRegistry::new();
        let id = registry.insert(food("bowl", 1.0, -0.3));
        let agent = AgentId::new();
        registry.get_mut(id).unwrap().complete_influence(agent, 0.0);

        assert_eq!(
            registry.nearest_candidate(agent, Position::default(), 5.0, |_| true),
            None
        );
        assert_eq!(
            registry.nearest_candidate(agent, Position::default(), 11.0, |_| true),
            Some(id)
        );
    }

    #[test]
    fn spent_resources_are_removed() {
        let mut registry = ResourceRegistry::new();
        let apple = registry.insert(food("apple", 1.0, -0.3));
        let bowl = registry.insert(food("bowl", 2.0, -0.3));

        registry.get_mut(apple).unwrap().complete_influence(AgentId::new(), 1.0);
        assert_eq!(registry.remove_spent(), vec![apple]);
        assert!(registry.get(apple).is_none());
        assert!(registry.get(bowl).is_some());
        assert_eq!(registry.find_by_name("bowl"), Some(bowl));
        assert!(matches!(
            registry.require_mut(apple),
            Err(WorldError::UnknownResource(_))
        ));
    }
}
