//! Capacity-limited, cooldown-gated resources that hand out influencers.
//!
//! An [`Interactable`] tracks two lists of agents:
//!
//! - **reservations**: agents that claimed a slot and are on their way
//! - **active**: agents currently receiving influencers
//!
//! `reservations + active` never exceeds `max_interactors`. An agent moves
//! from reserved to active on entry ([`Interactable::begin_interaction`])
//! and leaves the active list when its influence completes
//! ([`Interactable::complete_influence`], which also starts the per-agent
//! cooldown) or when its behaviour ends without one
//! ([`Interactable::release_idle`]).

use std::collections::BTreeMap;
use std::sync::Arc;

use motive_stats::{StatRegistry, StatsTracker, TrackerConfig, TrackerTick};
use motive_types::{
    AgentId, Goal, InfluenceTemplate, Influencer, Position, ResourceId, ResourceSnapshot, StatId,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::WorldError;

/// Static configuration of an interactable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractableSettings {
    /// Display name, also used as the origin of its influencers.
    pub name: String,
    /// Where agents go to use it.
    pub position: Position,
    /// Maximum number of reserved plus active agents.
    pub max_interactors: u32,
    /// Influences applied to each interacting agent.
    pub character_influences: Vec<InfluenceTemplate>,
    /// Influences applied to the resource's own stats per interaction.
    pub object_influences: Vec<InfluenceTemplate>,
    /// Seconds over which each influence is spread.
    pub duration: f64,
    /// Seconds an agent must wait after an interaction completes.
    pub cooldown: f64,
    /// Whether agents may start again without a fresh reservation.
    pub repeating: bool,
    /// Whether the resource is removed after its first completed interaction.
    pub destroy_on_use: bool,
}

impl Default for InteractableSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Position::default(),
            max_interactors: 1,
            character_influences: Vec::new(),
            object_influences: Vec::new(),
            duration: 0.0,
            cooldown: 0.0,
            repeating: false,
            destroy_on_use: false,
        }
    }
}

/// The result of a successful entry: influencers for the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    /// The resource that was entered.
    pub resource: ResourceId,
    /// Character-side influencers, to be offered to the agent's brain.
    pub influencers: Vec<Influencer>,
    /// Configured interaction duration.
    pub duration: f64,
}

/// A shared environmental object agents reserve and interact with.
#[derive(Debug, Clone)]
pub struct Interactable {
    id: ResourceId,
    settings: InteractableSettings,
    reservations: Vec<AgentId>,
    active: Vec<AgentId>,
    last_influence: BTreeMap<AgentId, f64>,
    tracker: StatsTracker,
    pending_removal: bool,
}

impl Interactable {
    /// Create a resource with a fresh id and an empty object-side tracker.
    pub fn new(
        settings: InteractableSettings,
        stats: Arc<StatRegistry>,
        tracker_config: TrackerConfig,
    ) -> Self {
        if settings.max_interactors == 0 {
            warn!(resource = settings.name, "max_interactors is 0; resource can never be used");
        }
        Self {
            id: ResourceId::new(),
            settings,
            reservations: Vec::new(),
            active: Vec::new(),
            last_influence: BTreeMap::new(),
            tracker: StatsTracker::new(stats, tracker_config),
            pending_removal: false,
        }
    }

    /// Resource identity.
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.settings.name
    }

    /// Position agents walk to.
    pub const fn position(&self) -> Position {
        self.settings.position
    }

    /// Static configuration.
    pub const fn settings(&self) -> &InteractableSettings {
        &self.settings
    }

    /// The resource's own stats.
    pub const fn tracker(&self) -> &StatsTracker {
        &self.tracker
    }

    /// Whether the resource will be removed at the end of the tick.
    pub const fn is_pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Agents holding a reservation.
    pub fn reservations(&self) -> &[AgentId] {
        &self.reservations
    }

    /// Agents currently interacting.
    pub fn active(&self) -> &[AgentId] {
        &self.active
    }

    // -----------------------------------------------------------------------
    // Capacity
    // -----------------------------------------------------------------------

    fn occupied(&self) -> usize {
        self.reservations.len().saturating_add(self.active.len())
    }

    fn capacity(&self) -> usize {
        usize::try_from(self.settings.max_interactors).unwrap_or(usize::MAX)
    }

    /// Whether one more agent fits.
    pub fn has_space_for(&self, _agent: AgentId) -> bool {
        self.occupied() < self.capacity()
    }

    /// Whether `agent` holds a reservation.
    pub fn holds_reservation(&self, agent: AgentId) -> bool {
        self.reservations.contains(&agent)
    }

    /// Whether `agent` is interacting right now.
    pub fn is_active(&self, agent: AgentId) -> bool {
        self.active.contains(&agent)
    }

    /// Claim a slot for `agent`.
    ///
    /// # Errors
    ///
    /// - [`WorldError::AlreadyReserved`] if the agent already holds one
    ///   (nothing changes)
    /// - [`WorldError::CapacityExceeded`] if the resource is full
    pub fn reserve_for(&mut self, agent: AgentId) -> Result<(), WorldError> {
        if self.holds_reservation(agent) {
            debug!(resource = self.settings.name, %agent, "Duplicate reservation ignored");
            return Err(WorldError::AlreadyReserved {
                resource: self.id,
                agent,
            });
        }
        if !self.has_space_for(agent) {
            return Err(WorldError::CapacityExceeded {
                resource: self.id,
                capacity: self.settings.max_interactors,
            });
        }
        self.reservations.push(agent);
        debug!(resource = self.settings.name, %agent, "Reserved");
        Ok(())
    }

    /// Drop every reservation `agent` holds. Returns whether one existed.
    pub fn cancel(&mut self, agent: AgentId) -> bool {
        let before = self.reservations.len();
        self.reservations.retain(|a| *a != agent);
        self.reservations.len() != before
    }

    // -----------------------------------------------------------------------
    // Cooldown
    // -----------------------------------------------------------------------

    /// Time at which `agent`'s cooldown ends, if it ever interacted.
    pub fn cooldown_until(&self, agent: AgentId) -> Option<f64> {
        self.last_influence
            .get(&agent)
            .map(|last| last + self.settings.cooldown)
    }

    /// Whether `agent` must still wait before interacting again.
    pub fn is_on_cooldown_for(&self, agent: AgentId, now: f64) -> bool {
        self.cooldown_until(agent).is_some_and(|until| now < until)
    }

    // -----------------------------------------------------------------------
    // Interaction
    // -----------------------------------------------------------------------

    /// Promote `agent` to the active list and build its influencers.
    ///
    /// Entry is allowed when the agent holds a reservation, or when the
    /// resource repeats, the agent is off cooldown, and there is space.
    /// Object-side influencers are added to the resource's own tracker.
    ///
    /// # Errors
    ///
    /// [`WorldError::AlreadyActive`], [`WorldError::NotReserved`],
    /// [`WorldError::OnCooldown`] or [`WorldError::CapacityExceeded`]; the
    /// resource is unchanged in every case.
    pub fn begin_interaction(
        &mut self,
        agent: AgentId,
        now: f64,
    ) -> Result<Interaction, WorldError> {
        if self.is_active(agent) {
            return Err(WorldError::AlreadyActive {
                resource: self.id,
                agent,
            });
        }
        if !self.holds_reservation(agent) {
            if !self.settings.repeating {
                return Err(WorldError::NotReserved {
                    resource: self.id,
                    agent,
                });
            }
            if let Some(until) = self.cooldown_until(agent).filter(|until| now < *until) {
                return Err(WorldError::OnCooldown {
                    resource: self.id,
                    agent,
                    until,
                });
            }
            if !self.has_space_for(agent) {
                return Err(WorldError::CapacityExceeded {
                    resource: self.id,
                    capacity: self.settings.max_interactors,
                });
            }
        }

        self.cancel(agent);
        self.active.push(agent);

        for template in &self.settings.object_influences {
            let influencer = self.influencer_from(template);
            if let Err(err) = self.tracker.add_influencer(influencer) {
                warn!(resource = self.settings.name, error = %err, "Skipping object influence");
            }
        }

        let influencers = self
            .settings
            .character_influences
            .iter()
            .map(|t| self.influencer_from(t))
            .collect();

        info!(resource = self.settings.name, %agent, t = now, "Interaction started");
        Ok(Interaction {
            resource: self.id,
            influencers,
            duration: self.settings.duration,
        })
    }

    fn influencer_from(&self, template: &InfluenceTemplate) -> Influencer {
        Influencer::new(
            template.stat.clone(),
            template.max_change,
            self.settings.duration,
            self.settings.name.clone(),
        )
        .with_source(self.id, self.settings.cooldown)
    }

    /// An influencer from this resource finished applying to `agent`.
    ///
    /// Removes the agent from the active list, starts its cooldown, and marks
    /// the resource for removal when it is destroyed on use.
    pub fn complete_influence(&mut self, agent: AgentId, now: f64) {
        self.active.retain(|a| *a != agent);
        self.last_influence.insert(agent, now);
        if self.settings.destroy_on_use && !self.pending_removal {
            info!(resource = self.settings.name, "Resource used up");
            self.pending_removal = true;
        }
        debug!(resource = self.settings.name, %agent, t = now, "Influence completed");
    }

    /// Remove `agent` from the active list without starting a cooldown.
    ///
    /// Used when the agent's behaviour ends while no influencer from this
    /// resource is still running for it.
    pub fn release_idle(&mut self, agent: AgentId) -> bool {
        let before = self.active.len();
        self.active.retain(|a| *a != agent);
        self.active.len() != before
    }

    /// Whether a character influence moves `stat` in the `goal` direction.
    pub fn moves_stat(&self, stat: &StatId, goal: Goal) -> bool {
        self.settings
            .character_influences
            .iter()
            .filter(|t| &t.stat == stat)
            .any(|t| match goal {
                Goal::Increase => t.max_change > 0.0,
                Goal::Decrease => t.max_change < 0.0,
                Goal::NoAction => false,
            })
    }

    /// Advance the resource's own stats.
    pub fn tick(&mut self, dt: f64) -> Option<TrackerTick> {
        self.tracker.tick(dt)
    }

    /// Copy the resource's state for inspection.
    pub fn snapshot(&self) -> ResourceSnapshot {
        ResourceSnapshot {
            id: self.id,
            name: self.settings.name.clone(),
            max_interactors: self.settings.max_interactors,
            reservations: self.reservations.clone(),
            active: self.active.clone(),
            tracker: self.tracker.snapshot(),
            pending_removal: self.pending_removal,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use motive_types::StatDefinition;

    use super::*;

    fn stats() -> Arc<StatRegistry> {
        let defs = ["hunger", "stock"].into_iter().map(|id| StatDefinition {
            id: StatId::from(id),
            display_name: id.to_owned(),
            min: 0.0,
            max: 1.0,
            baseline: 0.5,
            speed_to_baseline: 10.0,
            decays: false,
        });
        Arc::new(defs.collect())
    }

    fn fridge(capacity: u32) -> Interactable {
        Interactable::new(
            InteractableSettings {
                name: String::from("fridge"),
                max_interactors: capacity,
                character_influences: vec![InfluenceTemplate {
                    stat: StatId::from("hunger"),
                    max_change: -0.2,
                }],
                object_influences: vec![InfluenceTemplate {
                    stat: StatId::from("stock"),
                    max_change: -0.1,
                }],
                duration: 2.0,
                cooldown: 30.0,
                ..InteractableSettings::default()
            },
            stats(),
            TrackerConfig::default(),
        )
    }

    #[test]
    fn first_reserver_wins_the_last_slot() {
        let mut r = fridge(1);
        let (a, b) = (AgentId::new(), AgentId::new());
        assert!(r.reserve_for(a).is_ok());
        assert!(matches!(
            r.reserve_for(b),
            Err(WorldError::CapacityExceeded { capacity: 1, .. })
        ));
        assert!(!r.holds_reservation(b));

        assert!(r.cancel(a));
        assert!(r.reserve_for(b).is_ok());
    }

    #[test]
    fn duplicate_reservation_is_rejected_without_side_effect() {
        let mut r = fridge(3);
        let a = AgentId::new();
        assert!(r.reserve_for(a).is_ok());
        assert!(matches!(
            r.reserve_for(a),
            Err(WorldError::AlreadyReserved { .. })
        ));
        assert_eq!(r.reservations().len(), 1);
    }

    #[test]
    fn entry_promotes_reservation_and_builds_influencers() {
        let mut r = fridge(1);
        let a = AgentId::new();
        r.reserve_for(a).unwrap();

        let interaction = r.begin_interaction(a, 5.0).unwrap();
        assert_eq!(interaction.influencers.len(), 1);
        let inf = interaction.influencers.first().unwrap();
        assert_eq!(inf.source, Some(r.id()));
        assert!((inf.duration - 2.0).abs() < f64::EPSILON);
        assert!((inf.cooldown - 30.0).abs() < f64::EPSILON);

        assert!(r.reservations().is_empty());
        assert_eq!(r.active(), &[a]);
        assert_eq!(r.tracker().influencers().len(), 1);
        assert!(!r.has_space_for(AgentId::new()));
    }

    #[test]
    fn entry_without_reservation_needs_repeating() {
        let mut r = fridge(2);
        let a = AgentId::new();
        assert!(matches!(
            r.begin_interaction(a, 0.0),
            Err(WorldError::NotReserved { .. })
        ));

        r.settings.repeating = true;
        assert!(r.begin_interaction(a, 0.0).is_ok());
        assert!(matches!(
            r.begin_interaction(a, 0.0),
            Err(WorldError::AlreadyActive { .. })
        ));
    }

    #[test]
    fn cooldown_window_after_completion() {
        let mut r = fridge(1);
        r.settings.repeating = true;
        let a = AgentId::new();
        r.reserve_for(a).unwrap();
        r.begin_interaction(a, 8.0).unwrap();
        r.complete_influence(a, 10.0);

        assert!(r.active().is_empty());
        assert!(r.is_on_cooldown_for(a, 20.0));
        assert!(matches!(
            r.begin_interaction(a, 20.0),
            Err(WorldError::OnCooldown { .. })
        ));
        assert!(!r.is_on_cooldown_for(a, 41.0));
        assert!(r.begin_interaction(a, 41.0).is_ok());
    }

    #[test]
    fn destroy_on_use_marks_pending_removal() {
        let mut r = fridge(1);
        r.settings.destroy_on_use = true;
        let a = AgentId::new();
        r.reserve_for(a).unwrap();
        r.begin_interaction(a, 0.0).unwrap();
        assert!(!r.is_pending_removal());
        r.complete_influence(a, 2.0);
        assert!(r.is_pending_removal());
        assert!(r.snapshot().pending_removal);
    }

    #[test]
    fn release_idle_frees_slot_without_cooldown() {
        let mut r = fridge(1);
        let a = AgentId::new();
        r.reserve_for(a).unwrap();
        r.begin_interaction(a, 0.0).unwrap();
        assert!(r.release_idle(a));
        assert!(!r.is_on_cooldown_for(a, 0.5));
        assert!(r.has_space_for(a));
    }

    #[test]
    fn moves_stat_follows_sign() {
        let r = fridge(1);
        let hunger = StatId::from("hunger");
        assert!(r.moves_stat(&hunger, Goal::Decrease));
        assert!(!r.moves_stat(&hunger, Goal::Increase));
        assert!(!r.moves_stat(&StatId::from("stock"), Goal::Decrease));
    }

    #[test]
    fn settings_deserialize_with_defaults() {
        let settings: InteractableSettings =
            serde_json::from_str(r#"{"name":"bed","cooldown":12.5}"#).unwrap();
        assert_eq!(settings.max_interactors, 1);
        assert!(!settings.repeating);
        assert!((settings.cooldown - 12.5).abs() < f64::EPSILON);
    }
}
