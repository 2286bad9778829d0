//! Behaviour arbitration for one agent.
//!
//! A [`Brain`] owns the agent's [`StatsTracker`], its registered behaviours
//! (in registration order), and optionally a [`Memory`]. Every tick it:
//!
//! 1. Advances the tracker and hands finished resource influences back to
//!    their resources.
//! 2. Ends behaviours whose end time passed and abandons a pending
//!    behaviour that never reached its resource.
//! 3. Evaluates every idle behaviour whose retry timer elapsed. Available
//!    non-blocking behaviours start at once. The heaviest available
//!    blocking behaviour replaces the current one when it weighs strictly
//!    more, unless the current one is executing and not interruptible.
//!
//! The blocking slot is either empty, **pending** (walking to a reserved
//! resource) or **active**. A pending behaviour starts when the agent
//! enters its resource ([`Brain::on_resource_entered`]). Interrupted
//! behaviours finish within the same tick, before the new one starts.

use std::fmt::Write as _;
use std::sync::Arc;

use motive_stats::{StatChange, StatError, StatsTracker};
use motive_types::{
    AgentId, BehaviourDefinition, BehaviourId, BehaviourSlot, BrainSnapshot, FinishReason,
    Influencer, Objective, Position, ResourceId, StatId,
};
use motive_world::{ResourceRegistry, WorldError};
use tracing::{debug, info, warn};

use crate::behaviour::Behaviour;
use crate::config::BrainConfig;
use crate::error::AgentError;
use crate::memory::{Memory, Observation};

/// Something the movement or animation layer may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum BrainEvent {
    /// A behaviour began executing.
    BehaviourStarted {
        /// The behaviour.
        behaviour: BehaviourId,
        /// Slot it occupies.
        slot: BehaviourSlot,
        /// Resource it runs at, if any.
        resource: Option<ResourceId>,
    },
    /// A blocking behaviour reserved a resource and is waiting to reach it.
    BehaviourPending {
        /// The behaviour.
        behaviour: BehaviourId,
        /// The reserved resource.
        resource: ResourceId,
        /// Where to walk.
        destination: Position,
    },
    /// A behaviour stopped (or a pending one was dropped).
    BehaviourFinished {
        /// The behaviour.
        behaviour: BehaviourId,
        /// Why it stopped.
        reason: FinishReason,
    },
    /// An influencer was refused by memory or because its stat is unknown.
    InfluencerRejected {
        /// Stat it targeted.
        stat: StatId,
        /// Resource it came from.
        source: Option<ResourceId>,
    },
    /// A stat value changed.
    StatChanged(StatChange),
}

#[derive(Debug, Clone, PartialEq)]
enum Blocking {
    Active(BehaviourId),
    Pending {
        behaviour: BehaviourId,
        resource: ResourceId,
        deadline: f64,
    },
}

impl Blocking {
    const fn behaviour(&self) -> &BehaviourId {
        match self {
            Self::Active(behaviour) | Self::Pending { behaviour, .. } => behaviour,
        }
    }
}

/// The decision-maker of one agent.
#[derive(Debug)]
pub struct Brain {
    id: AgentId,
    name: String,
    position: Position,
    config: BrainConfig,
    tracker: StatsTracker,
    behaviours: Vec<Behaviour>,
    blocking: Option<Blocking>,
    non_blocking: Vec<BehaviourId>,
    target_resource: Option<ResourceId>,
    move_target: Option<Position>,
    memory: Option<Box<dyn Memory>>,
    time: f64,
}

impl Brain {
    /// Create a brain around an existing tracker.
    pub fn new(name: impl Into<String>, tracker: StatsTracker, config: BrainConfig) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            position: Position::default(),
            config,
            tracker,
            behaviours: Vec::new(),
            blocking: None,
            non_blocking: Vec::new(),
            target_resource: None,
            move_target: None,
            memory: None,
            time: 0.0,
        }
    }

    /// Attach a memory.
    #[must_use]
    pub fn with_memory(mut self, memory: Box<dyn Memory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Set the starting position.
    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Agent identity.
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Agent name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last known position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Update the position reported by the movement layer.
    pub const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// The agent's stats.
    pub const fn tracker(&self) -> &StatsTracker {
        &self.tracker
    }

    /// The agent's stats, mutably.
    pub const fn tracker_mut(&mut self) -> &mut StatsTracker {
        &mut self.tracker
    }

    /// The attached memory, if any.
    pub fn memory(&self) -> Option<&dyn Memory> {
        self.memory.as_deref()
    }

    /// Registered behaviours in registration order.
    pub fn behaviours(&self) -> &[Behaviour] {
        &self.behaviours
    }

    /// The executing blocking behaviour.
    pub fn active_behaviour(&self) -> Option<&BehaviourId> {
        match &self.blocking {
            Some(Blocking::Active(id)) => Some(id),
            _ => None,
        }
    }

    /// The blocking behaviour waiting to reach its resource.
    pub fn pending_behaviour(&self) -> Option<&BehaviourId> {
        match &self.blocking {
            Some(Blocking::Pending { behaviour, .. }) => Some(behaviour),
            _ => None,
        }
    }

    /// Executing non-blocking behaviours.
    pub fn non_blocking(&self) -> &[BehaviourId] {
        &self.non_blocking
    }

    /// Resource the agent is heading to or using.
    pub const fn target_resource(&self) -> Option<ResourceId> {
        self.target_resource
    }

    /// Where the movement layer should take the agent.
    pub const fn move_target(&self) -> Option<Position> {
        self.move_target
    }

    fn index_of(&self, id: &BehaviourId) -> Option<usize> {
        self.behaviours.iter().position(|b| b.id() == id)
    }

    fn behaviour_mut(&mut self, id: &BehaviourId) -> Option<&mut Behaviour> {
        self.behaviours.iter_mut().find(|b| b.id() == id)
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Add a behaviour.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateBehaviour`] if the id is taken.
    pub fn register(&mut self, definition: Arc<BehaviourDefinition>) -> Result<(), AgentError> {
        if self.index_of(&definition.id).is_some() {
            return Err(AgentError::DuplicateBehaviour(definition.id.clone()));
        }
        if definition.targets_resource && !definition.blocking {
            warn!(
                agent = %self.id,
                behaviour = %definition.id,
                "Non-blocking behaviour cannot target a resource; flag ignored"
            );
        }
        self.behaviours
            .push(Behaviour::new(definition, self.config.min_weight));
        Ok(())
    }

    /// Remove a behaviour, finishing it first if it is running.
    ///
    /// Returns whether it was registered.
    pub fn deregister(&mut self, id: &BehaviourId, resources: &mut ResourceRegistry) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.blocking.as_ref().map(Blocking::behaviour) == Some(id) {
            let _ = self.finish_blocking(FinishReason::Deregistered, resources);
        }
        if self.non_blocking.contains(id) {
            let _ = self.finish_non_blocking(id, FinishReason::Deregistered);
        }
        self.behaviours.remove(idx);
        true
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one decision step at simulation time `now`, `dt` seconds after
    /// the previous one.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidDelta`] for a negative or non-finite `dt`
    /// - [`AgentError::TimeReversed`] if `now` is before the previous tick
    pub fn tick(
        &mut self,
        now: f64,
        dt: f64,
        resources: &mut ResourceRegistry,
    ) -> Result<Vec<BrainEvent>, AgentError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(AgentError::InvalidDelta(dt));
        }
        if now < self.time {
            return Err(AgentError::TimeReversed {
                now,
                last: self.time,
            });
        }
        self.time = now;
        let mut events = Vec::new();
        self.update_stats(dt, resources, &mut events);
        self.expire(now, resources, &mut events);
        self.arbitrate(now, resources, &mut events);
        Ok(events)
    }

    fn update_stats(
        &mut self,
        dt: f64,
        resources: &mut ResourceRegistry,
        events: &mut Vec<BrainEvent>,
    ) {
        let Some(result) = self.tracker.tick(dt) else {
            return;
        };
        events.extend(result.changes.into_iter().map(BrainEvent::StatChanged));
        for done in result.completed {
            // Another influencer from the same resource keeps the slot.
            if self.tracker.has_influencer_from(done.source) {
                continue;
            }
            if let Some(resource) = resources.get_mut(done.source) {
                resource.complete_influence(self.id, self.time);
            }
        }
    }

    fn expire(&mut self, now: f64, resources: &mut ResourceRegistry, events: &mut Vec<BrainEvent>) {
        let blocking_reason = match &self.blocking {
            Some(Blocking::Active(id)) => self
                .behaviours
                .iter()
                .find(|b| b.id() == id)
                .filter(|b| b.has_expired(now))
                .map(|_| FinishReason::Completed),
            Some(Blocking::Pending { deadline, .. }) if now >= *deadline => {
                Some(FinishReason::Abandoned)
            }
            _ => None,
        };
        if let Some(reason) = blocking_reason {
            events.extend(self.finish_blocking(reason, resources));
        }

        let expired: Vec<BehaviourId> = self
            .behaviours
            .iter()
            .filter(|b| self.non_blocking.contains(b.id()) && b.has_expired(now))
            .map(|b| b.id().clone())
            .collect();
        for id in expired {
            events.extend(self.finish_non_blocking(&id, FinishReason::Completed));
        }
    }

    fn arbitrate(&mut self, now: f64, resources: &mut ResourceRegistry, events: &mut Vec<BrainEvent>) {
        let current = self.blocking.as_ref().map(|b| b.behaviour().clone());
        let mut best: Option<(usize, f64, Option<ResourceId>)> = None;
        let mut start_now = Vec::new();

        for (idx, behaviour) in self.behaviours.iter_mut().enumerate() {
            if behaviour.is_executing()
                || current.as_ref() == Some(behaviour.id())
                || !behaviour.retry_due(now)
            {
                continue;
            }
            behaviour.arm_retry(now);
            if !behaviour.requirements_met(&self.tracker) {
                continue;
            }
            if !behaviour.is_blocking() {
                start_now.push(idx);
                continue;
            }
            let resource = if behaviour.targets_resource() {
                let found = find_resource(
                    &self.tracker,
                    resources,
                    self.id,
                    self.position,
                    now,
                    behaviour.definition(),
                );
                if found.is_none() {
                    continue;
                }
                found
            } else {
                None
            };
            let weight = behaviour.weight(&self.tracker);
            if best.as_ref().is_none_or(|(_, w, _)| weight > *w) {
                best = Some((idx, weight, resource));
            }
        }

        for idx in start_now {
            self.start_non_blocking(idx, now, events);
        }

        let Some((idx, _, resource)) = best else {
            return;
        };
        self.switch_to(idx, resource, now, resources, events, false);
    }

    fn switch_to(
        &mut self,
        idx: usize,
        resource: Option<ResourceId>,
        now: f64,
        resources: &mut ResourceRegistry,
        events: &mut Vec<BrainEvent>,
        forced: bool,
    ) {
        if let Some(Blocking::Active(current)) = &self.blocking {
            let locked = self
                .behaviours
                .iter()
                .find(|b| b.id() == current)
                .is_some_and(|b| b.is_executing() && !b.definition().interruptible);
            if locked && !forced {
                debug!(agent = %self.id, behaviour = %current, "Current behaviour is not interruptible");
                return;
            }
        }
        events.extend(self.finish_blocking(FinishReason::Interrupted, resources));
        match resource {
            Some(resource) => self.begin_pending(idx, resource, now, resources, events),
            None => self.start_blocking(idx, now, events),
        }
    }

    fn start_blocking(&mut self, idx: usize, now: f64, events: &mut Vec<BrainEvent>) {
        let Some(behaviour) = self.behaviours.get_mut(idx) else {
            return;
        };
        let abort = behaviour.definition().abort_duration;
        if !behaviour.start(now, abort) {
            return;
        }
        let id = behaviour.id().clone();
        self.apply_direct_influences(idx);
        self.blocking = Some(Blocking::Active(id.clone()));
        info!(agent = %self.id, behaviour = %id, t = now, "Behaviour started");
        events.push(BrainEvent::BehaviourStarted {
            behaviour: id,
            slot: BehaviourSlot::Blocking,
            resource: None,
        });
    }

    fn start_non_blocking(&mut self, idx: usize, now: f64, events: &mut Vec<BrainEvent>) {
        let Some(behaviour) = self.behaviours.get_mut(idx) else {
            return;
        };
        let abort = behaviour.definition().abort_duration;
        if !behaviour.start(now, abort) {
            return;
        }
        let id = behaviour.id().clone();
        self.apply_direct_influences(idx);
        self.non_blocking.push(id.clone());
        debug!(agent = %self.id, behaviour = %id, t = now, "Non-blocking behaviour started");
        events.push(BrainEvent::BehaviourStarted {
            behaviour: id,
            slot: BehaviourSlot::NonBlocking,
            resource: None,
        });
    }

    /// Influences a behaviour applies by itself, in full on the next update.
    fn apply_direct_influences(&mut self, idx: usize) {
        let Some(definition) = self.behaviours.get(idx).map(Behaviour::definition) else {
            return;
        };
        let influencers: Vec<Influencer> = definition
            .character_influences
            .iter()
            .map(|t| {
                Influencer::new(
                    t.stat.clone(),
                    t.max_change,
                    0.0,
                    definition.id.as_str(),
                )
            })
            .collect();
        for influencer in influencers {
            if let Err(err) = self.tracker.add_influencer(influencer) {
                warn!(agent = %self.id, error = %err, "Skipping behaviour influence");
            }
        }
    }

    fn begin_pending(
        &mut self,
        idx: usize,
        resource_id: ResourceId,
        now: f64,
        resources: &mut ResourceRegistry,
        events: &mut Vec<BrainEvent>,
    ) {
        let Some(behaviour) = self.behaviours.get(idx) else {
            return;
        };
        let Some(resource) = resources.get_mut(resource_id) else {
            warn!(agent = %self.id, resource = %resource_id, "Target resource vanished");
            return;
        };
        match resource.reserve_for(self.id) {
            Ok(()) | Err(WorldError::AlreadyReserved { .. }) => {}
            Err(err) => {
                debug!(agent = %self.id, error = %err, "Reservation failed");
                return;
            }
        }
        let id = behaviour.id().clone();
        let destination = resource.position();
        self.blocking = Some(Blocking::Pending {
            behaviour: id.clone(),
            resource: resource_id,
            deadline: now + behaviour.definition().abort_duration,
        });
        self.target_resource = Some(resource_id);
        self.move_target = Some(destination);
        info!(
            agent = %self.id,
            behaviour = %id,
            resource = resource.name(),
            t = now,
            "Heading to resource"
        );
        events.push(BrainEvent::BehaviourPending {
            behaviour: id,
            resource: resource_id,
            destination,
        });
    }

    fn finish_blocking(
        &mut self,
        reason: FinishReason,
        resources: &mut ResourceRegistry,
    ) -> Option<BrainEvent> {
        let blocking = self.blocking.take()?;
        let behaviour = match blocking {
            Blocking::Active(id) => {
                if let Some(b) = self.behaviour_mut(&id) {
                    b.finish();
                }
                id
            }
            Blocking::Pending { behaviour, .. } => {
                debug!(agent = %self.id, behaviour = %behaviour, "Dropping behaviour that never started");
                behaviour
            }
        };
        if let Some(resource_id) = self.target_resource.take() {
            if let Some(resource) = resources.get_mut(resource_id) {
                resource.cancel(self.id);
                if !self.tracker.has_influencer_from(resource_id) {
                    resource.release_idle(self.id);
                }
            }
        }
        self.move_target = None;
        info!(agent = %self.id, behaviour = %behaviour, ?reason, "Behaviour finished");
        Some(BrainEvent::BehaviourFinished { behaviour, reason })
    }

    fn finish_non_blocking(&mut self, id: &BehaviourId, reason: FinishReason) -> Option<BrainEvent> {
        let before = self.non_blocking.len();
        self.non_blocking.retain(|b| b != id);
        if self.non_blocking.len() == before {
            return None;
        }
        if let Some(b) = self.behaviour_mut(id) {
            b.finish();
        }
        debug!(agent = %self.id, behaviour = %id, ?reason, "Non-blocking behaviour finished");
        Some(BrainEvent::BehaviourFinished {
            behaviour: id.clone(),
            reason,
        })
    }

    // -----------------------------------------------------------------------
    // Resources
    // -----------------------------------------------------------------------

    /// The agent entered `resource_id`.
    ///
    /// Starts the interaction, offers each character influencer to
    /// [`Brain::try_add_influencer`], and starts the pending behaviour with
    /// the resource's duration (its abort duration when that is zero).
    ///
    /// # Errors
    ///
    /// - [`AgentError::NotTargeting`] if the brain is not heading to or
    ///   using the resource
    /// - [`AgentError::World`] if the resource refuses the entry
    pub fn on_resource_entered(
        &mut self,
        resource_id: ResourceId,
        now: f64,
        resources: &mut ResourceRegistry,
    ) -> Result<Vec<BrainEvent>, AgentError> {
        if self.target_resource != Some(resource_id) {
            return Err(AgentError::NotTargeting {
                agent: self.id,
                resource: resource_id,
            });
        }
        let interaction = resources
            .require_mut(resource_id)?
            .begin_interaction(self.id, now)?;

        let mut events = Vec::new();
        for influencer in interaction.influencers {
            let stat = influencer.stat.clone();
            if !self.try_add_influencer(influencer, now) {
                events.push(BrainEvent::InfluencerRejected {
                    stat,
                    source: Some(resource_id),
                });
            }
        }

        if let Some(Blocking::Pending { behaviour, .. }) = self.blocking.clone() {
            let Some(b) = self.behaviour_mut(&behaviour) else {
                self.blocking = None;
                return Ok(events);
            };
            let run_for = if interaction.duration > 0.0 {
                interaction.duration
            } else {
                b.definition().abort_duration
            };
            b.start(now, run_for);
            self.blocking = Some(Blocking::Active(behaviour.clone()));
            self.move_target = None;
            info!(agent = %self.id, behaviour = %behaviour, resource = %resource_id, t = now, "Behaviour started at resource");
            events.push(BrainEvent::BehaviourStarted {
                behaviour,
                slot: BehaviourSlot::Blocking,
                resource: Some(resource_id),
            });
        }
        Ok(events)
    }

    /// The agent is still inside `resource_id`. Repeats the entry logic when
    /// the agent is not already interacting there.
    ///
    /// # Errors
    ///
    /// As [`Brain::on_resource_entered`].
    pub fn on_resource_stay(
        &mut self,
        resource_id: ResourceId,
        now: f64,
        resources: &mut ResourceRegistry,
    ) -> Result<Vec<BrainEvent>, AgentError> {
        if resources
            .get(resource_id)
            .is_some_and(|r| r.is_active(self.id))
        {
            return Ok(Vec::new());
        }
        self.on_resource_entered(resource_id, now, resources)
    }

    /// Offer an influencer to the agent.
    ///
    /// With a memory and a source resource, a remembered observation for
    /// the same resource and stat whose cooldown has not elapsed rejects it.
    /// Otherwise the influence is classified against the desired states,
    /// recorded, and appended. Unknown stats are rejected.
    pub fn try_add_influencer(&mut self, influencer: Influencer, now: f64) -> bool {
        if !self.tracker.registry().contains(&influencer.stat) {
            warn!(agent = %self.id, stat = %influencer.stat, "Influencer targets unknown stat");
            return false;
        }

        if let (Some(memory), Some(source)) = (&self.memory, influencer.source) {
            let vetoed = memory
                .most_recent_observation(source, &influencer.stat)
                .is_some_and(|recalled| recalled.blocks_at(now));
            if vetoed {
                debug!(agent = %self.id, stat = %influencer.stat, resource = %source, "Memory vetoed influencer");
                return false;
            }
        }

        let is_good = self.predicts_improvement(&influencer);
        if let (Some(memory), Some(source)) = (&mut self.memory, influencer.source) {
            memory.record_observation(Observation {
                generator: source,
                stat: influencer.stat.clone(),
                is_good,
                timestamp: now,
                cooldown: influencer.cooldown,
            });
        }

        match self.tracker.add_influencer(influencer) {
            Ok(()) => true,
            Err(err) => {
                warn!(agent = %self.id, error = %err, "Influencer rejected");
                false
            }
        }
    }

    /// Whether applying `influencer` would not work against any desired
    /// state on its stat.
    fn predicts_improvement(&self, influencer: &Influencer) -> bool {
        let Some(value) = self.tracker.value_of(&influencer.stat) else {
            return false;
        };
        let remaining = influencer.max_change - influencer.applied_so_far;
        let predicted = (value + remaining).clamp(0.0, 1.0);
        !self
            .tracker
            .desired_states()
            .iter()
            .filter(|d| d.stat == influencer.stat)
            .any(|d| match d.objective {
                Objective::LessThan => influencer.max_change > 0.0,
                Objective::GreaterThan => influencer.max_change < 0.0,
                Objective::Approximately => {
                    (predicted - d.target).abs() >= (value - d.target).abs()
                }
            })
    }

    // -----------------------------------------------------------------------
    // Director
    // -----------------------------------------------------------------------

    /// Force `id` to run now, regardless of weight, preconditions, or the
    /// current behaviour's interruptible flag.
    ///
    /// # Errors
    ///
    /// - [`AgentError::UnknownBehaviour`] if it is not registered
    /// - [`AgentError::NoResourceAvailable`] if it needs a resource and none
    ///   is usable
    pub fn prioritize(
        &mut self,
        id: &BehaviourId,
        now: f64,
        resources: &mut ResourceRegistry,
    ) -> Result<Vec<BrainEvent>, AgentError> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| AgentError::UnknownBehaviour(id.clone()))?;
        let mut events = Vec::new();
        let Some(behaviour) = self.behaviours.get(idx) else {
            return Ok(events);
        };

        if !behaviour.is_blocking() {
            if !behaviour.is_executing() {
                self.start_non_blocking(idx, now, &mut events);
            }
            return Ok(events);
        }
        if self.blocking.as_ref().map(Blocking::behaviour) == Some(id) {
            return Ok(events);
        }

        let resource = if behaviour.targets_resource() {
            let found = find_resource(
                &self.tracker,
                resources,
                self.id,
                self.position,
                now,
                behaviour.definition(),
            );
            Some(found.ok_or_else(|| AgentError::NoResourceAvailable {
                behaviour: id.clone(),
            })?)
        } else {
            None
        };
        info!(agent = %self.id, behaviour = %id, "Behaviour prioritized");
        self.switch_to(idx, resource, now, resources, &mut events, true);
        Ok(events)
    }

    /// Stop walking: drops a pending behaviour and its reservation.
    pub fn stop_moving(&mut self, resources: &mut ResourceRegistry) -> Vec<BrainEvent> {
        let mut events = Vec::new();
        if self.pending_behaviour().is_some() {
            events.extend(self.finish_blocking(FinishReason::Stopped, resources));
        }
        self.move_target = None;
        events
    }

    /// Set `stat` to a value in its raw `[min, max]` range.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Stat`] for an unknown stat or a non-finite value.
    pub fn set_stat(&mut self, stat: &StatId, raw: f64) -> Result<Option<StatChange>, AgentError> {
        let normalized = self
            .tracker
            .registry()
            .get(stat)
            .map(|d| d.normalize(raw))
            .ok_or_else(|| StatError::UnknownStat(stat.clone()))?;
        Ok(self.tracker.set_value(stat, normalized)?)
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Copy the brain's state for inspection.
    pub fn snapshot(&self) -> BrainSnapshot {
        BrainSnapshot {
            agent: self.id,
            name: self.name.clone(),
            time: self.time,
            tracker: self.tracker.snapshot(),
            blocking: self.active_behaviour().cloned(),
            pending: self.pending_behaviour().cloned(),
            non_blocking: self.non_blocking.clone(),
            target_resource: self.target_resource,
            move_target: self.move_target,
        }
    }

    /// Render the snapshot as a human-readable block for HUDs and logs.
    pub fn status(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();
        let _ = writeln!(out, "{} ({}) t={:.2}", snapshot.name, snapshot.agent, snapshot.time);
        let _ = writeln!(out, "  stats:");
        for stat in &snapshot.tracker.stats {
            let _ = writeln!(out, "    {} = {:.3} ({:.2})", stat.stat, stat.normalized, stat.raw);
        }
        let _ = writeln!(out, "  influencers:");
        for inf in &snapshot.tracker.influencers {
            let _ = writeln!(
                out,
                "    {} {:+.3}/{:+.3} from {}",
                inf.stat, inf.applied_so_far, inf.max_change, inf.origin
            );
        }
        let _ = writeln!(out, "  unsatisfied:");
        for d in &snapshot.tracker.unsatisfied {
            let _ = writeln!(out, "    {}: {} {} {:.2}", d.name, d.stat, d.objective, d.target);
        }
        let blocking = snapshot
            .blocking
            .as_ref()
            .map(ToString::to_string)
            .or_else(|| snapshot.pending.as_ref().map(|p| format!("{p} (pending)")))
            .unwrap_or_else(|| String::from("idle"));
        let _ = writeln!(out, "  blocking: {blocking}");
        if !snapshot.non_blocking.is_empty() {
            let names: Vec<&str> = snapshot.non_blocking.iter().map(BehaviourId::as_str).collect();
            let _ = writeln!(out, "  non-blocking: {}", names.join(", "));
        }
        out
    }
}

/// Nearest usable resource whose character influences move one of the
/// behaviour's impacted stats the way the agent's goals ask.
fn find_resource(
    tracker: &StatsTracker,
    resources: &ResourceRegistry,
    agent: AgentId,
    from: Position,
    now: f64,
    definition: &BehaviourDefinition,
) -> Option<ResourceId> {
    resources.nearest_candidate(agent, from, now, |resource| {
        definition
            .impacts
            .iter()
            .any(|impact| resource.moves_stat(&impact.stat, tracker.goal_for(&impact.stat).goal))
    })
}
