//! The per-agent stats tracker.
//!
//! A [`StatsTracker`] owns one agent's stat instances, its active
//! influencers, and its desired states. Each update runs, in order:
//!
//! 1. Decay every instantiated stat toward its baseline.
//! 2. Step every influencer, add its increment to the target stat, and drop
//!    influencers that have applied their whole change.
//! 3. Recompute the cached list of unsatisfied desired states.
//!
//! Updates are gated by [`TrackerConfig::min_update_interval`]: time passed
//! to [`StatsTracker::tick`] accumulates until the interval is reached.
//!
//! Influencers that came from a resource are reported back as
//! [`CompletedInfluence`] values when they finish; the caller owns the
//! resource and releases the agent's slot there.

use std::collections::BTreeMap;
use std::sync::Arc;

use motive_types::{
    DesiredState, InfluencerSnapshot, Influencer, ResourceId, StatId, StatRequirement,
    StatSnapshot, TrackerSnapshot, UnsatisfiedSnapshot,
};
use tracing::{debug, trace, warn};

use crate::config::TrackerConfig;
use crate::desired::{self, StatGoal};
use crate::error::StatError;
use crate::influencer;
use crate::registry::StatRegistry;
use crate::stat::{StatChange, StatInstance};

/// A resource-sourced influencer that finished applying.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedInfluence {
    /// Resource the influencer came from.
    pub source: ResourceId,
    /// Stat it targeted.
    pub stat: StatId,
    /// Cooldown the resource attached to it.
    pub cooldown: f64,
}

/// Outcome of one (non-gated) tracker update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerTick {
    /// Seconds applied in this update (accumulated while gated).
    pub elapsed: f64,
    /// Every stat value change, in application order.
    pub changes: Vec<StatChange>,
    /// Resource-sourced influencers that completed.
    pub completed: Vec<CompletedInfluence>,
}

/// Owns one agent's stats, influencers, and desired states.
#[derive(Debug, Clone)]
pub struct StatsTracker {
    registry: Arc<StatRegistry>,
    config: TrackerConfig,
    stats: BTreeMap<StatId, StatInstance>,
    influencers: Vec<Influencer>,
    desired_states: Vec<DesiredState>,
    /// Indices into `desired_states`.
    unsatisfied: Vec<usize>,
    pending_elapsed: f64,
}

impl StatsTracker {
    /// Create a tracker with no desired states.
    pub const fn new(registry: Arc<StatRegistry>, config: TrackerConfig) -> Self {
        Self {
            registry,
            config,
            stats: BTreeMap::new(),
            influencers: Vec::new(),
            desired_states: Vec::new(),
            unsatisfied: Vec::new(),
            pending_elapsed: 0.0,
        }
    }

    /// Replace the desired states and refresh the unsatisfied cache.
    #[must_use]
    pub fn with_desired_states(mut self, states: Vec<DesiredState>) -> Self {
        self.desired_states = states;
        self.refresh_unsatisfied();
        self
    }

    /// The shared definition registry.
    pub fn registry(&self) -> &Arc<StatRegistry> {
        &self.registry
    }

    /// The tracker's configuration.
    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    /// Get the instance for `stat`, creating it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::UnknownStat`] if the registry has no such stat.
    pub fn stat_mut(&mut self, stat: &StatId) -> Result<&mut StatInstance, StatError> {
        if !self.stats.contains_key(stat) {
            let definition = self
                .registry
                .get(stat)
                .ok_or_else(|| StatError::UnknownStat(stat.clone()))?;
            self.stats
                .insert(stat.clone(), StatInstance::new(Arc::clone(definition)));
        }
        self.stats
            .get_mut(stat)
            .ok_or_else(|| StatError::UnknownStat(stat.clone()))
    }

    /// Normalized value of `stat`.
    ///
    /// A stat that has not been instantiated yet reports its baseline, the
    /// value it would be created with. `None` if the stat is unknown.
    pub fn value_of(&self, stat: &StatId) -> Option<f64> {
        self.stats.get(stat).map_or_else(
            || self.registry.get(stat).map(|d| d.baseline.clamp(0.0, 1.0)),
            |instance| Some(instance.value()),
        )
    }

    /// Set the normalized value of `stat` and refresh the unsatisfied cache.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::UnknownStat`] or [`StatError::NonFiniteValue`].
    pub fn set_value(&mut self, stat: &StatId, value: f64) -> Result<Option<StatChange>, StatError> {
        if !value.is_finite() {
            return Err(StatError::NonFiniteValue {
                stat: stat.clone(),
                value,
            });
        }
        let change = self.stat_mut(stat)?.set_value(value);
        self.refresh_unsatisfied();
        Ok(change)
    }

    // -----------------------------------------------------------------------
    // Influencers
    // -----------------------------------------------------------------------

    /// Append an influencer. There is no cap on simultaneous influencers.
    ///
    /// # Errors
    ///
    /// Returns [`StatError::UnknownStat`] if the target stat is not defined.
    pub fn add_influencer(&mut self, influencer: Influencer) -> Result<(), StatError> {
        if !self.registry.contains(&influencer.stat) {
            return Err(StatError::UnknownStat(influencer.stat));
        }
        debug!(
            stat = %influencer.stat,
            max_change = influencer.max_change,
            duration = influencer.duration,
            origin = influencer.origin,
            "Influencer added"
        );
        self.influencers.push(influencer);
        Ok(())
    }

    /// Active influencers in application order.
    pub fn influencers(&self) -> &[Influencer] {
        &self.influencers
    }

    /// Whether any active influencer came from `resource`.
    pub fn has_influencer_from(&self, resource: ResourceId) -> bool {
        self.influencers.iter().any(|i| i.source == Some(resource))
    }

    // -----------------------------------------------------------------------
    // Desired states
    // -----------------------------------------------------------------------

    /// Every desired state, satisfied or not.
    pub fn desired_states(&self) -> &[DesiredState] {
        &self.desired_states
    }

    /// Add a desired state and refresh the unsatisfied cache.
    pub fn add_desired_state(&mut self, state: DesiredState) {
        self.desired_states.push(state);
        self.refresh_unsatisfied();
    }

    /// Desired states that were unsatisfied at the last refresh.
    pub fn unsatisfied_desired_states(&self) -> impl Iterator<Item = &DesiredState> + '_ {
        self.unsatisfied
            .iter()
            .filter_map(|&idx| self.desired_states.get(idx))
    }

    /// Number of unsatisfied desired states.
    pub fn unsatisfied_count(&self) -> usize {
        self.unsatisfied.len()
    }

    /// Whether `state` currently holds.
    ///
    /// A state about an unknown stat is a configuration error: it is logged
    /// and reported as unsatisfied.
    pub fn is_satisfied(&self, state: &DesiredState) -> bool {
        self.value_of(&state.stat).is_some_and(|value| {
            desired::is_satisfied(state, value, self.config.approximately_tolerance)
        })
    }

    /// Whether a behaviour precondition holds. Unknown stats fail.
    pub fn requirement_met(&self, requirement: &StatRequirement) -> bool {
        let Some(value) = self.value_of(&requirement.stat) else {
            warn!(stat = %requirement.stat, "Precondition references unknown stat");
            return false;
        };
        requirement.objective.test(
            value,
            requirement.threshold,
            self.config.approximately_tolerance,
        )
    }

    /// Resolve the direction `stat` should move in.
    pub fn goal_for(&self, stat: &StatId) -> StatGoal {
        let Some(value) = self.value_of(stat) else {
            return StatGoal::NONE;
        };
        desired::goal_for(
            &self.desired_states,
            stat,
            value,
            self.config.approximately_tolerance,
        )
    }

    /// Recompute which desired states are unsatisfied.
    pub fn refresh_unsatisfied(&mut self) {
        let mut unsatisfied = Vec::new();
        for (idx, state) in self.desired_states.iter().enumerate() {
            if !self.registry.contains(&state.stat) {
                warn!(
                    desired_state = state.name,
                    stat = %state.stat,
                    "Desired state references unknown stat"
                );
                unsatisfied.push(idx);
                continue;
            }
            if !self.is_satisfied(state) {
                unsatisfied.push(idx);
            }
        }
        self.unsatisfied = unsatisfied;
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the tracker by `dt` seconds.
    ///
    /// Returns `None` while the update is gated by the minimum interval.
    pub fn tick(&mut self, dt: f64) -> Option<TrackerTick> {
        if dt.is_finite() && dt > 0.0 {
            self.pending_elapsed += dt;
        }
        if self.pending_elapsed < self.config.min_update_interval || self.pending_elapsed <= 0.0 {
            return None;
        }
        let elapsed = self.pending_elapsed;
        self.pending_elapsed = 0.0;

        let mut changes = Vec::new();

        // 1. Decay
        for instance in self.stats.values_mut() {
            if let Some(change) = instance.update(elapsed) {
                changes.push(change);
            }
        }

        // 2. Influencers
        let completed = self.apply_influencers(elapsed, &mut changes);

        // 3. Desired states
        self.refresh_unsatisfied();

        for change in &changes {
            trace!(stat = %change.stat, previous = change.previous, current = change.current, "Stat changed");
        }

        Some(TrackerTick {
            elapsed,
            changes,
            completed,
        })
    }

    fn apply_influencers(
        &mut self,
        elapsed: f64,
        changes: &mut Vec<StatChange>,
    ) -> Vec<CompletedInfluence> {
        let mut completed = Vec::new();
        let active = std::mem::take(&mut self.influencers);
        let mut remaining = Vec::with_capacity(active.len());

        for mut inf in active {
            let increment = influencer::advance(&mut inf, elapsed);
            match self.stat_mut(&inf.stat) {
                Ok(instance) => {
                    if let Some(change) = instance.apply_delta(increment) {
                        changes.push(change);
                    }
                }
                Err(err) => {
                    warn!(error = %err, origin = inf.origin, "Dropping influencer");
                    continue;
                }
            }

            if influencer::is_fully_applied(&inf) {
                debug!(stat = %inf.stat, origin = inf.origin, "Influencer fully applied");
                if let Some(source) = inf.source {
                    completed.push(CompletedInfluence {
                        source,
                        stat: inf.stat,
                        cooldown: inf.cooldown,
                    });
                }
            } else {
                remaining.push(inf);
            }
        }

        self.influencers = remaining;
        completed
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Copy the tracker's state for inspection.
    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            stats: self
                .stats
                .values()
                .map(|s| StatSnapshot {
                    stat: s.id().clone(),
                    normalized: s.value(),
                    raw: s.raw_value(),
                })
                .collect(),
            influencers: self
                .influencers
                .iter()
                .map(|i| InfluencerSnapshot {
                    stat: i.stat.clone(),
                    origin: i.origin.clone(),
                    max_change: i.max_change,
                    applied_so_far: i.applied_so_far,
                })
                .collect(),
            unsatisfied: self
                .unsatisfied_desired_states()
                .map(|d| UnsatisfiedSnapshot {
                    name: d.name.clone(),
                    stat: d.stat.clone(),
                    objective: d.objective,
                    target: d.target,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use motive_types::{Goal, Objective, StatDefinition};

    use super::*;

    fn registry() -> Arc<StatRegistry> {
        let defs = ["hunger", "energy"].into_iter().map(|id| StatDefinition {
            id: StatId::from(id),
            display_name: id.to_owned(),
            min: 0.0,
            max: 100.0,
            baseline: 0.5,
            speed_to_baseline: 5.0,
            decays: id == "hunger",
        });
        Arc::new(defs.collect())
    }

    fn tracker() -> StatsTracker {
        StatsTracker::new(registry(), TrackerConfig::default())
    }

    fn desire(stat: &str, objective: Objective, target: f64) -> DesiredState {
        DesiredState {
            name: format!("{stat} {objective} {target}"),
            stat: StatId::from(stat),
            objective,
            target,
            sub_states: Vec::new(),
        }
    }

    #[test]
    fn stats_are_created_lazily() {
        let mut t = tracker();
        let energy = StatId::from("energy");
        assert!(t.snapshot().stats.is_empty());
        assert_eq!(t.value_of(&energy), Some(0.5));
        assert!(t.stat_mut(&energy).is_ok());
        assert_eq!(t.snapshot().stats.len(), 1);
        assert!(t.stat_mut(&StatId::from("mana")).is_err());
    }

    #[test]
    fn influencer_fully_applies_and_reports_source() {
        let mut t = tracker();
        let energy = StatId::from("energy");
        let source = ResourceId::new();
        let inf = Influencer::new(energy.clone(), 0.4, 2.0, "bed").with_source(source, 30.0);
        assert!(t.add_influencer(inf).is_ok());

        for tick in 1..=4 {
            let result = t.tick(0.5).unwrap_or_default();
            if tick < 4 {
                assert!(result.completed.is_empty());
                assert_eq!(t.influencers().len(), 1);
            } else {
                assert_eq!(result.completed.len(), 1);
                assert_eq!(result.completed.first().map(|c| c.source), Some(source));
            }
        }
        assert!(t.influencers().is_empty());
        let value = t.value_of(&energy).unwrap_or_default();
        assert!((value - 0.9).abs() < 1e-9);
    }

    #[test]
    fn unknown_stat_influencer_is_rejected() {
        let mut t = tracker();
        let inf = Influencer::new(StatId::from("mana"), 0.1, 0.0, "potion");
        assert_eq!(
            t.add_influencer(inf),
            Err(StatError::UnknownStat(StatId::from("mana")))
        );
    }

    #[test]
    fn min_interval_accumulates_elapsed_time() {
        let config = TrackerConfig {
            min_update_interval: 1.0,
            ..TrackerConfig::default()
        };
        let mut t = StatsTracker::new(registry(), config);
        assert!(t.tick(0.4).is_none());
        assert!(t.tick(0.4).is_none());
        let result = t.tick(0.4);
        let elapsed = result.map(|r| r.elapsed).unwrap_or_default();
        assert!((elapsed - 1.2).abs() < 1e-9);
    }

    #[test]
    fn unsatisfied_states_follow_values() {
        let mut t = tracker().with_desired_states(vec![
            desire("hunger", Objective::LessThan, 0.3),
            desire("energy", Objective::GreaterThan, 0.2),
        ]);
        // hunger starts at 0.5 (unsatisfied), energy at 0.5 (satisfied)
        assert_eq!(t.unsatisfied_count(), 1);

        let hunger = StatId::from("hunger");
        assert!(t.set_value(&hunger, 0.1).is_ok());
        assert_eq!(t.unsatisfied_count(), 0);
        assert_eq!(t.goal_for(&hunger).goal, Goal::NoAction);

        assert!(t.set_value(&hunger, 0.9).is_ok());
        assert_eq!(t.goal_for(&hunger).goal, Goal::Decrease);
    }

    #[test]
    fn desired_state_on_unknown_stat_counts_as_unsatisfied() {
        let t = tracker().with_desired_states(vec![desire("mana", Objective::GreaterThan, 0.1)]);
        assert_eq!(t.unsatisfied_count(), 1);
    }

    #[test]
    fn decay_and_influence_apply_in_the_same_tick() {
        let mut t = tracker();
        let hunger = StatId::from("hunger");
        assert!(t.set_value(&hunger, 1.0).is_ok());
        assert!(
            t.add_influencer(Influencer::new(hunger.clone(), -0.2, 0.0, "snack"))
                .is_ok()
        );
        let _ = t.tick(1.0);
        // decay: 1.0 -> 0.9, then snack: -> 0.7
        let value = t.value_of(&hunger).unwrap_or_default();
        assert!((value - 0.7).abs() < 1e-9);
    }

    #[test]
    fn non_finite_set_is_an_error() {
        let mut t = tracker();
        assert!(matches!(
            t.set_value(&StatId::from("hunger"), f64::INFINITY),
            Err(StatError::NonFiniteValue { .. })
        ));
    }
}
