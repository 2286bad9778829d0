//! Runtime state of a behaviour registered on a brain.
//!
//! The [`BehaviourDefinition`] is shared and immutable; a [`Behaviour`]
//! adds what changes while the simulation runs: the executing flag, the
//! end time (set exactly on the not-executing to executing transition),
//! and the retry timer that rate-limits availability checks.

use std::sync::Arc;

use motive_stats::StatsTracker;
use motive_types::{BehaviourDefinition, BehaviourId, BehaviourSlot};
use tracing::debug;

use crate::weight::{FixedWeight, ImpactWeighting, WeightStrategy};

/// A behaviour as seen by one brain.
#[derive(Debug, Clone)]
pub struct Behaviour {
    definition: Arc<BehaviourDefinition>,
    weighting: Arc<dyn WeightStrategy>,
    executing: bool,
    end_time: Option<f64>,
    next_check: f64,
}

impl Behaviour {
    /// Wrap a definition. A configured `weight_override` selects
    /// [`FixedWeight`]; otherwise [`ImpactWeighting`] with `min_weight`.
    pub fn new(definition: Arc<BehaviourDefinition>, min_weight: f64) -> Self {
        let weighting: Arc<dyn WeightStrategy> = match definition.weight_override {
            Some(weight) => Arc::new(FixedWeight(weight)),
            None => Arc::new(ImpactWeighting::new(min_weight)),
        };
        Self {
            definition,
            weighting,
            executing: false,
            end_time: None,
            next_check: 0.0,
        }
    }

    /// Replace the weighting strategy.
    #[must_use]
    pub fn with_weighting(mut self, weighting: Arc<dyn WeightStrategy>) -> Self {
        self.weighting = weighting;
        self
    }

    /// Behaviour identity.
    pub fn id(&self) -> &BehaviourId {
        &self.definition.id
    }

    /// The shared definition.
    pub fn definition(&self) -> &BehaviourDefinition {
        &self.definition
    }

    /// Which slot the behaviour occupies.
    pub fn slot(&self) -> BehaviourSlot {
        if self.definition.blocking {
            BehaviourSlot::Blocking
        } else {
            BehaviourSlot::NonBlocking
        }
    }

    /// Whether it occupies the blocking slot.
    pub fn is_blocking(&self) -> bool {
        self.definition.blocking
    }

    /// Whether it is carried out at a resource. Only blocking behaviours
    /// target resources; the flag is ignored on non-blocking ones.
    pub fn targets_resource(&self) -> bool {
        self.definition.targets_resource && self.definition.blocking
    }

    /// Whether it is running.
    pub const fn is_executing(&self) -> bool {
        self.executing
    }

    /// When it will end, while running.
    pub const fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Whether the retry timer has elapsed.
    pub fn retry_due(&self, now: f64) -> bool {
        now >= self.next_check
    }

    /// Re-arm the retry timer from `now`.
    pub fn arm_retry(&mut self, now: f64) {
        self.next_check = now + self.definition.retry_frequency.max(0.0);
    }

    /// Whether every precondition holds.
    ///
    /// A definition flagged as misconfigured is never available.
    pub fn requirements_met(&self, tracker: &StatsTracker) -> bool {
        if self.definition.misconfigured.is_some() {
            return false;
        }
        self.definition
            .requirements
            .iter()
            .all(|r| tracker.requirement_met(r))
    }

    /// Score against the agent's stats.
    pub fn weight(&self, tracker: &StatsTracker) -> f64 {
        self.weighting.weight(&self.definition, tracker)
    }

    /// Transition to executing, ending `run_for` seconds after `now`.
    ///
    /// Returns `false` (and changes nothing) if it was already executing.
    pub fn start(&mut self, now: f64, run_for: f64) -> bool {
        if self.executing {
            debug!(behaviour = %self.definition.id, "Start ignored: already executing");
            return false;
        }
        self.executing = true;
        self.end_time = Some(now + run_for.max(0.0));
        true
    }

    /// Transition to not executing.
    ///
    /// Returns `false` if it was not executing.
    pub fn finish(&mut self) -> bool {
        if !self.executing {
            debug!(behaviour = %self.definition.id, "Finish ignored: not executing");
            return false;
        }
        self.executing = false;
        self.end_time = None;
        true
    }

    /// Whether it is running and its end time has passed.
    pub fn has_expired(&self, now: f64) -> bool {
        self.executing && self.end_time.is_some_and(|end| now >= end)
    }
}
