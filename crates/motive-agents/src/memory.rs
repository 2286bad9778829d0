//! Interaction memory.
//!
//! A brain may hold a [`Memory`]. Before accepting an influencer from a
//! resource it asks the memory about the last observation for that
//! resource and stat; an observation still inside its cooldown window
//! vetoes the influencer. Accepted influencers are classified as good or
//! bad for the agent's desired states and recorded.
//!
//! [`InteractionLog`] is a bounded in-memory implementation: once full, the
//! oldest observation is evicted.

use std::collections::VecDeque;
use std::fmt::Debug;

use motive_types::{ResourceId, StatId};

/// One recorded interaction outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Resource that generated the influencer.
    pub generator: ResourceId,
    /// Stat the influencer targeted.
    pub stat: StatId,
    /// Whether the influence helped the agent's desired states.
    pub is_good: bool,
    /// Simulation time of the observation.
    pub timestamp: f64,
    /// Seconds during which the observation vetoes repeats.
    pub cooldown: f64,
}

/// What a memory recalls about a (resource, stat) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecalledObservation {
    /// When it was recorded.
    pub timestamp: f64,
    /// Its veto window.
    pub cooldown: f64,
    /// Whether it was good.
    pub is_good: bool,
}

impl RecalledObservation {
    /// Whether the veto window is still open at `now`.
    pub fn blocks_at(&self, now: f64) -> bool {
        now < self.timestamp + self.cooldown
    }
}

/// Record of past interaction outcomes consulted by a brain.
pub trait Memory: Debug + Send {
    /// Store an observation.
    fn record_observation(&mut self, observation: Observation);

    /// The newest observation about `generator` and `stat`, if any.
    fn most_recent_observation(
        &self,
        generator: ResourceId,
        stat: &StatId,
    ) -> Option<RecalledObservation>;
}

/// Bounded FIFO of observations.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    capacity: usize,
    entries: VecDeque<Observation>,
}

impl InteractionLog {
    /// Create a log holding at most `capacity` observations.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Number of stored observations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored observations, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.entries.iter()
    }
}

impl Memory for InteractionLog {
    fn record_observation(&mut self, observation: Observation) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    fn most_recent_observation(
        &self,
        generator: ResourceId,
        stat: &StatId,
    ) -> Option<RecalledObservation> {
        self.entries
            .iter()
            .rev()
            .find(|o| o.generator == generator && &o.stat == stat)
            .map(|o| RecalledObservation {
                timestamp: o.timestamp,
                cooldown: o.cooldown,
                is_good: o.is_good,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(generator: ResourceId, stat: &str, timestamp: f64) -> Observation {
        Observation {
            generator,
            stat: StatId::from(stat),
            is_good: true,
            timestamp,
            cooldown: 10.0,
        }
    }

    #[test]
    fn recalls_newest_matching_observation() {
        let fridge = ResourceId::new();
        let mut log = InteractionLog::new(8);
        log.record_observation(observation(fridge, "hunger", 1.0));
        log.record_observation(observation(fridge, "hunger", 4.0));
        log.record_observation(observation(fridge, "energy", 6.0));

        let recalled = log.most_recent_observation(fridge, &StatId::from("hunger"));
        assert!(recalled.is_some_and(|r| (r.timestamp - 4.0).abs() < f64::EPSILON));
        assert!(log
            .most_recent_observation(ResourceId::new(), &StatId::from("hunger"))
            .is_none());
    }

    #[test]
    fn evicts_oldest_at_capacity() {
        let fridge = ResourceId::new();
        let mut log = InteractionLog::new(2);
        log.record_observation(observation(fridge, "hunger", 1.0));
        log.record_observation(observation(fridge, "energy", 2.0));
        log.record_observation(observation(fridge, "fun", 3.0));

        assert_eq!(log.len(), 2);
        assert!(log
            .most_recent_observation(fridge, &StatId::from("hunger"))
            .is_none());
    }

    #[test]
    fn veto_window() {
        let recalled = RecalledObservation {
            timestamp: 10.0,
            cooldown: 30.0,
            is_good: false,
        };
        assert!(recalled.blocks_at(20.0));
        assert!(!recalled.blocks_at(40.0));
    }
}
