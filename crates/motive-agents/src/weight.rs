//! Behaviour weighting strategies.
//!
//! Arbitration asks each available behaviour for a weight and picks the
//! highest. The [`WeightStrategy`] trait is the seam for custom scoring;
//! two implementations ship here:
//!
//! - [`ImpactWeighting`] -- the share of unsatisfied desired states whose
//!   stat the behaviour impacts, floored so it never reaches zero
//! - [`FixedWeight`] -- a configured constant

use std::fmt::Debug;

use motive_stats::StatsTracker;
use motive_types::BehaviourDefinition;

/// Smallest weight the default weighting returns.
pub const MIN_WEIGHT: f64 = 0.01;

/// Scores a behaviour against an agent's current stats.
pub trait WeightStrategy: Debug + Send + Sync {
    /// Weight of `definition` given `tracker`. Higher wins.
    fn weight(&self, definition: &BehaviourDefinition, tracker: &StatsTracker) -> f64;
}

/// Default weighting: fraction of unsatisfied desired states the behaviour
/// addresses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactWeighting {
    floor: f64,
}

impl ImpactWeighting {
    /// Create the weighting with a custom floor.
    pub const fn new(floor: f64) -> Self {
        Self { floor }
    }
}

impl Default for ImpactWeighting {
    fn default() -> Self {
        Self::new(MIN_WEIGHT)
    }
}

fn as_f64(count: usize) -> f64 {
    f64::from(u32::try_from(count).unwrap_or(u32::MAX))
}

impl WeightStrategy for ImpactWeighting {
    fn weight(&self, definition: &BehaviourDefinition, tracker: &StatsTracker) -> f64 {
        let total = tracker.unsatisfied_count();
        if total == 0 {
            return self.floor;
        }
        let matching = tracker
            .unsatisfied_desired_states()
            .filter(|state| definition.impacts.iter().any(|i| i.stat == state.stat))
            .count();
        (as_f64(matching) / as_f64(total)).max(self.floor)
    }
}

/// A constant weight, for behaviours configured with an override.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWeight(pub f64);

impl WeightStrategy for FixedWeight {
    fn weight(&self, _definition: &BehaviourDefinition, _tracker: &StatsTracker) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use motive_stats::{StatRegistry, TrackerConfig};
    use motive_types::{DesiredState, Objective, StatDefinition, StatId, StatImpact};

    use super::*;

    fn tracker(desires: Vec<DesiredState>) -> StatsTracker {
        let defs = ["hunger", "energy", "fun", "hygiene"]
            .into_iter()
            .map(|id| StatDefinition {
                id: StatId::from(id),
                display_name: id.to_owned(),
                min: 0.0,
                max: 1.0,
                baseline: 0.5,
                speed_to_baseline: 10.0,
                decays: false,
            });
        StatsTracker::new(Arc::new(defs.collect()), TrackerConfig::default())
            .with_desired_states(desires)
    }

    fn wants_low(stat: &str) -> DesiredState {
        DesiredState {
            name: format!("low {stat}"),
            stat: StatId::from(stat),
            objective: Objective::LessThan,
            target: 0.2,
            sub_states: Vec::new(),
        }
    }

    fn eat() -> BehaviourDefinition {
        let mut def = BehaviourDefinition::new("eat");
        def.impacts.push(StatImpact {
            stat: StatId::from("hunger"),
            objective: Objective::LessThan,
        });
        def
    }

    #[test]
    fn weight_is_share_of_unsatisfied_states() {
        let t = tracker(vec![
            wants_low("hunger"),
            wants_low("energy"),
            wants_low("fun"),
            wants_low("hygiene"),
        ]);
        let w = ImpactWeighting::default().weight(&eat(), &t);
        assert!((w - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn weight_is_floored() {
        let none_unsatisfied = tracker(Vec::new());
        let w = ImpactWeighting::default().weight(&eat(), &none_unsatisfied);
        assert!((w - MIN_WEIGHT).abs() < f64::EPSILON);

        let unrelated = tracker(vec![wants_low("fun")]);
        let w = ImpactWeighting::default().weight(&eat(), &unrelated);
        assert!((w - MIN_WEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn fixed_weight_ignores_stats() {
        let t = tracker(vec![wants_low("hunger")]);
        assert!((FixedWeight(0.3).weight(&eat(), &t) - 0.3).abs() < f64::EPSILON);
    }
}
