//! Per-agent stat instances and decay toward baseline.
//!
//! A [`StatInstance`] holds the normalized value of one stat for one agent.
//! The value is clamped to `[0, 1]` on every write, so no sequence of
//! decay steps or influencer increments can leave the unit interval.
//!
//! Decay is an exponential approach: each update moves the value
//! `dt / speed_to_baseline` of the remaining distance toward the baseline,
//! with the fraction capped at 1 so a long frame lands on the baseline
//! instead of overshooting it.

use std::sync::Arc;

use motive_types::{StatDefinition, StatId};
use tracing::warn;

use crate::config::BASELINE_EPSILON;

/// Notification emitted when a stat's clamped value actually changes.
#[derive(Debug, Clone, PartialEq)]
pub struct StatChange {
    /// Stat that changed.
    pub stat: StatId,
    /// Normalized value before the change.
    pub previous: f64,
    /// Normalized value after the change.
    pub current: f64,
}

impl StatChange {
    /// Signed size of the change.
    pub fn delta(&self) -> f64 {
        self.current - self.previous
    }
}

/// One agent's copy of a stat.
#[derive(Debug, Clone)]
pub struct StatInstance {
    definition: Arc<StatDefinition>,
    value: f64,
}

impl StatInstance {
    /// Create an instance starting at the definition's baseline.
    pub fn new(definition: Arc<StatDefinition>) -> Self {
        let value = if definition.baseline.is_finite() {
            definition.baseline.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { definition, value }
    }

    /// The stat's identity.
    pub fn id(&self) -> &StatId {
        &self.definition.id
    }

    /// The shared definition.
    pub fn definition(&self) -> &StatDefinition {
        &self.definition
    }

    /// Normalized value in `[0, 1]`.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Value in the definition's raw range.
    pub fn raw_value(&self) -> f64 {
        self.definition.denormalize(self.value)
    }

    /// Set the normalized value, clamped to `[0, 1]`.
    ///
    /// Returns a change notification only when the clamped value differs
    /// from the previous one. Non-finite input is logged and ignored.
    pub fn set_value(&mut self, value: f64) -> Option<StatChange> {
        if !value.is_finite() {
            warn!(stat = %self.definition.id, value, "Ignoring non-finite stat value");
            return None;
        }
        let clamped = value.clamp(0.0, 1.0);
        let previous = self.value;
        if (clamped - previous).abs() <= f64::EPSILON {
            return None;
        }
        self.value = clamped;
        Some(StatChange {
            stat: self.definition.id.clone(),
            previous,
            current: clamped,
        })
    }

    /// Add a signed delta to the normalized value.
    pub fn apply_delta(&mut self, delta: f64) -> Option<StatChange> {
        self.set_value(self.value + delta)
    }

    /// Advance decay by `dt` seconds.
    pub fn update(&mut self, dt: f64) -> Option<StatChange> {
        if dt <= 0.0 || !self.definition.decays_over_time() {
            return None;
        }
        let baseline = self.definition.baseline.clamp(0.0, 1.0);
        let distance = baseline - self.value;
        if distance.abs() <= BASELINE_EPSILON {
            return None;
        }
        let fraction = (dt / self.definition.speed_to_baseline).clamp(0.0, 1.0);
        self.set_value(distance.mul_add(fraction, self.value))
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn definition(baseline: f64, speed: f64, decays: bool) -> Arc<StatDefinition> {
        Arc::new(StatDefinition {
            id: StatId::from("energy"),
            display_name: String::from("Energy"),
            min: 0.0,
            max: 100.0,
            baseline,
            speed_to_baseline: speed,
            decays,
        })
    }

    #[test]
    fn starts_at_baseline() {
        let stat = StatInstance::new(definition(0.25, 5.0, true));
        assert!((stat.value() - 0.25).abs() < f64::EPSILON);
        assert!((stat.raw_value() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn set_value_clamps_and_notifies() {
        let mut stat = StatInstance::new(definition(0.5, 5.0, true));
        let change = stat.set_value(3.0);
        assert!((stat.value() - 1.0).abs() < f64::EPSILON);
        let change = change.map(|c| c.delta()).unwrap_or_default();
        assert!((change - 0.5).abs() < f64::EPSILON);

        // Already clamped at 1: no notification for a second overshoot.
        assert!(stat.set_value(7.0).is_none());
    }

    #[test]
    fn non_finite_values_are_ignored() {
        let mut stat = StatInstance::new(definition(0.5, 5.0, true));
        assert!(stat.set_value(f64::NAN).is_none());
        assert!((stat.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn decay_strictly_decreases_without_undershooting() {
        let mut stat = StatInstance::new(definition(0.5, 5.0, true));
        let _ = stat.set_value(1.0);
        let mut previous = stat.value();
        let mut steps = 0;
        while stat.update(0.5).is_some() {
            assert!(stat.value() < previous);
            assert!(stat.value() >= 0.5);
            previous = stat.value();
            steps += 1;
            assert!(steps < 10_000, "decay never settled");
        }
        assert!((stat.value() - 0.5).abs() <= BASELINE_EPSILON);
    }

    #[test]
    fn long_frame_lands_on_baseline() {
        let mut stat = StatInstance::new(definition(0.5, 5.0, true));
        let _ = stat.set_value(0.0);
        let _ = stat.update(60.0);
        assert!((stat.value() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn non_decaying_and_zero_speed_stats_stay_put() {
        let mut fixed = StatInstance::new(definition(0.5, 5.0, false));
        let _ = fixed.set_value(0.9);
        assert!(fixed.update(1.0).is_none());

        let mut broken = StatInstance::new(definition(0.5, 0.0, true));
        let _ = broken.set_value(0.9);
        assert!(broken.update(1.0).is_none());
        assert!((broken.value() - 0.9).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn value_stays_in_unit_interval(
            start in -2.0_f64..3.0,
            baseline in 0.0_f64..1.0,
            speed in 0.1_f64..20.0,
            ops in proptest::collection::vec((-1.5_f64..1.5, 0.0_f64..4.0), 1..60),
        ) {
            let mut stat = StatInstance::new(definition(baseline, speed, true));
            let _ = stat.set_value(start);
            for (delta, dt) in ops {
                let _ = stat.apply_delta(delta);
                prop_assert!((0.0..=1.0).contains(&stat.value()));
                let _ = stat.update(dt);
                prop_assert!((0.0..=1.0).contains(&stat.value()));
            }
        }
    }
}
