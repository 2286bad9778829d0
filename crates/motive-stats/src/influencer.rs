//! Influencer stepping.
//!
//! An [`Influencer`] spreads `max_change` over `duration` seconds. Each step
//! applies `max_change * dt / duration`, but the increment itself is clamped
//! to what is left, so `|applied_so_far|` can never pass `|max_change|`
//! even when a frame is longer than the remaining duration. A zero duration
//! applies everything on the first step.

use motive_types::Influencer;

use crate::config::INFLUENCE_EPSILON;

/// Advance `influencer` by `dt` seconds and return the increment to add to
/// its target stat.
pub fn advance(influencer: &mut Influencer, dt: f64) -> f64 {
    let remaining = influencer.max_change - influencer.applied_so_far;
    let increment = if influencer.duration <= 0.0 {
        remaining
    } else {
        let step = influencer.max_change * (dt.max(0.0) / influencer.duration);
        if step.abs() > remaining.abs() {
            remaining
        } else {
            step
        }
    };
    influencer.applied_so_far += increment;
    increment
}

/// Whether the influencer has applied its whole change.
pub fn is_fully_applied(influencer: &Influencer) -> bool {
    influencer.applied_so_far.abs() >= influencer.max_change.abs() - INFLUENCE_EPSILON
}
