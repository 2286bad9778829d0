//! Desired-state evaluation and goal resolution.
//!
//! A desired state is satisfied when its objective holds against the
//! current value of its stat. [`goal_for`] folds every desired state that
//! mentions one stat into a single direction:
//!
//! 1. An `Approximately` state whose target is within tolerance of the
//!    current value decides immediately: `Decrease` when the value sits above
//!    the target, `Increase` otherwise.
//! 2. A `LessThan` state qualifies while `value >= target` (the lowest
//!    qualifying target is kept). A `GreaterThan` state qualifies while
//!    `value <= target` (the highest qualifying target is kept).
//! 3. Any qualifying `LessThan` wins and yields `Decrease`; otherwise any
//!    qualifying `GreaterThan` yields `Increase`; otherwise `NoAction`.

use motive_types::{DesiredState, Goal, Objective, StatId};

/// Direction a stat should move, and the target that decided it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatGoal {
    /// Direction.
    pub goal: Goal,
    /// Target of the desired state that decided the direction.
    pub target: Option<f64>,
}

impl StatGoal {
    /// No movement required.
    pub const NONE: Self = Self {
        goal: Goal::NoAction,
        target: None,
    };
}

/// Whether `state` holds for the given stat value.
pub fn is_satisfied(state: &DesiredState, value: f64, tolerance: f64) -> bool {
    state.objective.test(value, state.target, tolerance)
}

/// Resolve the goal for `stat` given every desired state the agent holds.
///
/// States about other stats are ignored.
pub fn goal_for<'a, I>(states: I, stat: &StatId, value: f64, tolerance: f64) -> StatGoal
where
    I: IntoIterator<Item = &'a DesiredState>,
{
    let relevant: Vec<&DesiredState> = states.into_iter().filter(|s| &s.stat == stat).collect();

    for state in &relevant {
        if state.objective == Objective::Approximately
            && (value - state.target).abs() <= tolerance
        {
            let goal = if value > state.target {
                Goal::Decrease
            } else {
                Goal::Increase
            };
            return StatGoal {
                goal,
                target: Some(state.target),
            };
        }
    }

    let mut lowest_less_than: Option<f64> = None;
    let mut highest_greater_than: Option<f64> = None;

    for state in &relevant {
        match state.objective {
            Objective::LessThan if value >= state.target => {
                lowest_less_than = Some(lowest_less_than.map_or(state.target, |t| t.min(state.target)));
            }
            Objective::GreaterThan if value <= state.target => {
                highest_greater_than =
                    Some(highest_greater_than.map_or(state.target, |t| t.max(state.target)));
            }
            _ => {}
        }
    }

    if let Some(target) = lowest_less_than {
        return StatGoal {
            goal: Goal::Decrease,
            target: Some(target),
        };
    }
    if let Some(target) = highest_greater_than {
        return StatGoal {
            goal: Goal::Increase,
            target: Some(target),
        };
    }
    StatGoal::NONE
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const TOLERANCE: f64 = 0.05;

    fn desire(stat: &str, objective: Objective, target: f64) -> DesiredState {
        DesiredState {
            name: format!("{stat} {objective} {target}"),
            stat: StatId::from(stat),
            objective,
            target,
            sub_states: Vec::new(),
        }
    }

    fn goal(states: &[DesiredState], value: f64) -> Goal {
        goal_for(states, &StatId::from("hunger"), value, TOLERANCE).goal
    }

    #[test]
    fn greater_than_below_target_increases() {
        let states = [desire("hunger", Objective::GreaterThan, 0.7)];
        assert_eq!(goal(&states, 0.2), Goal::Increase);
    }

    #[test]
    fn non_qualifying_less_than_leaves_greater_than_in_charge() {
        let states = [
            desire("hunger", Objective::GreaterThan, 0.7),
            desire("hunger", Objective::LessThan, 0.1),
        ];
        // 0.2 >= 0.1 so the LessThan does qualify here.
        assert_eq!(goal(&states, 0.2), Goal::Decrease);
        // Below the LessThan target only the GreaterThan qualifies.
        assert_eq!(goal(&states, 0.05), Goal::Increase);
    }

    #[test]
    fn qualifying_less_than_takes_precedence() {
        let states = [
            desire("hunger", Objective::GreaterThan, 0.9),
            desire("hunger", Objective::LessThan, 0.3),
        ];
        let resolved = goal_for(&states, &StatId::from("hunger"), 0.5, TOLERANCE);
        assert_eq!(resolved.goal, Goal::Decrease);
        assert_eq!(resolved.target, Some(0.3));
    }

    #[test]
    fn picks_extreme_qualifying_targets() {
        let less = [
            desire("hunger", Objective::LessThan, 0.6),
            desire("hunger", Objective::LessThan, 0.2),
        ];
        let resolved = goal_for(&less, &StatId::from("hunger"), 0.8, TOLERANCE);
        assert_eq!(resolved.target, Some(0.2));

        let greater = [
            desire("hunger", Objective::GreaterThan, 0.4),
            desire("hunger", Objective::GreaterThan, 0.6),
        ];
        let resolved = goal_for(&greater, &StatId::from("hunger"), 0.1, TOLERANCE);
        assert_eq!(resolved.target, Some(0.6));
    }

    #[test]
    fn approximately_within_tolerance_short_circuits() {
        let states = [
            desire("hunger", Objective::LessThan, 0.1),
            desire("hunger", Objective::Approximately, 0.5),
        ];
        assert_eq!(goal(&states, 0.52), Goal::Decrease);
        assert_eq!(goal(&states, 0.48), Goal::Increase);
    }

    #[test]
    fn other_stats_and_satisfied_states_give_no_action() {
        let states = [
            desire("energy", Objective::GreaterThan, 0.9),
            desire("hunger", Objective::LessThan, 0.8),
        ];
        assert_eq!(goal(&states, 0.3), Goal::NoAction);
        assert_eq!(goal(&[], 0.3), Goal::NoAction);
    }

    proptest! {
        #[test]
        fn less_than_precedence_holds_for_any_mix(
            value in 0.0_f64..1.0,
            less in proptest::collection::vec(0.0_f64..1.0, 0..4),
            greater in proptest::collection::vec(0.0_f64..1.0, 0..4),
        ) {
            let mut states: Vec<DesiredState> = Vec::new();
            states.extend(less.iter().map(|t| desire("hunger", Objective::LessThan, *t)));
            states.extend(greater.iter().map(|t| desire("hunger", Objective::GreaterThan, *t)));

            let resolved = goal_for(&states, &StatId::from("hunger"), value, TOLERANCE);
            let less_qualifies = less.iter().any(|t| value >= *t);
            let greater_qualifies = greater.iter().any(|t| value <= *t);

            let expected = if less_qualifies {
                Goal::Decrease
            } else if greater_qualifies {
                Goal::Increase
            } else {
                Goal::NoAction
            };
            prop_assert_eq!(resolved.goal, expected);
        }
    }
}
