//! End-to-end tests of a configured simulation: agents competing for one
//! resource, director commands and fault isolation. A property test keeps
//! stats in bounds under arbitrary command sequences.

#![allow(clippy::unwrap_used)]

use motive_agents::{AgentError, BrainEvent};
use motive_core::{Simulation, SimulationConfig, SimulationError};
use motive_stats::StatRegistry;
use motive_types::{AgentId, BehaviourId, FinishReason, StatId};
use motive_world::ResourceRegistry;
use proptest::prelude::*;

const KITCHEN: &str = r#"
simulation:
  tick_seconds: 0.5
stats:
  - id: hunger
    min: 0
    max: 100
    baseline: 0.8
  - id: energy
    baseline: 0.5
    speed_to_baseline: 20
behaviours:
  - id: eat
    targets_resource: true
    abort_duration: 10
    impacts:
      - { stat: hunger, objective: less_than }
  - id: nap
    abort_duration: 4
    character_influences:
      - { stat: energy, max_change: 0.3 }
resources:
  - name: fridge
    position: { x: 3.0, y: 0.0, z: 4.0 }
    duration: 2
    cooldown: 30
    character_influences:
      - { stat: hunger, max_change: -0.5 }
agents:
  - name: ada
    behaviours: [eat]
    desired_states:
      - { name: fed, stat: hunger, objective: less_than, target: 0.3 }
  - name: bo
    behaviours: [eat]
    desired_states:
      - { name: fed, stat: hunger, objective: less_than, target: 0.3 }
"#;

fn kitchen() -> Simulation {
    SimulationConfig::parse(KITCHEN).unwrap().build().unwrap()
}

fn agents(sim: &Simulation) -> (AgentId, AgentId) {
    (sim.find_agent("ada").unwrap(), sim.find_agent("bo").unwrap())
}

fn hunger(sim: &Simulation, agent: AgentId) -> f64 {
    sim.brain(agent)
        .unwrap()
        .tracker()
        .value_of(&StatId::from("hunger"))
        .unwrap()
}

#[test]
fn two_agents_share_one_fridge() {
    let mut sim = kitchen();
    let (ada, bo) = agents(&sim);
    let fridge = sim.resources().find_by_name("fridge").unwrap();

    sim.tick().unwrap();
    let reservations = sim.resources().get(fridge).unwrap().reservations().to_vec();
    assert_eq!(reservations.len(), 1);
    let winner = *reservations.first().unwrap();
    let loser = if winner == ada { bo } else { ada };
    let eat = BehaviourId::from("eat");
    assert_eq!(sim.brain(winner).unwrap().pending_behaviour(), Some(&eat));
    assert!(sim.brain(loser).unwrap().pending_behaviour().is_none());

    // The loser cannot walk in without a reservation.
    assert!(matches!(
        sim.on_enter(loser, fridge),
        Err(SimulationError::Agent(_))
    ));

    let events = sim.on_enter(winner, fridge).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        BrainEvent::BehaviourStarted { behaviour, resource: Some(r), .. }
            if *behaviour == eat && *r == fridge
    )));

    // Entry at t=0.5, two seconds of influence: done by t=2.5.
    let mut finished = false;
    for _ in 0..4 {
        let summary = sim.tick().unwrap();
        finished |= summary.events.iter().any(|e| {
            e.agent == winner
                && e.event
                    == BrainEvent::BehaviourFinished {
                        behaviour: eat.clone(),
                        reason: FinishReason::Completed,
                    }
        });
    }
    assert!(finished);
    assert!((hunger(&sim, winner) - 0.3).abs() < 1e-9);
    assert!((hunger(&sim, loser) - 0.8).abs() < 1e-9);

    // One more tick and the loser holds the freed fridge; the winner is on
    // cooldown and stays put.
    sim.tick().unwrap();
    let resource = sim.resources().get(fridge).unwrap();
    assert_eq!(resource.reservations(), &[loser]);
    assert!(resource.is_on_cooldown_for(winner, sim.clock().time()));
    assert_eq!(sim.brain(loser).unwrap().pending_behaviour(), Some(&eat));
    assert!(sim.brain(winner).unwrap().pending_behaviour().is_none());
}

#[test]
fn staying_inside_the_fridge_does_not_restart_the_interaction() {
    let mut sim = kitchen();
    let (ada, bo) = agents(&sim);
    let fridge = sim.resources().find_by_name("fridge").unwrap();
    sim.tick().unwrap();
    let winner = *sim.resources().get(fridge).unwrap().reservations().first().unwrap();
    let loser = if winner == ada { bo } else { ada };

    sim.on_enter(winner, fridge).unwrap();
    sim.tick().unwrap();
    assert!(sim.on_stay(winner, fridge).unwrap().is_empty());
    assert!(sim.resources().get(fridge).unwrap().is_active(winner));
    assert_eq!(sim.brain(winner).unwrap().tracker().influencers().len(), 1);

    assert!(matches!(
        sim.on_stay(loser, fridge),
        Err(SimulationError::Agent(AgentError::NotTargeting { .. }))
    ));
}

#[test]
fn stop_command_releases_the_reservation() {
    let mut sim = kitchen();
    sim.tick().unwrap();
    let fridge = sim.resources().find_by_name("fridge").unwrap();
    let holder = *sim
        .resources()
        .get(fridge)
        .unwrap()
        .reservations()
        .first()
        .unwrap();
    let name = sim.brain(holder).unwrap().name().to_owned();

    let events = sim.apply_command_line(&format!("STOP {name}")).unwrap();
    assert!(events.contains(&BrainEvent::BehaviourFinished {
        behaviour: BehaviourId::from("eat"),
        reason: FinishReason::Stopped,
    }));
    assert!(sim.resources().get(fridge).unwrap().reservations().is_empty());
    assert!(sim.brain(holder).unwrap().move_target().is_none());
}

#[test]
fn set_command_can_satisfy_the_need() {
    let mut sim = kitchen();
    let (ada, _) = agents(&sim);
    sim.apply_command_line("set ada hunger 10").unwrap();
    assert!((hunger(&sim, ada) - 0.1).abs() < 1e-9);
    assert_eq!(sim.brain(ada).unwrap().tracker().unsatisfied_count(), 0);
}

#[test]
fn a_failing_brain_does_not_stop_the_others() {
    let mut sim = kitchen();
    let (ada, bo) = agents(&sim);

    // Push bo's clock far ahead so the next simulation tick looks like
    // time running backwards to it.
    let mut scratch = ResourceRegistry::new();
    sim.brain_mut(bo)
        .unwrap()
        .tick(100.0, 0.0, &mut scratch)
        .unwrap();

    let summary = sim.tick().unwrap();
    assert_eq!(summary.faults.len(), 1);
    assert!(summary.faults.iter().all(|f| f.agent == bo));
    assert!(summary.events.iter().any(|e| e.agent == ada));
    assert!(sim.brain(ada).unwrap().pending_behaviour().is_some());
}

#[test]
fn script_entries_resolve_names() {
    let yaml = format!(
        "{KITCHEN}\nscript:\n  - {{ kind: command, at: 0, line: \"prioritize ada eat\" }}\n"
    );
    let config = SimulationConfig::parse(&yaml).unwrap();
    let mut sim = config.build().unwrap();
    let (ada, _) = agents(&sim);
    for entry in &config.script {
        sim.apply_script(entry).unwrap();
    }
    assert_eq!(
        sim.brain(ada).unwrap().pending_behaviour(),
        Some(&BehaviourId::from("eat"))
    );
}

#[test]
fn empty_registry_simulation_ticks() {
    let clock = motive_core::SimulationClock::new(1.0).unwrap();
    let mut sim = Simulation::new(clock, std::sync::Arc::new(StatRegistry::new()));
    let summary = sim.tick().unwrap();
    assert!(summary.events.is_empty());
    assert!(summary.removed.is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stats_stay_normalized_under_commands_and_ticks(
        steps in prop::collection::vec((any::<bool>(), -50.0f64..150.0), 1..40)
    ) {
        let mut sim = kitchen();
        for (tick, raw) in steps {
            if tick {
                sim.tick().unwrap();
            } else {
                sim.apply_command_line(&format!("set bo energy {raw}")).unwrap();
                sim.apply_command_line(&format!("set ada hunger {raw}")).unwrap();
            }
            for snapshot in sim.snapshot().agents {
                for stat in snapshot.tracker.stats {
                    prop_assert!((0.0..=1.0).contains(&stat.normalized));
                }
            }
        }
    }
}
