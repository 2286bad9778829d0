//! The simulation orchestrator.
//!
//! A [`Simulation`] owns the clock, the brains, the stat registry and the
//! one [`ResourceRegistry`]. Each [`Simulation::tick`]:
//!
//! 1. Advances the clock.
//! 2. Ticks every brain in `AgentId` order, lending it the registry. A brain
//!    that fails is logged and skipped; the rest still tick.
//! 3. Ticks the resources' own stats.
//! 4. Removes resources flagged for removal after use.
//!
//! Spatial events and director commands are routed to the addressed brain
//! between ticks.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use motive_agents::{AgentError, Brain, BrainEvent};
use motive_stats::StatRegistry;
use motive_types::{AgentId, BehaviourId, BrainSnapshot, ResourceId, ResourceSnapshot};
use motive_world::{Interactable, ResourceRegistry};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{ClockError, SimulationClock};
use crate::command::{CommandError, DirectorCommand};
use crate::config::ScriptEntry;

/// Errors returned by simulation operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    /// The clock could not advance.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// An agent with this name already exists.
    #[error("agent name already in use: {0}")]
    DuplicateAgent(String),

    /// No agent has this name.
    #[error("no agent named '{0}'")]
    UnknownAgentName(String),

    /// No agent has this id.
    #[error("no agent with id {0}")]
    UnknownAgent(AgentId),

    /// No resource has this name.
    #[error("no resource named '{0}'")]
    UnknownResourceName(String),

    /// A command line did not parse.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// The addressed brain refused the operation.
    #[error(transparent)]
    Agent(#[from] AgentError),
}

/// An event raised by one agent during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentEvent {
    /// The agent that raised it.
    pub agent: AgentId,
    /// What happened.
    pub event: BrainEvent,
}

/// A brain tick that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentFault {
    /// The failing agent.
    pub agent: AgentId,
    /// The error it returned.
    pub error: AgentError,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Tick number that just ran.
    pub tick: u64,
    /// Simulation time after the tick.
    pub time: f64,
    /// Events from every agent, in tick order.
    pub events: Vec<AgentEvent>,
    /// Agents whose tick failed.
    pub faults: Vec<AgentFault>,
    /// Resources removed after use.
    pub removed: Vec<ResourceId>,
}

/// Serialisable state of the whole simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    /// Tick number.
    pub tick: u64,
    /// Simulation time.
    pub time: f64,
    /// Every agent, in id order.
    pub agents: Vec<BrainSnapshot>,
    /// Every resource, in id order.
    pub resources: Vec<ResourceSnapshot>,
}

/// Agents, resources and time.
#[derive(Debug)]
pub struct Simulation {
    clock: SimulationClock,
    stats: Arc<StatRegistry>,
    brains: BTreeMap<AgentId, Brain>,
    names: BTreeMap<String, AgentId>,
    resources: ResourceRegistry,
}

impl Simulation {
    /// Create an empty simulation.
    pub const fn new(clock: SimulationClock, stats: Arc<StatRegistry>) -> Self {
        Self {
            clock,
            stats,
            brains: BTreeMap::new(),
            names: BTreeMap::new(),
            resources: ResourceRegistry::new(),
        }
    }

    /// The clock.
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The stat definitions shared by agents and resources.
    pub const fn stats(&self) -> &Arc<StatRegistry> {
        &self.stats
    }

    // -----------------------------------------------------------------------
    // Agents and resources
    // -----------------------------------------------------------------------

    /// Add an agent.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::DuplicateAgent`] if the name is taken.
    pub fn add_brain(&mut self, brain: Brain) -> Result<AgentId, SimulationError> {
        if self.names.contains_key(brain.name()) {
            return Err(SimulationError::DuplicateAgent(brain.name().to_owned()));
        }
        let id = brain.id();
        self.names.insert(brain.name().to_owned(), id);
        info!(agent = %id, name = brain.name(), "Agent added");
        self.brains.insert(id, brain);
        Ok(id)
    }

    /// Look up an agent by name.
    pub fn find_agent(&self, name: &str) -> Option<AgentId> {
        self.names.get(name).copied()
    }

    /// An agent's brain.
    pub fn brain(&self, id: AgentId) -> Option<&Brain> {
        self.brains.get(&id)
    }

    /// An agent's brain, mutably.
    pub fn brain_mut(&mut self, id: AgentId) -> Option<&mut Brain> {
        self.brains.get_mut(&id)
    }

    /// Every brain in id order.
    pub fn brains(&self) -> impl Iterator<Item = &Brain> {
        self.brains.values()
    }

    /// Place a resource.
    pub fn add_resource(&mut self, resource: Interactable) -> ResourceId {
        self.resources.insert(resource)
    }

    /// The resource registry.
    pub const fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// The resource registry, mutably.
    pub const fn resources_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.resources
    }

    /// Remove a behaviour from an agent, finishing it if it is running.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownAgent`] if the agent is gone.
    pub fn deregister_behaviour(
        &mut self,
        agent: AgentId,
        behaviour: &BehaviourId,
    ) -> Result<bool, SimulationError> {
        let brain = self
            .brains
            .get_mut(&agent)
            .ok_or(SimulationError::UnknownAgent(agent))?;
        Ok(brain.deregister(behaviour, &mut self.resources))
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Clock`] if the tick counter overflows.
    /// Per-agent failures do not fail the tick; they are reported in
    /// [`TickSummary::faults`].
    pub fn tick(&mut self) -> Result<TickSummary, SimulationError> {
        let tick = self.clock.advance()?;
        let now = self.clock.time();
        let dt = self.clock.delta();

        let mut summary = TickSummary {
            tick,
            time: now,
            ..TickSummary::default()
        };

        for (id, brain) in &mut self.brains {
            match brain.tick(now, dt, &mut self.resources) {
                Ok(events) => summary.events.extend(events.into_iter().map(|event| AgentEvent {
                    agent: *id,
                    event,
                })),
                Err(error) => {
                    warn!(agent = %id, tick, error = %error, "Brain tick failed; continuing");
                    summary.faults.push(AgentFault { agent: *id, error });
                }
            }
        }

        self.resources.tick(dt);
        summary.removed = self.resources.remove_spent();

        debug!(
            tick,
            time = now,
            events = summary.events.len(),
            faults = summary.faults.len(),
            "Tick complete"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Spatial events and commands
    // -----------------------------------------------------------------------

    /// `agent` entered `resource`'s volume.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownAgent`] or the brain's refusal.
    pub fn on_enter(
        &mut self,
        agent: AgentId,
        resource: ResourceId,
    ) -> Result<Vec<BrainEvent>, SimulationError> {
        let now = self.clock.time();
        let brain = self
            .brains
            .get_mut(&agent)
            .ok_or(SimulationError::UnknownAgent(agent))?;
        Ok(brain.on_resource_entered(resource, now, &mut self.resources)?)
    }

    /// `agent` is still inside `resource`'s volume.
    ///
    /// # Errors
    ///
    /// As [`Simulation::on_enter`].
    pub fn on_stay(
        &mut self,
        agent: AgentId,
        resource: ResourceId,
    ) -> Result<Vec<BrainEvent>, SimulationError> {
        let now = self.clock.time();
        let brain = self
            .brains
            .get_mut(&agent)
            .ok_or(SimulationError::UnknownAgent(agent))?;
        Ok(brain.on_resource_stay(resource, now, &mut self.resources)?)
    }

    /// Apply a parsed director command.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownAgentName`] if no agent has the
    /// command's agent name, or the brain's refusal.
    pub fn apply_command(
        &mut self,
        command: &DirectorCommand,
    ) -> Result<Vec<BrainEvent>, SimulationError> {
        let now = self.clock.time();
        let id = self
            .find_agent(command.agent())
            .ok_or_else(|| SimulationError::UnknownAgentName(command.agent().to_owned()))?;
        let brain = self
            .brains
            .get_mut(&id)
            .ok_or(SimulationError::UnknownAgent(id))?;

        info!(agent = %id, ?command, "Director command");
        let events = match command {
            DirectorCommand::PrioritizeBehaviour { behaviour, .. } => {
                brain.prioritize(behaviour, now, &mut self.resources)?
            }
            DirectorCommand::StopMoving { .. } => brain.stop_moving(&mut self.resources),
            DirectorCommand::SetStatValue { stat, value, .. } => brain
                .set_stat(stat, *value)?
                .map(BrainEvent::StatChanged)
                .into_iter()
                .collect(),
        };
        Ok(events)
    }

    /// Parse and apply a director command line.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Command`] if the line does not parse,
    /// otherwise as [`Simulation::apply_command`].
    pub fn apply_command_line(&mut self, line: &str) -> Result<Vec<BrainEvent>, SimulationError> {
        let command = DirectorCommand::parse(line)?;
        self.apply_command(&command)
    }

    /// Run one script step, resolving agent and resource names.
    ///
    /// # Errors
    ///
    /// Returns an unknown-name error or whatever the step itself returns.
    pub fn apply_script(&mut self, entry: &ScriptEntry) -> Result<Vec<BrainEvent>, SimulationError> {
        match entry {
            ScriptEntry::Enter {
                agent, resource, ..
            } => {
                let (agent, resource) = self.resolve(agent, resource)?;
                self.on_enter(agent, resource)
            }
            ScriptEntry::Stay {
                agent, resource, ..
            } => {
                let (agent, resource) = self.resolve(agent, resource)?;
                self.on_stay(agent, resource)
            }
            ScriptEntry::Command { line, .. } => self.apply_command_line(line),
        }
    }

    fn resolve(&self, agent: &str, resource: &str) -> Result<(AgentId, ResourceId), SimulationError> {
        let agent_id = self
            .find_agent(agent)
            .ok_or_else(|| SimulationError::UnknownAgentName(agent.to_owned()))?;
        let resource_id = self
            .resources
            .find_by_name(resource)
            .ok_or_else(|| SimulationError::UnknownResourceName(resource.to_owned()))?;
        Ok((agent_id, resource_id))
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    /// Copy the whole state for inspection.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.clock.tick(),
            time: self.clock.time(),
            agents: self.brains.values().map(Brain::snapshot).collect(),
            resources: self.resources.snapshots(),
        }
    }

    /// Every agent's status block, in id order.
    pub fn status(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "tick {} t={:.2}", self.clock.tick(), self.clock.time());
        for brain in self.brains.values() {
            out.push_str(&brain.status());
        }
        out
    }
}
