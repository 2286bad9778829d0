//! Configuration loading and typed config structures for the Motive engine.
//!
//! The canonical configuration lives in `motive-config.yaml` at the project
//! root. The structs here mirror the YAML; every section is optional and
//! falls back to the defaults documented on each field.
//!
//! Objectives are written as strings (`less_than`, `>`, `approximately`, ...)
//! so a typo does not reject the whole file. [`SimulationConfig::build`]
//! resolves them: an unrecognised objective in a precondition makes that
//! behaviour permanently unavailable, one in a desired state or impact drops
//! that entry. Each such issue is logged with `tracing::warn!`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use motive_agents::{Brain, BrainConfig, InteractionLog};
use motive_stats::{StatRegistry, StatsTracker, TrackerConfig};
use motive_types::{
    BehaviourDefinition, BehaviourId, DesiredState, InfluenceTemplate, Objective, Position,
    StatDefinition, StatId, StatImpact, StatRequirement,
};
use motive_world::{Interactable, InteractableSettings};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::clock::SimulationClock;
use crate::simulation::Simulation;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but cannot produce a simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Clock and run bounds.
    #[serde(default)]
    pub simulation: ClockConfig,

    /// Stats tracker tunables shared by agents and resources.
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Brain tunables.
    #[serde(default)]
    pub brain: BrainConfig,

    /// Log level and output format.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Stat definitions.
    #[serde(default)]
    pub stats: Vec<StatSpec>,

    /// Behaviour definitions.
    #[serde(default)]
    pub behaviours: Vec<BehaviourSpec>,

    /// Interactable resources placed in the world.
    #[serde(default)]
    pub resources: Vec<InteractableSettings>,

    /// Agents to spawn.
    #[serde(default)]
    pub agents: Vec<AgentSpec>,

    /// Timed spatial events and director commands.
    #[serde(default)]
    pub script: Vec<ScriptEntry>,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the simulation this configuration describes.
    ///
    /// Configuration issues that only affect one entry (duplicate stat,
    /// unknown objective, unknown behaviour on an agent, bad initial value)
    /// are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the tick length is not a positive
    /// number of seconds or two agents share a name.
    pub fn build(&self) -> Result<Simulation, ConfigError> {
        let clock = SimulationClock::new(self.simulation.tick_seconds).map_err(|e| {
            ConfigError::Invalid {
                reason: e.to_string(),
            }
        })?;

        let mut registry = StatRegistry::new();
        for spec in &self.stats {
            if spec.decays == Some(true) && spec.speed_to_baseline <= 0.0 {
                warn!(stat = %spec.id, speed = spec.speed_to_baseline, "Decaying stat needs a positive speed_to_baseline; it will not decay");
            }
            if let Err(e) = registry.insert(spec.to_definition()) {
                warn!(stat = %spec.id, error = %e, "Skipping stat definition");
            }
        }
        let registry = Arc::new(registry);

        let mut behaviours: BTreeMap<BehaviourId, Arc<BehaviourDefinition>> = BTreeMap::new();
        for spec in &self.behaviours {
            if behaviours.contains_key(&spec.id) {
                warn!(behaviour = %spec.id, "Duplicate behaviour definition ignored");
                continue;
            }
            behaviours.insert(spec.id.clone(), Arc::new(spec.to_definition(&registry)));
        }

        let mut sim = Simulation::new(clock, Arc::clone(&registry));

        for settings in &self.resources {
            for template in settings
                .character_influences
                .iter()
                .chain(&settings.object_influences)
            {
                if !registry.contains(&template.stat) {
                    warn!(resource = %settings.name, stat = %template.stat, "Resource influences unknown stat");
                }
            }
            let resource = Interactable::new(settings.clone(), Arc::clone(&registry), self.tracker);
            let id = sim.add_resource(resource);
            debug!(resource = %id, name = %settings.name, "Resource placed");
        }

        for spec in &self.agents {
            let brain = spec.to_brain(&registry, &behaviours, self.tracker, self.brain);
            sim.add_brain(brain).map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })?;
        }

        info!(
            stats = registry.len(),
            behaviours = behaviours.len(),
            resources = sim.resources().len(),
            agents = self.agents.len(),
            "Simulation built"
        );
        Ok(sim)
    }
}

/// Clock and run-bounds settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClockConfig {
    /// Simulated seconds per tick (default: 0.1).
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: f64,

    /// Stop after this many ticks (default: 600). `0` means unbounded.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Real-time pause between ticks in milliseconds (default: 0).
    #[serde(default)]
    pub tick_interval_ms: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            max_ticks: default_max_ticks(),
            tick_interval_ms: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `MOTIVE_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (default: text).
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// A stat definition as written in YAML.
///
/// `min`/`max` describe the raw range; `baseline` is normalized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatSpec {
    /// Stat identity.
    pub id: StatId,

    /// Display name (default: the id).
    #[serde(default)]
    pub display_name: Option<String>,

    /// Raw minimum (default: 0).
    #[serde(default)]
    pub min: f64,

    /// Raw maximum (default: 1).
    #[serde(default = "default_stat_max")]
    pub max: f64,

    /// Normalized baseline (default: 0.5).
    #[serde(default = "default_baseline")]
    pub baseline: f64,

    /// Seconds per full step toward the baseline (default: 0, no decay).
    #[serde(default)]
    pub speed_to_baseline: f64,

    /// Whether the stat decays at all (default: when `speed_to_baseline`
    /// is positive).
    #[serde(default)]
    pub decays: Option<bool>,
}

impl StatSpec {
    fn to_definition(&self) -> StatDefinition {
        StatDefinition {
            id: self.id.clone(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
            min: self.min,
            max: self.max,
            baseline: self.baseline.clamp(0.0, 1.0),
            speed_to_baseline: self.speed_to_baseline,
            decays: self.decays.unwrap_or(self.speed_to_baseline > 0.0),
        }
    }
}

/// A desired state as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DesiredStateSpec {
    /// Name (default: derived from stat and objective).
    #[serde(default)]
    pub name: Option<String>,
    /// Stat it concerns.
    pub stat: StatId,
    /// Objective string.
    pub objective: String,
    /// Normalized target.
    pub target: f64,
    /// Nested states.
    #[serde(default)]
    pub sub_states: Vec<DesiredStateSpec>,
}

impl DesiredStateSpec {
    /// Resolve into a [`DesiredState`], or `None` if the objective is not
    /// recognised. Unrecognised nested states are dropped individually.
    fn resolve(&self, agent: &str) -> Option<DesiredState> {
        let objective = match self.objective.parse::<Objective>() {
            Ok(objective) => objective,
            Err(e) => {
                warn!(agent, stat = %self.stat, error = %e, "Skipping desired state");
                return None;
            }
        };
        Some(DesiredState {
            name: self
                .name
                .clone()
                .unwrap_or_else(|| format!("{} {} {}", self.stat, objective, self.target)),
            stat: self.stat.clone(),
            objective,
            target: self.target,
            sub_states: self
                .sub_states
                .iter()
                .filter_map(|s| s.resolve(agent))
                .collect(),
        })
    }
}

/// A stat condition (precondition or impact) as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionSpec {
    /// Stat it concerns.
    pub stat: StatId,
    /// Objective string.
    pub objective: String,
    /// Normalized threshold (ignored for impacts).
    #[serde(default)]
    pub threshold: f64,
}

/// A behaviour definition as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BehaviourSpec {
    /// Identity.
    pub id: BehaviourId,

    /// Seconds between availability checks (default: 0).
    #[serde(default)]
    pub retry_frequency: f64,

    /// Run length and walking timeout in seconds (default: 5).
    #[serde(default = "default_abort_duration")]
    pub abort_duration: f64,

    /// Whether it occupies the blocking slot (default: true).
    #[serde(default = "default_true")]
    pub blocking: bool,

    /// Whether heavier behaviours may interrupt it (default: true).
    #[serde(default = "default_true")]
    pub interruptible: bool,

    /// Preconditions.
    #[serde(default)]
    pub requirements: Vec<ConditionSpec>,

    /// Stats it moves; drives weighting and resource selection.
    #[serde(default)]
    pub impacts: Vec<ConditionSpec>,

    /// Influences applied when no resource is involved.
    #[serde(default)]
    pub character_influences: Vec<InfluenceTemplate>,

    /// Whether it runs at a resource (default: false).
    #[serde(default)]
    pub targets_resource: bool,

    /// Fixed weight replacing impact weighting.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl BehaviourSpec {
    fn to_definition(&self, registry: &StatRegistry) -> BehaviourDefinition {
        let mut def = BehaviourDefinition::new(self.id.clone());
        def.retry_frequency = self.retry_frequency;
        def.abort_duration = self.abort_duration;
        def.blocking = self.blocking;
        def.interruptible = self.interruptible;
        def.character_influences = self.character_influences.clone();
        def.targets_resource = self.targets_resource;
        def.weight_override = self.weight;

        for req in &self.requirements {
            match req.objective.parse::<Objective>() {
                Ok(objective) => def.requirements.push(StatRequirement {
                    stat: req.stat.clone(),
                    objective,
                    threshold: req.threshold,
                }),
                Err(e) => {
                    warn!(behaviour = %self.id, stat = %req.stat, error = %e, "Precondition unusable; behaviour disabled");
                    def.misconfigured = Some(e.to_string());
                }
            }
        }
        for impact in &self.impacts {
            match impact.objective.parse::<Objective>() {
                Ok(objective) => def.impacts.push(StatImpact {
                    stat: impact.stat.clone(),
                    objective,
                }),
                Err(e) => {
                    warn!(behaviour = %self.id, stat = %impact.stat, error = %e, "Skipping impact");
                }
            }
        }
        for stat in def
            .requirements
            .iter()
            .map(|r| &r.stat)
            .chain(def.impacts.iter().map(|i| &i.stat))
            .chain(def.character_influences.iter().map(|c| &c.stat))
        {
            if !registry.contains(stat) {
                warn!(behaviour = %self.id, stat = %stat, "Behaviour refers to unknown stat");
            }
        }
        def
    }
}

/// An agent as written in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSpec {
    /// Unique name, used by director commands and the script.
    pub name: String,

    /// Starting position.
    #[serde(default)]
    pub position: Position,

    /// Behaviours to register, in priority order for ties. Empty registers
    /// every configured behaviour in file order.
    #[serde(default)]
    pub behaviours: Vec<BehaviourId>,

    /// Desired states.
    #[serde(default)]
    pub desired_states: Vec<DesiredStateSpec>,

    /// Whether the agent keeps an interaction log (default: true).
    #[serde(default = "default_true")]
    pub memory: bool,

    /// Initial raw stat values.
    #[serde(default)]
    pub stats: BTreeMap<StatId, f64>,
}

impl AgentSpec {
    fn to_brain(
        &self,
        registry: &Arc<StatRegistry>,
        behaviours: &BTreeMap<BehaviourId, Arc<BehaviourDefinition>>,
        tracker: TrackerConfig,
        config: BrainConfig,
    ) -> Brain {
        let desired: Vec<DesiredState> = self
            .desired_states
            .iter()
            .filter_map(|d| d.resolve(&self.name))
            .collect();
        let tracker = StatsTracker::new(Arc::clone(registry), tracker).with_desired_states(desired);
        let mut brain = Brain::new(self.name.clone(), tracker, config).with_position(self.position);
        if self.memory {
            brain = brain.with_memory(Box::new(InteractionLog::new(config.memory_capacity)));
        }

        let selected: Vec<Arc<BehaviourDefinition>> = if self.behaviours.is_empty() {
            behaviours.values().cloned().collect()
        } else {
            self.behaviours
                .iter()
                .filter_map(|id| {
                    let found = behaviours.get(id).cloned();
                    if found.is_none() {
                        warn!(agent = %self.name, behaviour = %id, "Unknown behaviour on agent");
                    }
                    found
                })
                .collect()
        };
        for def in selected {
            if let Err(e) = brain.register(def) {
                warn!(agent = %self.name, error = %e, "Behaviour not registered");
            }
        }

        for (stat, raw) in &self.stats {
            if let Err(e) = brain.set_stat(stat, *raw) {
                warn!(agent = %self.name, stat = %stat, error = %e, "Initial stat value ignored");
            }
        }
        brain
    }
}

/// One scheduled script step, run once simulation time reaches `at`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEntry {
    /// The agent enters a resource's volume.
    Enter {
        /// Simulation time in seconds.
        at: f64,
        /// Agent name.
        agent: String,
        /// Resource name.
        resource: String,
    },
    /// The agent is still inside a resource's volume.
    Stay {
        /// Simulation time in seconds.
        at: f64,
        /// Agent name.
        agent: String,
        /// Resource name.
        resource: String,
    },
    /// A director command line.
    Command {
        /// Simulation time in seconds.
        at: f64,
        /// The command text.
        line: String,
    },
}

impl ScriptEntry {
    /// When the step runs.
    pub const fn at(&self) -> f64 {
        match self {
            Self::Enter { at, .. } | Self::Stay { at, .. } | Self::Command { at, .. } => *at,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_tick_seconds() -> f64 {
    0.1
}

const fn default_max_ticks() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_stat_max() -> f64 {
    1.0
}

const fn default_baseline() -> f64 {
    0.5
}

const fn default_abort_duration() -> f64 {
    5.0
}

const fn default_true() -> bool {
    true
}
