//! Orchestration layer for the Motive decision engine.
//!
//! - [`clock`]: fixed-step simulation clock
//! - [`config`]: YAML configuration and simulation construction
//! - [`command`]: director command parsing
//! - [`simulation`]: the tick, spatial events, commands, and fault isolation
//! - [`runner`]: the async tick loop

pub mod clock;
pub mod command;
pub mod config;
pub mod runner;
pub mod simulation;

pub use clock::{ClockError, SimulationClock};
pub use command::{CommandError, DirectorCommand};
pub use config::{
    AgentSpec, BehaviourSpec, ClockConfig, ConditionSpec, ConfigError, DesiredStateSpec, LogFormat,
    LoggingConfig, ScriptEntry, SimulationConfig, StatSpec,
};
pub use runner::{
    EndReason, NoOpCallback, RunControl, RunnerError, SimulationResult, TickCallback,
    log_simulation_end, run_simulation,
};
pub use simulation::{
    AgentEvent, AgentFault, Simulation, SimulationError, SimulationSnapshot, TickSummary,
};
