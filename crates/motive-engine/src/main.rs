//! Engine binary for the Motive decision engine.
//!
//! Loads a configuration, builds the simulation, and runs it for the
//! configured number of ticks while replaying the script of spatial
//! events and director commands. Prints every agent's status and a JSON
//! snapshot at the end.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, `MOTIVE_CONFIG`, or
//!    `motive-config.yaml`; defaults when the file is absent)
//! 2. Initialize structured logging (`MOTIVE_LOG` overrides the level)
//! 3. Build the simulation
//! 4. Run the tick loop until the tick limit or Ctrl-C
//! 5. Log and print the result

mod error;
mod script;

use std::path::PathBuf;

use motive_core::{LogFormat, RunControl, SimulationConfig, log_simulation_end, run_simulation};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::script::ScriptCallback;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or built, or if
/// the run fails as a whole.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let path = config_path();
    let config = load_config(&path)?;

    // 2. Initialize structured logging.
    let filter = EnvFilter::try_from_env("MOTIVE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    match config.logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
    info!(
        path = %path.display(),
        stats = config.stats.len(),
        behaviours = config.behaviours.len(),
        resources = config.resources.len(),
        agents = config.agents.len(),
        script_steps = config.script.len(),
        "motive-engine starting"
    );

    // 3. Build the simulation.
    let mut sim = config.build().map_err(EngineError::from)?;

    // 4. Run.
    let control = RunControl::new(
        config.simulation.max_ticks,
        config.simulation.tick_interval_ms,
    );
    let stopper = control.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current tick");
            stopper.request_stop();
        }
    });

    let mut script = ScriptCallback::new(config.script.clone());
    script.apply_due(&mut sim);
    let result = run_simulation(&mut sim, &control, &mut script)
        .await
        .map_err(EngineError::from)?;

    // 5. Report.
    log_simulation_end(&result);
    if script.remaining() > 0 {
        info!(remaining = script.remaining(), "Script steps scheduled after the run ended");
    }
    println!("{}", sim.status());
    let snapshot = serde_json::to_string_pretty(&sim.snapshot()).map_err(EngineError::from)?;
    println!("{snapshot}");
    Ok(())
}

/// First command-line argument, then `MOTIVE_CONFIG`, then the default.
fn config_path() -> PathBuf {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("MOTIVE_CONFIG").ok())
        .map_or_else(|| PathBuf::from("motive-config.yaml"), PathBuf::from)
}

fn load_config(path: &std::path::Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        // Logging is not up yet.
        eprintln!("config file {} not found, using defaults", path.display());
        Ok(SimulationConfig::default())
    }
}
