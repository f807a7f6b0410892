//! Runs one Axelrod model simulation and logs its snapshots.
//!
//! Configuration is read from the JSON file named by `AXELROD_CONFIG`;
//! without it the model defaults are used.

mod telemetry;

use anyhow::{Context, Result};
use axelrod_core::RunnerConfig;
use axelrod_world::{Simulation, TracingRenderer};
use tracing::info;

const CONFIG_ENV: &str = "AXELROD_CONFIG";

fn main() -> Result<()> {
    let config = load_config()?;

    telemetry::init_telemetry(config.otel_enabled)?;

    info!(
        grid_size = config.model.grid_size,
        features = config.model.features,
        feature_range = config.model.feature_range,
        cycles = config.model.cycles,
        seed = config.model.seed,
        "Starting Axelrod runner"
    );

    let simulation = Simulation::new(config.model.clone())?;
    let mut renderer = renderer_for(&config);
    let result = simulation.run(&mut renderer)?;

    info!(snapshots = renderer.rendered(), "Run finished");

    if let Some(path) = &config.summary_path {
        let summary = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, summary)
            .with_context(|| format!("failed to write run summary to {}", path))?;
        info!("Run summary written to {}", path);
    }

    telemetry::shutdown_telemetry();

    Ok(())
}

fn load_config() -> Result<RunnerConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => RunnerConfig::load(&path)
            .with_context(|| format!("failed to load configuration from {}", path)),
        Err(_) => Ok(RunnerConfig::default()),
    }
}

fn renderer_for(config: &RunnerConfig) -> TracingRenderer {
    if config.log_snapshots {
        TracingRenderer::new()
    } else {
        TracingRenderer::silent()
    }
}
