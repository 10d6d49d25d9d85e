//! Control panel backend binary for the semsim instrument.
//!
//! Wires together the state store, the background telemetry generator,
//! and the HTTP + `WebSocket` server, then runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `semsim-config.yaml` (defaults if absent)
//! 3. Construct the instrument store with schema defaults
//! 4. Spawn the telemetry generator on a background task
//! 5. Serve the control panel API in the foreground until `Ctrl-C`
//! 6. Stop the generator gracefully and wait for it to finish
//!
//! All state is in-memory; a restart returns every field to its default.

mod config;
mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use semsim_server::{AppState, ServerConfig, start_server};
use semsim_state::InstrumentStore;
use semsim_telemetry::{GeneratorControl, spawn_generator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Path of the optional YAML configuration file.
const CONFIG_PATH: &str = "semsim-config.yaml";

/// Application entry point for the control panel backend.
///
/// # Errors
///
/// Returns an error if configuration loading or the HTTP server fails.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("semsim-engine starting");

    // 2. Load configuration.
    let config_path = Path::new(CONFIG_PATH);
    let config = EngineConfig::from_file_or_default(config_path)?;
    info!(
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.telemetry.tick_interval_ms,
        "configuration loaded"
    );

    // 3. Construct the instrument store with schema defaults.
    let store = Arc::new(InstrumentStore::new());

    // 4. Spawn the telemetry generator.
    let generator_control = Arc::new(GeneratorControl::new());
    let generator_handle = spawn_generator(
        Arc::clone(&store),
        Arc::clone(&generator_control),
        Duration::from_millis(config.telemetry.tick_interval_ms),
    );

    // 5. Serve the API until Ctrl-C.
    let state = Arc::new(AppState::with_store(store));
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    start_server(&server_config, state, shutdown_signal()).await?;

    // 6. Stop the generator and wait for its final tick.
    info!("shutting down");
    generator_control.request_stop();
    if generator_handle.await.is_err() {
        warn!("telemetry generator task did not shut down cleanly");
    }

    info!("semsim-engine stopped");
    Ok(())
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}
