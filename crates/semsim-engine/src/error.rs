//! Error types for the engine binary.

use crate::config::ConfigError;

/// Errors that can terminate the engine at startup or shutdown.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP server failed to start or crashed.
    #[error("server error: {0}")]
    Server(#[from] semsim_server::ServerError),
}
