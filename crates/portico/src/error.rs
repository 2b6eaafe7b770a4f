//! Gateway construction errors.

use portico_config::ConfigError;
use portico_loader::LoadError;
use portico_telemetry::TelemetryError;
use thiserror::Error;

/// Errors raised while building or starting a [`Gateway`](crate::Gateway).
#[derive(Debug, Error)]
pub enum GatewayInitError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    /// The initial definition load failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// No upstream transport was supplied.
    #[error("no upstream configured")]
    MissingUpstream,
}
