//! # Portico Telemetry
//!
//! Logging setup and shared observability names for the Portico gateway.
//!
//! - [`LogConfig`] / [`init_logging`] - `tracing-subscriber` setup with JSON
//!   or pretty output and an env-filter directive
//! - [`fields`] - Standard structured log field names
//! - [`metrics`] - Metric names emitted through the `metrics` facade
//!
//! No metrics exporter is installed here; the embedding process chooses one.
//!
//! # Example
//!
//! ```rust,ignore
//! use portico_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(api_name = "posts", "API registered");
//! ```

#![doc(html_root_url = "https://docs.rs/portico-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
