//! Structured logging for Portico.
//!
//! # Example
//!
//! ```rust,ignore
//! use portico_telemetry::logging::{init_logging, LogConfig};
//!
//! let config = LogConfig::default();
//! init_logging(&config)?;
//!
//! tracing::warn!(path = "/posts", origin = "10.0.0.7:51234", "access token not authorized");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"`, `"portico_loader=debug,info"`).
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to emit ANSI colors (pretty format only).
    pub ansi: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            ansi: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            json_format: false,
            ansi: true,
            file_line_info: true,
            ..Self::default()
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Initializes the global `tracing` subscriber.
///
/// Does nothing when logging is disabled.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` for a bad level directive and
/// `TelemetryError::LoggingInit` if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_ansi(config.ansi)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidFilter` if the directive does not parse.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter).map_err(|e| TelemetryError::InvalidFilter(e.to_string()))
}

/// Standard log field names.
///
/// Use these field names for consistency across logs.
pub mod fields {
    /// API definition name.
    pub const API_NAME: &str = "api_name";

    /// Plugin name.
    pub const PLUGIN_NAME: &str = "plugin_name";

    /// Request path.
    pub const PATH: &str = "path";

    /// Remote address of the caller.
    pub const ORIGIN: &str = "origin";

    /// Request ID.
    pub const REQUEST_ID: &str = "request_id";

    /// Error description.
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert!(!config.ansi);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.ansi);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        assert_eq!(LogConfig::production(), LogConfig::default());
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("portico_loader=debug,warn").is_ok());
        assert!(matches!(
            create_env_filter("portico=[unclosed"),
            Err(TelemetryError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_disabled_logging_is_a_no_op() {
        let config = LogConfig {
            enabled: false,
            level: "not a level at all [".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::API_NAME, "api_name");
        assert_eq!(fields::PLUGIN_NAME, "plugin_name");
        assert_eq!(fields::ORIGIN, "origin");
    }
}
