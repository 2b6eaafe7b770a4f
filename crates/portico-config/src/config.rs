//! Main configuration type.

use crate::{
    ConfigError, GatewaySection, LogFormat, LoggingConfig, ReloadConfig, RepositoryConfig,
    RepositoryKind,
};
use serde::{Deserialize, Serialize};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete Portico gateway configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use portico_config::{GatewayConfig, RepositoryKind};
///
/// let config = GatewayConfig::default();
/// assert_eq!(config.repository.kind, RepositoryKind::Memory);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// API definition source.
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Request handling configuration.
    #[serde(default)]
    pub gateway: GatewaySection,

    /// Periodic reload configuration.
    #[serde(default)]
    pub reload: ReloadConfig,
}

impl GatewayConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the repository is `file` without a path
    /// - the log level is neither a known level nor a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repository.kind == RepositoryKind::File
            && self.repository.path.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::invalid_value(
                "repository.path",
                "required when repository.kind is 'file'",
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str())
            && portico_telemetry::create_env_filter(&self.logging.level).is_err()
        {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level: {}", self.logging.level),
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset: pretty, colored, debug
    /// logs and internal error details in responses.
    ///
    /// # Example
    ///
    /// ```
    /// use portico_config::GatewayConfig;
    ///
    /// let config = GatewayConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.gateway.expose_internal_errors = true;

        config
    }

    /// Create a production configuration preset: JSON info logs, no
    /// internal error details.
    ///
    /// # Example
    ///
    /// ```
    /// use portico_config::{GatewayConfig, LogFormat};
    ///
    /// let config = GatewayConfig::production();
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.gateway.expose_internal_errors = false;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_repository_requires_path() {
        let mut config = GatewayConfig::default();
        config.repository.kind = RepositoryKind::File;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "repository.path"
        ));

        config.repository.path = Some(String::new());
        assert!(config.validate().is_err());

        config.repository.path = Some("/etc/portico/apis".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = GatewayConfig::default();

        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "portico_loader=debug,info".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "loud=[".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_presets() {
        let dev = GatewayConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(dev.gateway.expose_internal_errors);
        assert!(dev.validate().is_ok());

        let prod = GatewayConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
        assert!(!prod.gateway.expose_internal_errors);
        assert!(prod.validate().is_ok());
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result: Result<GatewayConfig, _> = toml::from_str("[server]\nport = 8080\n");
        assert!(result.is_err());
    }
}
