//! Loader error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`Repository`](crate::Repository).
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The definition source could not be read.
    #[error("failed to read API definitions from {path}")]
    Read {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A definition file is not valid JSON or has the wrong shape.
    #[error("failed to parse API definitions in {path}")]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Backend-specific failure.
    #[error("repository unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

impl RepositoryError {
    /// Create a new read error.
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a new parse error.
    pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Create a new unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Error returned by a [`Plugin`](crate::Plugin) that cannot build its handlers.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The plugin's configuration block is invalid.
    #[error("invalid configuration for plugin {plugin}: {reason}")]
    InvalidConfig {
        /// Plugin name.
        plugin: String,
        /// Why the configuration was rejected.
        reason: String,
    },

    /// Any other failure.
    #[error("plugin {plugin} failed: {message}")]
    Failed {
        /// Plugin name.
        plugin: String,
        /// Description of the failure.
        message: String,
    },
}

impl PluginError {
    /// Create a new invalid configuration error.
    pub fn invalid_config(plugin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            plugin: plugin.into(),
            reason: reason.into(),
        }
    }

    /// Create a new generic failure.
    pub fn failed(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            plugin: plugin.into(),
            message: message.into(),
        }
    }
}

/// Errors that abort a whole load cycle.
///
/// Per-definition problems (validation failures, inactive definitions,
/// unknown or failing plugins) are logged and skipped instead.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The repository could not list definitions. Nothing was published.
    #[error("failed to fetch API definitions")]
    Repository(#[from] RepositoryError),
}
