//! API definition types.
//!
//! An [`ApiDefinition`] is the raw configuration for one API as supplied by a
//! repository. Definitions are deserialized from JSON and never mutated once
//! loaded; all derived state lives in [`Specification`](crate::Specification).
//!
//! # Example
//!
//! ```
//! use portico_core::ApiDefinition;
//!
//! let json = r#"{
//!     "name": "posts",
//!     "proxy": {
//!         "listen_path": "/posts/*",
//!         "upstream_url": "http://posts.internal:8080",
//!         "hosts": ["api.example.com"]
//!     },
//!     "plugins": [{"name": "stats", "enabled": true}]
//! }"#;
//!
//! let definition: ApiDefinition = serde_json::from_str(json).unwrap();
//! assert!(definition.active);
//! assert_eq!(definition.plugins[0].name, "stats");
//! ```

use serde::{Deserialize, Serialize};

/// Raw configuration for a single API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiDefinition {
    /// Unique API name.
    pub name: String,

    /// Explicit activation flag. An inactive API is never routed.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Proxy target for this API.
    pub proxy: ProxyDefinition,

    /// Plugin declarations, in execution order.
    #[serde(default)]
    pub plugins: Vec<PluginDeclaration>,
}

impl ApiDefinition {
    /// Creates an active definition with no plugins.
    #[must_use]
    pub fn new(name: impl Into<String>, proxy: ProxyDefinition) -> Self {
        Self {
            name: name.into(),
            active: true,
            proxy,
            plugins: Vec::new(),
        }
    }

    /// Sets the activation flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Appends a plugin declaration.
    #[must_use]
    pub fn with_plugin(mut self, plugin: PluginDeclaration) -> Self {
        self.plugins.push(plugin);
        self
    }
}

const fn default_active() -> bool {
    true
}

/// Proxy target descriptor for an API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDefinition {
    /// Path prefix the gateway listens on (e.g. `/posts/*`).
    pub listen_path: String,

    /// Upstream base URL requests are forwarded to.
    pub upstream_url: String,

    /// Host patterns this API answers for. Empty means any host.
    #[serde(default)]
    pub hosts: Vec<String>,

    /// Strip the listen path before forwarding upstream.
    #[serde(default)]
    pub strip_path: bool,

    /// Allowed HTTP methods. Empty means all methods.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ProxyDefinition {
    /// Creates a proxy definition for a listen path and upstream URL.
    #[must_use]
    pub fn new(listen_path: impl Into<String>, upstream_url: impl Into<String>) -> Self {
        Self {
            listen_path: listen_path.into(),
            upstream_url: upstream_url.into(),
            ..Self::default()
        }
    }

    /// Adds a host pattern.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    /// Sets whether the listen path is stripped before forwarding.
    #[must_use]
    pub fn with_strip_path(mut self, strip_path: bool) -> Self {
        self.strip_path = strip_path;
        self
    }

    /// Adds an allowed HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.methods.push(method.into());
        self
    }
}

/// A plugin declared on an API definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDeclaration {
    /// Registered plugin name.
    pub name: String,

    /// Whether the plugin contributes to the handler chain.
    #[serde(default)]
    pub enabled: bool,

    /// Plugin-specific configuration.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl PluginDeclaration {
    /// Creates an enabled plugin declaration with empty configuration.
    #[must_use]
    pub fn enabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            config: serde_json::Map::new(),
        }
    }

    /// Creates a disabled plugin declaration with empty configuration.
    #[must_use]
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            config: serde_json::Map::new(),
        }
    }

    /// Sets a configuration value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}
