//! Plugins and the plugin registry.

use crate::error::PluginError;
use async_trait::async_trait;
use portico_core::Specification;
use portico_middleware::BoxedMiddleware;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A named factory of route handlers.
///
/// The loader calls [`get_middlewares`](Self::get_middlewares) once per API
/// definition that enables the plugin, passing that definition's plugin
/// configuration block. The returned handlers are appended to the route
/// chain in the order given.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Returns the name API definitions refer to this plugin by.
    fn name(&self) -> &str;

    /// Builds this plugin's handlers for one API.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if the configuration is unusable. The
    /// plugin then contributes nothing to that API's chain.
    async fn get_middlewares(
        &self,
        config: &Map<String, Value>,
        spec: &Specification,
    ) -> Result<Vec<BoxedMiddleware>, PluginError>;
}

/// Name-keyed set of plugins, built at startup.
///
/// # Example
///
/// ```
/// use portico_loader::PluginRegistry;
/// use portico_loader::builtin::CredentialGatePlugin;
/// use portico_middleware::InMemoryAuthorizationManager;
/// use std::sync::Arc;
///
/// let mut registry = PluginRegistry::new();
/// registry.register(Arc::new(CredentialGatePlugin::new(Arc::new(
///     InMemoryAuthorizationManager::new(),
/// ))));
///
/// assert!(registry.get("oauth2").is_some());
/// assert!(registry.get("cors").is_none());
/// ```
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin under its own name, replacing any plugin with the
    /// same name.
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let name = plugin.name().to_string();
        let previous = self.plugins.insert(name.clone(), plugin);
        if previous.is_some() {
            tracing::warn!(plugin_name = %name, "plugin registered twice, keeping the latest");
        }
        previous
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.register(plugin);
        self
    }

    /// Looks up a plugin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Returns the number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if no plugins are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Returns the registered plugin names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}
