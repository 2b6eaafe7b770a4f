use crate::error::PluginError;
use crate::plugin::Plugin;
use async_trait::async_trait;
use portico_core::Specification;
use portico_middleware::{AuthorizationManager, BoxedMiddleware, CredentialGate};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Name API definitions use to enable bearer token authentication.
pub const CREDENTIAL_GATE_PLUGIN: &str = "oauth2";

/// Puts a [`CredentialGate`] in front of the rest of the route chain.
///
/// Every API enabling the plugin shares the same authorization manager.
/// The plugin takes no configuration.
#[derive(Clone)]
pub struct CredentialGatePlugin {
    manager: Arc<dyn AuthorizationManager>,
}

impl CredentialGatePlugin {
    /// Creates the plugin backed by `manager`.
    #[must_use]
    pub fn new(manager: Arc<dyn AuthorizationManager>) -> Self {
        Self { manager }
    }
}

impl fmt::Debug for CredentialGatePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGatePlugin").finish_non_exhaustive()
    }
}

#[async_trait]
impl Plugin for CredentialGatePlugin {
    fn name(&self) -> &str {
        CREDENTIAL_GATE_PLUGIN
    }

    async fn get_middlewares(
        &self,
        config: &Map<String, Value>,
        spec: &Specification,
    ) -> Result<Vec<BoxedMiddleware>, PluginError> {
        if let Some(key) = config.keys().next() {
            return Err(PluginError::invalid_config(
                CREDENTIAL_GATE_PLUGIN,
                format!("unexpected key `{key}` for API {}", spec.name()),
            ));
        }
        Ok(vec![Arc::new(CredentialGate::new(Arc::clone(&self.manager)))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::{ApiDefinition, ProxyDefinition};
    use portico_middleware::InMemoryAuthorizationManager;

    fn spec() -> Specification {
        Specification::new(ApiDefinition::new(
            "posts",
            ProxyDefinition::new("/posts", "http://posts:8080"),
        ))
    }

    #[tokio::test]
    async fn test_contributes_one_gate() {
        let plugin = CredentialGatePlugin::new(Arc::new(InMemoryAuthorizationManager::new()));
        let handlers = plugin.get_middlewares(&Map::new(), &spec()).await.unwrap();

        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].name(), "credential_gate");
    }

    #[tokio::test]
    async fn test_rejects_configuration() {
        let plugin = CredentialGatePlugin::new(Arc::new(InMemoryAuthorizationManager::new()));
        let mut config = Map::new();
        config.insert("strategy".to_string(), Value::String("jwt".to_string()));

        let Err(err) = plugin.get_middlewares(&config, &spec()).await else {
            panic!("jwt strategy should be rejected");
        };
        assert!(matches!(err, PluginError::InvalidConfig { .. }));
    }
}
