//! Plugin chain resolution.

use crate::plugin::PluginRegistry;
use portico_core::Specification;
use portico_middleware::HandlerChain;
use std::sync::Arc;

/// Resolves a specification's plugin declarations into a handler chain.
///
/// For each declaration, in order:
///
/// 1. disabled declarations are ignored;
/// 2. names missing from the registry are logged and ignored;
/// 3. a plugin that fails to build its handlers is logged and contributes
///    nothing;
/// 4. otherwise every returned handler is appended, in the order returned,
///    tagged with the plugin name.
///
/// The result depends only on the specification and the registry.
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    plugins: Arc<PluginRegistry>,
}

impl ChainBuilder {
    /// Creates a builder resolving names against `plugins`.
    #[must_use]
    pub fn new(plugins: Arc<PluginRegistry>) -> Self {
        Self { plugins }
    }

    /// Returns the registry used for resolution.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.plugins
    }

    /// Builds the plugin part of `spec`'s chain.
    pub async fn build(&self, spec: &Specification) -> HandlerChain {
        let mut chain = HandlerChain::new();

        for declaration in spec.plugins() {
            if !declaration.enabled {
                tracing::debug!(
                    api_name = spec.name(),
                    plugin_name = %declaration.name,
                    "plugin not enabled"
                );
                continue;
            }

            let Some(plugin) = self.plugins.get(&declaration.name) else {
                tracing::warn!(
                    api_name = spec.name(),
                    plugin_name = %declaration.name,
                    "plugin not registered, skipping"
                );
                continue;
            };

            match plugin.get_middlewares(&declaration.config, spec).await {
                Ok(handlers) => {
                    tracing::debug!(
                        api_name = spec.name(),
                        plugin_name = %declaration.name,
                        handlers = handlers.len(),
                        "plugin enabled"
                    );
                    for handler in handlers {
                        chain.push(declaration.name.as_str(), handler);
                    }
                }
                Err(error) => {
                    tracing::error!(
                        api_name = spec.name(),
                        plugin_name = %declaration.name,
                        error = %error,
                        "error loading plugin"
                    );
                }
            }
        }

        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PluginError;
    use crate::plugin::Plugin;
    use async_trait::async_trait;
    use portico_core::{ApiDefinition, PluginDeclaration, ProxyDefinition};
    use portico_middleware::{BoxFuture, BoxedMiddleware, Middleware, MiddlewareContext, MiddlewareResult, Next, Request};
    use serde_json::{Map, Value};

    struct Handler(&'static str);

    impl Middleware for Handler {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, MiddlewareResult> {
            Box::pin(next.run(ctx, request))
        }
    }

    /// Contributes `count` handlers, or fails when configured with `"fail": true`.
    struct Multi {
        name: &'static str,
        count: usize,
    }

    #[async_trait]
    impl Plugin for Multi {
        fn name(&self) -> &str {
            self.name
        }

        async fn get_middlewares(
            &self,
            config: &Map<String, Value>,
            _spec: &Specification,
        ) -> Result<Vec<BoxedMiddleware>, PluginError> {
            if config.get("fail").and_then(Value::as_bool) == Some(true) {
                return Err(PluginError::failed(self.name, "asked to fail"));
            }
            Ok((0..self.count)
                .map(|_| Arc::new(Handler(self.name)) as BoxedMiddleware)
                .collect())
        }
    }

    fn builder() -> ChainBuilder {
        let registry = PluginRegistry::new()
            .with(Arc::new(Multi { name: "stats", count: 1 }))
            .with(Arc::new(Multi { name: "cors", count: 2 }));
        ChainBuilder::new(Arc::new(registry))
    }

    fn spec(plugins: Vec<PluginDeclaration>) -> Specification {
        let mut definition = ApiDefinition::new("posts", ProxyDefinition::new("/posts", "http://posts:8080"));
        definition.plugins = plugins;
        Specification::new(definition)
    }

    #[tokio::test]
    async fn test_enabled_plugins_in_declaration_order() {
        let chain = builder()
            .build(&spec(vec![
                PluginDeclaration::enabled("cors"),
                PluginDeclaration::enabled("stats"),
            ]))
            .await;

        assert_eq!(chain.sources(), vec!["cors", "cors", "stats"]);
    }

    #[tokio::test]
    async fn test_disabled_and_unknown_plugins_contribute_nothing() {
        let chain = builder()
            .build(&spec(vec![
                PluginDeclaration::disabled("cors"),
                PluginDeclaration::enabled("missing"),
                PluginDeclaration::enabled("stats"),
            ]))
            .await;

        assert_eq!(chain.sources(), vec!["stats"]);
    }

    #[tokio::test]
    async fn test_failing_plugin_is_omitted() {
        let chain = builder()
            .build(&spec(vec![
                PluginDeclaration::enabled("cors").with_config("fail", Value::Bool(true)),
                PluginDeclaration::enabled("stats"),
            ]))
            .await;

        assert_eq!(chain.sources(), vec!["stats"]);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let builder = builder();
        let spec = spec(vec![
            PluginDeclaration::enabled("stats"),
            PluginDeclaration::enabled("cors"),
        ]);

        let first = builder.build(&spec).await;
        let second = builder.build(&spec).await;
        assert_eq!(first.sources(), second.sources());
        assert_eq!(first.names(), second.names());
    }
}
