//! The gateway: configuration, reloads and request dispatch.

use crate::error::GatewayInitError;
use crate::upstream::{Upstream, UpstreamTarget};
use portico_config::{GatewayConfig, RepositoryKind};
use portico_core::{GatewayError, RequestId};
use portico_loader::{
    ApiLoader, FileSystemRepository, InMemoryRepository, LoadError, Plugin, PluginRegistry,
    Repository,
};
use portico_middleware::{ErrorTranslation, MiddlewareContext, MiddlewareResult, Request, Response};
use portico_register::{RouteMatch, RouteRegister, RouteTable};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Header a client may use to propagate its own request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A running gateway.
///
/// Owns the live route register, reloads it from the configured repository,
/// and dispatches requests through the matched route's chain into the
/// [`Upstream`].
///
/// # Example
///
/// ```rust,ignore
/// use portico::{Gateway, GatewayConfig};
///
/// let gateway = Gateway::builder()
///     .config(GatewayConfig::production())
///     .upstream(Arc::new(MyTransport::new()))
///     .start()
///     .await?;
///
/// let response = gateway.dispatch(request, Some(remote_addr)).await;
/// ```
pub struct Gateway {
    config: GatewayConfig,
    repository: Arc<dyn Repository>,
    loader: ApiLoader,
    upstream: Arc<dyn Upstream>,
    errors: ErrorTranslation,
}

impl Gateway {
    /// Creates a gateway builder.
    #[must_use]
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// Returns the configuration the gateway was built with.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Returns the definition repository.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn Repository> {
        &self.repository
    }

    /// Returns the API loader.
    #[must_use]
    pub fn loader(&self) -> &ApiLoader {
        &self.loader
    }

    /// Returns the live route register.
    #[must_use]
    pub fn register(&self) -> &Arc<RouteRegister> {
        self.loader.register()
    }

    /// Returns a snapshot of the live route table.
    #[must_use]
    pub fn routes(&self) -> Arc<RouteTable> {
        self.loader.register().snapshot()
    }

    /// Reloads every definition from the repository and publishes the new
    /// route table. Concurrent reloads are serialized.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the repository cannot be read; the current
    /// routes stay live.
    pub async fn reload(&self) -> Result<usize, LoadError> {
        self.loader.load_definitions(self.repository.as_ref()).await
    }

    /// Spawns a task reloading on the configured `reload.interval_secs`.
    ///
    /// Returns `None` when periodic reloads are disabled. Failed reloads are
    /// logged and the task keeps running.
    pub fn spawn_reload_task(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let period = self.config.reload.interval()?;
        let gateway = Arc::clone(self);

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(error) = gateway.reload().await {
                    tracing::warn!(error = %error, "periodic reload failed, keeping current routes");
                }
            }
        }))
    }

    /// Handles one request end to end.
    ///
    /// The request is matched against a snapshot of the route table taken on
    /// entry, so a concurrent reload never affects a request in flight.
    /// Every error, including "no route", is translated into a response.
    pub async fn dispatch(&self, request: Request, remote_addr: Option<SocketAddr>) -> Response {
        let table = self.routes();
        let matched = table.match_request(request.method(), request.uri().path());

        let mut ctx = request_context(&request, remote_addr);
        if let Some(matched) = &matched {
            ctx = ctx.with_route(matched.route().name());
        }

        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let result = match matched {
            Some(matched) => self.forward(&mut ctx, &matched, request).await,
            None => Err(GatewayError::route_not_found(format!("no API listens on {path}"))),
        };

        let response = match result {
            Ok(response) => response,
            Err(error) => self.errors.translate(&ctx, &error),
        };

        tracing::debug!(
            request_id = %ctx.request_id(),
            method = %method,
            path = %path,
            api_name = ctx.route().unwrap_or("-"),
            status = response.status().as_u16(),
            elapsed_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request dispatched"
        );
        response
    }

    async fn forward(
        &self,
        ctx: &mut MiddlewareContext,
        matched: &RouteMatch,
        request: Request,
    ) -> MiddlewareResult {
        let upstream = Arc::clone(&self.upstream);
        let uri = request.uri().clone();

        matched
            .route()
            .chain()
            .run(ctx, request, move |ctx, request| {
                let target = UpstreamTarget::resolve(matched, &uri, ctx);
                Box::pin(async move { upstream.forward(target?, request).await })
            })
            .await
    }
}

fn request_context(request: &Request, remote_addr: Option<SocketAddr>) -> MiddlewareContext {
    let propagated = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(RequestId::parse);

    let ctx = match propagated {
        Some(id) => MiddlewareContext::with_request_id(id),
        None => MiddlewareContext::new(),
    };
    match remote_addr {
        Some(addr) => ctx.with_remote_addr(addr),
        None => ctx,
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("config", &self.config)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Gateway`].
#[derive(Default)]
pub struct GatewayBuilder {
    config: GatewayConfig,
    repository: Option<Arc<dyn Repository>>,
    plugins: PluginRegistry,
    upstream: Option<Arc<dyn Upstream>>,
}

impl GatewayBuilder {
    /// Creates a builder with default configuration and no plugins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the repository selected by the configuration.
    #[must_use]
    pub fn repository(mut self, repository: Arc<dyn Repository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Registers a plugin.
    #[must_use]
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.register(plugin);
        self
    }

    /// Replaces the plugin registry.
    #[must_use]
    pub fn plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    /// Sets the upstream transport.
    #[must_use]
    pub fn upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    /// Builds the gateway with an empty route table.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayInitError::Config`] if the configuration is invalid
    /// and [`GatewayInitError::MissingUpstream`] if no upstream was set.
    pub fn build(self) -> Result<Gateway, GatewayInitError> {
        self.config.validate()?;
        let upstream = self.upstream.ok_or(GatewayInitError::MissingUpstream)?;

        let repository = match self.repository {
            Some(repository) => repository,
            None => repository_from(&self.config),
        };

        let errors =
            ErrorTranslation::new().expose_internal_errors(self.config.gateway.expose_internal_errors);
        let loader = ApiLoader::new(Arc::new(RouteRegister::new()), Arc::new(self.plugins));

        tracing::info!(
            plugins = ?loader.chain_builder().plugins().names(),
            repository = ?self.config.repository.kind,
            "gateway built"
        );

        Ok(Gateway {
            config: self.config,
            repository,
            loader,
            upstream,
            errors,
        })
    }

    /// Builds the gateway, loads every definition, and starts the periodic
    /// reload task if one is configured.
    ///
    /// # Errors
    ///
    /// Returns everything [`build`](Self::build) does, plus
    /// [`GatewayInitError::Load`] if the initial load fails.
    pub async fn start(self) -> Result<Arc<Gateway>, GatewayInitError> {
        let gateway = Arc::new(self.build()?);
        gateway.reload().await?;
        // Detached: the task ends with the runtime.
        drop(gateway.spawn_reload_task());
        Ok(gateway)
    }
}

fn repository_from(config: &GatewayConfig) -> Arc<dyn Repository> {
    match (config.repository.kind, config.repository.path.as_deref()) {
        (RepositoryKind::File, Some(path)) => Arc::new(FileSystemRepository::new(path)),
        // A file repository without a path fails validation before this point.
        _ => Arc::new(InMemoryRepository::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::Full;
    use portico_middleware::ResponseExt;

    struct Unreachable;

    #[async_trait]
    impl Upstream for Unreachable {
        async fn forward(&self, _target: UpstreamTarget, _request: Request) -> MiddlewareResult {
            Ok(Response::text(StatusCode::OK, "unreachable"))
        }
    }

    fn request(uri: &str) -> Request {
        http::Request::builder()
            .uri(uri)
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_build_requires_upstream() {
        assert!(matches!(
            Gateway::builder().build(),
            Err(GatewayInitError::MissingUpstream)
        ));
    }

    #[test]
    fn test_build_validates_config() {
        let mut config = GatewayConfig::default();
        config.repository.kind = RepositoryKind::File;

        let result = Gateway::builder()
            .config(config)
            .upstream(Arc::new(Unreachable))
            .build();
        assert!(matches!(result, Err(GatewayInitError::Config(_))));
    }

    #[test]
    fn test_request_id_is_propagated() {
        let id = RequestId::new();
        let mut request = request("/posts");
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, id.to_string().parse().unwrap());

        assert_eq!(request_context(&request, None).request_id(), id);
    }

    #[test]
    fn test_malformed_request_id_is_replaced() {
        let mut request = request("/posts");
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, "not-a-uuid".parse().unwrap());

        let addr: SocketAddr = "10.0.0.7:51234".parse().unwrap();
        let ctx = request_context(&request, Some(addr));
        assert_eq!(ctx.remote_addr(), Some(addr));
    }

    #[tokio::test]
    async fn test_unmatched_request_is_404() {
        let gateway = Gateway::builder()
            .upstream(Arc::new(Unreachable))
            .build()
            .unwrap();

        let response = gateway.dispatch(request("/nothing"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reload_disabled_spawns_nothing() {
        let gateway = Arc::new(
            Gateway::builder()
                .upstream(Arc::new(Unreachable))
                .build()
                .unwrap(),
        );
        assert!(gateway.spawn_reload_task().is_none());
    }
}
