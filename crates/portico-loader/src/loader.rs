//! The API loader.

use crate::chain_builder::ChainBuilder;
use crate::error::LoadError;
use crate::plugin::PluginRegistry;
use crate::repository::Repository;
use portico_core::Specification;
use portico_middleware::HostMatcher;
use portico_register::{Route, RouteRegister, RouteSink, StagedRoutes};
use portico_telemetry::metrics as names;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Chain entry source for the host matcher appended to host-restricted routes.
pub const HOST_MATCHER_SOURCE: &str = "host_matcher";

/// Loads API definitions and turns them into live routes.
///
/// # Example
///
/// ```
/// use portico_core::{ApiDefinition, ProxyDefinition};
/// use portico_loader::{ApiLoader, InMemoryRepository, PluginRegistry};
/// use portico_register::RouteRegister;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let register = Arc::new(RouteRegister::new());
/// let loader = ApiLoader::new(Arc::clone(&register), Arc::new(PluginRegistry::new()));
///
/// let repo = InMemoryRepository::new();
/// repo.add(ApiDefinition::new("posts", ProxyDefinition::new("/posts/*", "http://posts:8080")));
///
/// assert_eq!(loader.load_definitions(&repo).await.unwrap(), 1);
/// assert_eq!(register.snapshot().names(), vec!["posts"]);
/// # });
/// ```
#[derive(Debug)]
pub struct ApiLoader {
    register: Arc<RouteRegister>,
    builder: ChainBuilder,
    reload: Mutex<()>,
}

impl ApiLoader {
    /// Creates a loader publishing into `register` and resolving plugins
    /// from `plugins`.
    #[must_use]
    pub fn new(register: Arc<RouteRegister>, plugins: Arc<PluginRegistry>) -> Self {
        Self {
            register,
            builder: ChainBuilder::new(plugins),
            reload: Mutex::new(()),
        }
    }

    /// Returns the register routes are published to.
    #[must_use]
    pub fn register(&self) -> &Arc<RouteRegister> {
        &self.register
    }

    /// Returns the chain builder.
    #[must_use]
    pub fn chain_builder(&self) -> &ChainBuilder {
        &self.builder
    }

    /// Replaces the live route set with the routes built from `repository`.
    ///
    /// All definitions are registered into a staging table first; the live
    /// table is swapped once at the end. Concurrent calls are serialized.
    ///
    /// Returns the number of routes published.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Repository`] if the repository cannot list its
    /// definitions. The live table is left untouched.
    pub async fn load_definitions(&self, repository: &dyn Repository) -> Result<usize, LoadError> {
        let _reload = self.reload.lock().await;

        let definitions = match repository.find_all().await {
            Ok(definitions) => definitions,
            Err(error) => {
                tracing::error!(error = %error, "failed to fetch API definitions, keeping current routes");
                return Err(error.into());
            }
        };

        let specs: Vec<Specification> = definitions.into_iter().map(Specification::new).collect();

        let staged = StagedRoutes::new();
        let registered = self.register_into(&staged, &specs).await;
        self.register.publish(staged.into_table());

        tracing::info!(
            definitions = specs.len(),
            registered,
            skipped = specs.len() - registered,
            "API definitions loaded"
        );
        Ok(registered)
    }

    /// Registers each specification directly into the live register.
    ///
    /// Every specification is handled independently; one failing does not
    /// stop the rest. Waits for any running reload to publish first. Returns
    /// how many were registered.
    pub async fn register_apis(&self, specs: &[Specification]) -> usize {
        let _reload = self.reload.lock().await;
        self.register_into(self.register.as_ref(), specs).await
    }

    /// Registers one specification directly into the live register.
    ///
    /// Returns `true` if a route was added. Invalid or inactive
    /// specifications are logged and skipped. Waits for any running reload
    /// to publish first.
    pub async fn register_api(&self, spec: &Specification) -> bool {
        let _reload = self.reload.lock().await;
        self.register_one(self.register.as_ref(), spec).await
    }

    async fn register_into(&self, sink: &dyn RouteSink, specs: &[Specification]) -> usize {
        let mut registered = 0;
        for spec in specs {
            if self.register_one(sink, spec).await {
                registered += 1;
            }
        }
        registered
    }

    async fn register_one(&self, sink: &dyn RouteSink, spec: &Specification) -> bool {
        let api_name = spec.name();

        if let Some(error) = spec.validation_error() {
            tracing::error!(api_name, error = %error, "validation errors");
        }

        if !spec.definition().active {
            tracing::warn!(api_name, "API is not active, skipping");
        }

        if !spec.is_routable() {
            let reason = if spec.is_valid() { "inactive" } else { "invalid" };
            metrics::counter!(names::APIS_SKIPPED_TOTAL, "reason" => reason).increment(1);
            return false;
        }

        let mut chain = self.builder.build(spec).await;

        let hosts = &spec.proxy().hosts;
        if !hosts.is_empty() {
            match HostMatcher::new(hosts.iter().cloned()) {
                Ok(matcher) => chain.push(HOST_MATCHER_SOURCE, Arc::new(matcher)),
                Err(error) => {
                    tracing::error!(api_name, error = %error, "invalid host pattern, skipping");
                    metrics::counter!(names::APIS_SKIPPED_TOTAL, "reason" => "host_pattern")
                        .increment(1);
                    return false;
                }
            }
        }

        let handlers = chain.len();
        sink.add(Route::new(api_name, spec.proxy().clone(), chain));
        tracing::debug!(api_name, handlers, "API registered");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;
    use crate::repository::InMemoryRepository;
    use async_trait::async_trait;
    use portico_core::{ApiDefinition, ProxyDefinition};
    use tokio::sync::Notify;

    struct Unavailable;

    /// Blocks `find_all` until released.
    struct Gated {
        entered: Notify,
        release: Notify,
        definitions: Vec<ApiDefinition>,
    }

    #[async_trait]
    impl Repository for Gated {
        async fn find_all(&self) -> Result<Vec<ApiDefinition>, RepositoryError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(self.definitions.clone())
        }
    }

    #[async_trait]
    impl Repository for Unavailable {
        async fn find_all(&self) -> Result<Vec<portico_core::ApiDefinition>, RepositoryError> {
            Err(RepositoryError::unavailable("connection refused"))
        }
    }

    fn loader() -> ApiLoader {
        ApiLoader::new(Arc::new(RouteRegister::new()), Arc::new(PluginRegistry::new()))
    }

    fn definition(name: &str) -> ApiDefinition {
        ApiDefinition::new(name, ProxyDefinition::new(format!("/{name}/*"), "http://upstream:8080"))
    }

    #[tokio::test]
    async fn test_inactive_definition_is_skipped() {
        let loader = loader();
        let spec = Specification::new(definition("legacy").with_active(false));

        assert!(!loader.register_api(&spec).await);
        assert!(loader.register().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_definition_is_skipped() {
        let loader = loader();
        let spec = Specification::new(ApiDefinition::new(
            "broken",
            ProxyDefinition::new("no-leading-slash", "not a url"),
        ));

        assert!(!loader.register_api(&spec).await);
        assert!(loader.register().is_empty());
    }

    #[tokio::test]
    async fn test_host_matcher_is_appended_last() {
        let loader = loader();
        let spec = Specification::new(ApiDefinition::new(
            "posts",
            ProxyDefinition::new("/posts/*", "http://posts:8080").with_host("api.example.com"),
        ));

        assert!(loader.register_api(&spec).await);
        let table = loader.register().snapshot();
        assert_eq!(table.get("posts").unwrap().chain().sources(), vec![HOST_MATCHER_SOURCE]);
    }

    #[tokio::test]
    async fn test_no_hosts_no_matcher() {
        let loader = loader();
        assert!(loader.register_api(&Specification::new(definition("posts"))).await);
        assert!(loader.register().snapshot().get("posts").unwrap().chain().is_empty());
    }

    #[tokio::test]
    async fn test_register_apis_does_not_short_circuit() {
        let loader = loader();
        let specs = vec![
            Specification::new(definition("a")),
            Specification::new(definition("b").with_active(false)),
            Specification::new(definition("c")),
        ];

        assert_eq!(loader.register_apis(&specs).await, 2);
        assert_eq!(loader.register().snapshot().names(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_repository_failure_keeps_current_routes() {
        let loader = loader();
        let repo = InMemoryRepository::with_definitions([definition("posts")]);
        loader.load_definitions(&repo).await.unwrap();

        let result = loader.load_definitions(&Unavailable).await;

        assert!(matches!(result, Err(LoadError::Repository(_))));
        assert_eq!(loader.register().snapshot().names(), vec!["posts"]);
    }

    #[tokio::test]
    async fn test_full_load_replaces_previous_routes() {
        let loader = loader();
        let repo = InMemoryRepository::with_definitions([definition("a"), definition("b")]);
        assert_eq!(loader.load_definitions(&repo).await.unwrap(), 2);

        repo.remove("a");
        assert_eq!(loader.load_definitions(&repo).await.unwrap(), 1);
        assert_eq!(loader.register().snapshot().names(), vec!["b"]);
    }

    #[tokio::test]
    async fn test_register_api_waits_for_running_reload() {
        let loader = Arc::new(loader());
        let repo = Arc::new(Gated {
            entered: Notify::new(),
            release: Notify::new(),
            definitions: vec![definition("a")],
        });

        let reload = tokio::spawn({
            let loader = Arc::clone(&loader);
            let repo = Arc::clone(&repo);
            async move { loader.load_definitions(repo.as_ref()).await }
        });
        repo.entered.notified().await;

        let register = tokio::spawn({
            let loader = Arc::clone(&loader);
            async move { loader.register_api(&Specification::new(definition("b"))).await }
        });
        tokio::task::yield_now().await;
        assert!(loader.register().is_empty());

        repo.release.notify_one();
        assert_eq!(reload.await.unwrap().unwrap(), 1);
        assert!(register.await.unwrap());
        assert_eq!(loader.register().snapshot().names(), vec!["a", "b"]);
    }
}
