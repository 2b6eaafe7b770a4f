//! Immutable route table snapshots.

use crate::route::Route;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;

/// The result of matching a request path against a [`RouteTable`].
#[derive(Debug, Clone)]
pub struct RouteMatch {
    route: Arc<Route>,
    params: HashMap<String, String>,
    remainder: String,
}

impl RouteMatch {
    /// Returns the matched route.
    #[must_use]
    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Returns the extracted path parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Returns a specific path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns the part of the path below a wildcard listen path.
    ///
    /// Starts with `/` when non-empty.
    #[must_use]
    pub fn remainder(&self) -> &str {
        &self.remainder
    }
}

/// A set of routes keyed by name, in insertion order.
///
/// Tables are values: every change produces a new table, and published
/// tables are never mutated.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    index: HashMap<String, usize>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a route.
    ///
    /// A route with the same name is replaced in place, keeping its position.
    pub fn insert(&mut self, route: impl Into<Arc<Route>>) {
        let route = route.into();
        match self.index.get(route.name()) {
            Some(&position) => self.routes[position] = route,
            None => {
                self.index.insert(route.name().to_string(), self.routes.len());
                self.routes.push(route);
            }
        }
    }

    /// Returns the route named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.index.get(name).map(|&i| &self.routes[i])
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Returns the route names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.name()).collect()
    }

    /// Iterates over the routes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    /// Finds the most specific route whose listen path matches `path`.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<RouteMatch> {
        self.best_match(path, |_| true)
    }

    /// Like [`match_path`](Self::match_path), restricted to routes that
    /// answer `method`.
    #[must_use]
    pub fn match_request(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        self.best_match(path, |route| route.allows_method(method))
    }

    fn best_match(&self, path: &str, accept: impl Fn(&Route) -> bool) -> Option<RouteMatch> {
        let mut best: Option<(_, RouteMatch)> = None;

        for route in &self.routes {
            if !accept(route.as_ref()) {
                continue;
            }
            let Some((params, remainder)) = route.listen_path().matches(path) else {
                continue;
            };
            let rank = route.listen_path().specificity();
            if best.as_ref().is_some_and(|(current, _)| *current >= rank) {
                continue;
            }
            best = Some((
                rank,
                RouteMatch {
                    route: Arc::clone(route),
                    params,
                    remainder,
                },
            ));
        }

        best.map(|(_, found)| found)
    }
}

impl FromIterator<Route> for RouteTable {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        let mut table = Self::new();
        for route in iter {
            table.insert(route);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_core::ProxyDefinition;
    use portico_middleware::HandlerChain;

    fn route(name: &str, listen_path: &str) -> Route {
        Route::new(
            name,
            ProxyDefinition::new(listen_path, format!("http://{name}.internal")),
            HandlerChain::new(),
        )
    }

    #[test]
    fn test_insertion_order_and_replace() {
        let mut table = RouteTable::new();
        table.insert(route("a", "/a"));
        table.insert(route("b", "/b"));
        table.insert(route("a", "/a2"));

        assert_eq!(table.len(), 2);
        assert_eq!(table.names(), vec!["a", "b"]);
        assert_eq!(table.get("a").unwrap().listen_path().as_str(), "/a2");
        assert!(table.get("c").is_none());
    }

    #[test]
    fn test_longest_match_wins() {
        let table: RouteTable = [
            route("root", "/*"),
            route("posts", "/posts/*"),
            route("post", "/posts/{id}"),
            route("latest", "/posts/latest"),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.match_path("/users").unwrap().route().name(), "root");
        assert_eq!(table.match_path("/posts").unwrap().route().name(), "posts");
        assert_eq!(table.match_path("/posts/1/comments").unwrap().route().name(), "posts");

        let post = table.match_path("/posts/7").unwrap();
        assert_eq!(post.route().name(), "post");
        assert_eq!(post.param("id"), Some("7"));

        assert_eq!(table.match_path("/posts/latest").unwrap().route().name(), "latest");
    }

    #[test]
    fn test_ties_go_to_first_inserted() {
        let table: RouteTable = [route("first", "/x/*"), route("second", "/x/*")]
            .into_iter()
            .collect();
        assert_eq!(table.match_path("/x/1").unwrap().route().name(), "first");
    }

    #[test]
    fn test_no_match() {
        let table: RouteTable = [route("posts", "/posts")].into_iter().collect();
        assert!(table.match_path("/users").is_none());
        assert!(RouteTable::new().match_path("/").is_none());
    }

    #[test]
    fn test_match_request_filters_methods() {
        let read = Route::new(
            "read",
            ProxyDefinition::new("/items/*", "http://read").with_method("GET"),
            HandlerChain::new(),
        );
        let write = Route::new(
            "write",
            ProxyDefinition::new("/items/*", "http://write").with_method("POST"),
            HandlerChain::new(),
        );
        let table: RouteTable = [read, write].into_iter().collect();

        assert_eq!(
            table.match_request(&Method::GET, "/items/1").unwrap().route().name(),
            "read"
        );
        assert_eq!(
            table.match_request(&Method::POST, "/items/1").unwrap().route().name(),
            "write"
        );
        assert!(table.match_request(&Method::DELETE, "/items/1").is_none());
    }
}
