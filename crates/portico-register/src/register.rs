//! Atomic route publication.

use crate::route::Route;
use crate::table::RouteTable;
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use portico_telemetry::metrics as names;
use std::fmt;
use std::sync::Arc;

/// Destination for routes built by the loader.
pub trait RouteSink: Send + Sync {
    /// Adds (or replaces, by name) a route.
    fn add(&self, route: Route);
}

/// The live route table.
///
/// Readers take lock-free snapshots with [`snapshot`](Self::snapshot).
/// Writers either add one route at a time (copy-on-write, each addition is
/// atomic on its own) or [`publish`](Self::publish) a whole table in a
/// single swap.
pub struct RouteRegister {
    table: ArcSwap<RouteTable>,
}

impl RouteRegister {
    /// Creates a register with an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::new()),
        }
    }

    /// Returns the current table.
    ///
    /// The snapshot stays valid and unchanged however long the caller holds
    /// it, even across later publications.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Replaces the whole table in one swap and returns the previous one.
    pub fn publish(&self, table: RouteTable) -> Arc<RouteTable> {
        let routes = table.len();
        let previous = self.table.swap(Arc::new(table));
        record_route_count(routes);
        tracing::info!(
            routes,
            previous_routes = previous.len(),
            "route table published"
        );
        previous
    }

    /// Returns the number of live routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.load().len()
    }

    /// Returns `true` if no routes are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.load().is_empty()
    }
}

impl RouteSink for RouteRegister {
    fn add(&self, route: Route) {
        let route = Arc::new(route);
        let previous = self.table.rcu(|current| {
            let mut next = RouteTable::clone(current);
            next.insert(Arc::clone(&route));
            next
        });
        let routes = if previous.get(route.name()).is_some() {
            previous.len()
        } else {
            previous.len() + 1
        };
        record_route_count(routes);
    }
}

impl Default for RouteRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegister")
            .field("routes", &self.table.load().names())
            .finish()
    }
}

#[allow(clippy::cast_precision_loss)]
fn record_route_count(routes: usize) {
    metrics::gauge!(names::ROUTES_REGISTERED).set(routes as f64);
}

/// Routes collected off to the side during a full reload.
///
/// Nothing added here is visible to requests until the finished table is
/// handed to [`RouteRegister::publish`].
#[derive(Debug, Default)]
pub struct StagedRoutes {
    table: Mutex<RouteTable>,
}

impl StagedRoutes {
    /// Creates an empty staging area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of staged routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// Returns `true` if nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Consumes the staging area and returns the collected table.
    #[must_use]
    pub fn into_table(self) -> RouteTable {
        self.table.into_inner()
    }
}

impl RouteSink for StagedRoutes {
    fn add(&self, route: Route) {
        self.table.lock().insert(route);
    }
}
