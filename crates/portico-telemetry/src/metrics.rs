//! Metric names.
//!
//! Emitted through the [`metrics`](::metrics) facade. Call [`describe`] once
//! after installing a recorder to attach units and help text.

use ::metrics::{describe_counter, describe_gauge, Unit};

/// Gauge: number of routes in the live table.
pub const ROUTES_REGISTERED: &str = "portico_routes_registered";

/// Counter: API definitions skipped during registration, labeled by `reason`
/// (`invalid`, `inactive`, `host_pattern`).
pub const APIS_SKIPPED_TOTAL: &str = "portico_apis_skipped_total";

/// Counter: credential gate failures, labeled by `kind`.
pub const AUTH_FAILURES_TOTAL: &str = "portico_auth_failures_total";

/// Registers descriptions for every Portico metric with the installed recorder.
pub fn describe() {
    describe_gauge!(ROUTES_REGISTERED, Unit::Count, "Routes in the live route table");
    describe_counter!(
        APIS_SKIPPED_TOTAL,
        Unit::Count,
        "API definitions skipped during registration"
    );
    describe_counter!(
        AUTH_FAILURES_TOTAL,
        Unit::Count,
        "Requests rejected by the credential gate"
    );
}
