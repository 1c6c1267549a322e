//! Metric descriptions for store and runner instrumentation.
//!
//! The store and the runner record through the `metrics` facade. Nothing is
//! exported unless the application installs a recorder; call
//! [`describe_metrics`] once after installing it to attach descriptions.
//!
//! | metric | kind | recorded by |
//! |---|---|---|
//! | `store.commits.total` | counter | every commit that reaches a handler |
//! | `store.commits.ignored` | counter | commits whose payload the handler ignored |
//! | `store.commits.unknown` | counter | commits to an unregistered mutation |
//! | `store.state.updates` | counter | direct state updates |
//! | `fetch.requests.total` | counter | every GET issued by the runner |
//! | `fetch.requests.failed` | counter | GETs that ended in a failure commit |
//! | `fetch.request.duration_seconds` | histogram | GET latency |

use metrics::{Unit, describe_counter, describe_histogram};

// Re-export metrics macros for use in applications
pub use metrics::{counter, histogram};

/// Register descriptions for every metric the runtime records
pub fn describe_metrics() {
    describe_counter!(
        "store.commits.total",
        Unit::Count,
        "Commits dispatched to a registered mutation handler"
    );
    describe_counter!(
        "store.commits.ignored",
        Unit::Count,
        "Commits whose payload did not belong to the handler"
    );
    describe_counter!(
        "store.commits.unknown",
        Unit::Count,
        "Commits rejected because no mutation was registered"
    );
    describe_counter!(
        "store.state.updates",
        Unit::Count,
        "State updates made outside the mutation registry"
    );
    describe_counter!(
        "fetch.requests.total",
        Unit::Count,
        "GET requests issued by the async operation runner"
    );
    describe_counter!(
        "fetch.requests.failed",
        Unit::Count,
        "GET requests that ended in a failure commit"
    );
    describe_histogram!(
        "fetch.request.duration_seconds",
        Unit::Seconds,
        "GET request latency"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_without_recorder() {
        // With no recorder installed, describing is a no-op.
        describe_metrics();
        describe_metrics();
    }
}
