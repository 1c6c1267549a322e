//! # Async Lifecycle Testing
//!
//! Testing utilities and helpers for async operation lifecycles.
//!
//! This crate provides:
//! - [`RecordingStore`]: a commit target that records every commit in order
//! - [`MockHttpClient`]: canned HTTP results without a network
//! - [`MutationTest`]: Given-When-Then tests for mutation handlers
//! - Assertion helpers for committed payload sequences
//!
//! ## Example
//!
//! ```ignore
//! use async_lifecycle_testing::{MockHttpClient, RecordingStore};
//! use async_lifecycle_runtime::{fetch_async, FetchCallbacks};
//!
//! #[tokio::test]
//! async fn test_fetch_reports_success() {
//!     let set = create_mutation_set("GET_DATA");
//!     let store = RecordingStore::new();
//!     let client = MockHttpClient::responding(HttpResponse::new(200, json!([])));
//!
//!     fetch_async(&store, &client, &FetchRequest::new("/data"), &set, FetchCallbacks::new()).await;
//!
//!     assert_eq!(store.commits().len(), 3);
//! }
//! ```

/// In-memory store and HTTP doubles
pub mod mocks;

/// Given-When-Then tests for mutation handlers
pub mod mutation_test;

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Output goes through the test harness writer so it is only shown for
    /// failing tests. Honors `RUST_LOG`; defaults to `debug` for this
    /// workspace's crates. Safe to call from every test.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("async_lifecycle_core=debug,async_lifecycle_runtime=debug")
        });

        // A second installation fails; the first one stays in place.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::init_tracing;
pub use mocks::{MockHttpClient, RecordingStore, StoreCall};
pub use mutation_test::MutationTest;
