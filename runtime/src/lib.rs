//! # Async Lifecycle Runtime
//!
//! Runtime pieces for reporting async operations through a store.
//!
//! ## Core Components
//!
//! - **Store**: owns the state and the mutation registry, applies commits and
//!   broadcasts the resulting state changes
//! - **Runner**: [`fetch_async`] issues one GET request and commits its
//!   pending/success/failure lifecycle
//! - **Client**: [`ReqwestClient`], the production [`HttpClient`](async_lifecycle_core::HttpClient)
//!
//! ## Example
//!
//! ```ignore
//! use async_lifecycle_core::{create_mutation_set, FetchRequest, MutationRegistry};
//! use async_lifecycle_runtime::{fetch_async, FetchCallbacks, ReqwestClient, Store};
//!
//! let posts = create_mutation_set("GET_POSTS");
//! let store = Store::new(MutationRegistry::new().with_sets(&posts));
//! let client = ReqwestClient::from_env()?;
//!
//! fetch_async(
//!     &store,
//!     &client,
//!     &FetchRequest::new("https://example.com/posts").with_param("page", 1),
//!     &posts,
//!     FetchCallbacks::new(),
//! )
//! .await;
//!
//! let status = store.state(|s| s.status(&posts)).await;
//! ```

use std::sync::Arc;
use tokio::sync::RwLock;

/// The reqwest-backed HTTP client and its configuration
pub mod client;

/// The async operation runner
pub mod fetch;

/// Metric descriptions for store and runner instrumentation
pub mod metrics;

pub use client::{ClientConfig, ReqwestClient};
pub use fetch::{FetchCallbacks, FetchRunner, fetch_async};
pub use store::Store;

/// Error types for the runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur while building an HTTP client
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum ClientError {
        /// The configured base URL is not an http(s) URL
        #[error("Invalid base URL: {0}")]
        InvalidBaseUrl(String),

        /// The underlying HTTP client could not be built
        #[error("Failed to build HTTP client: {0}")]
        Build(String),
    }
}

pub use error::ClientError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use async_lifecycle_runtime::StoreConfig;
///
/// let config = StoreConfig::default().with_change_capacity(256);
/// assert_eq!(config.change_capacity, 256);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Number of state changes buffered for slow subscribers
    ///
    /// The store raises a capacity of zero to one when it is built.
    pub change_capacity: usize,
}

impl StoreConfig {
    /// Create a configuration with custom values
    #[must_use]
    pub const fn new(change_capacity: usize) -> Self {
        Self { change_capacity }
    }

    /// Set the change broadcast capacity
    #[must_use]
    pub const fn with_change_capacity(mut self, capacity: usize) -> Self {
        self.change_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            change_capacity: 64,
        }
    }
}

/// Store module - state container and commit dispatch
pub mod store {
    use super::{Arc, RwLock, StoreConfig};
    use async_lifecycle_core::{
        CommitError, CommitFuture, CommitTarget, Dispatch, MutationPayload, MutationRegistry,
        StateChange, StateMap, StateUpdate,
    };
    use std::future::Future;
    use std::pin::Pin;
    use tokio::sync::broadcast;

    /// The Store - state plus the mutation registry that changes it
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock` for concurrent access)
    /// 2. The mutation registry (fixed at construction)
    /// 3. Change notification (a broadcast of every state write)
    ///
    /// Commits are serialized by the state lock: each handler runs to
    /// completion before the next commit is applied. Cloning a Store yields
    /// another handle to the same state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let set = create_mutation_set("GET_DATA");
    /// let store = Store::new(MutationRegistry::new().with_sets(&set));
    ///
    /// store.commit(&set.base, MutationPayload::pending(&set, true)).await?;
    /// assert!(store.state(|s| s.status(&set).pending).await);
    /// ```
    pub struct Store {
        state: Arc<RwLock<StateMap>>,
        registry: Arc<MutationRegistry>,
        changes: broadcast::Sender<StateChange>,
    }

    impl Store {
        /// Create a store with empty state
        #[must_use]
        pub fn new(registry: MutationRegistry) -> Self {
            Self::with_config(StateMap::new(), registry, StoreConfig::default())
        }

        /// Create a store with initial state
        #[must_use]
        pub fn with_state(initial_state: StateMap, registry: MutationRegistry) -> Self {
            Self::with_config(initial_state, registry, StoreConfig::default())
        }

        /// Create a store with initial state and custom configuration
        ///
        /// A `change_capacity` of zero is raised to one.
        #[must_use]
        pub fn with_config(
            mut initial_state: StateMap,
            registry: MutationRegistry,
            config: StoreConfig,
        ) -> Self {
            let (changes, _) = broadcast::channel(config.change_capacity.max(1));
            // Writes made before the store existed have no observers.
            initial_state.take_changes();

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                registry: Arc::new(registry),
                changes,
            }
        }

        /// Commit a payload to the mutation registered under `mutation`
        ///
        /// The handler runs under the state write lock, and every write it
        /// makes is broadcast before the lock is released, so subscribers see
        /// writes in the order the state received them.
        ///
        /// # Errors
        ///
        /// Returns [`CommitError::UnknownMutation`] if no handler is registered
        /// under `mutation`.
        #[tracing::instrument(skip(self, payload), name = "store_commit")]
        pub async fn commit(
            &self,
            mutation: &str,
            payload: MutationPayload,
        ) -> Result<Dispatch, CommitError> {
            let Some(handler) = self.registry.get(mutation) else {
                tracing::warn!("Rejected commit: no mutation registered");
                metrics::counter!("store.commits.unknown").increment(1);
                return Err(CommitError::UnknownMutation(mutation.to_string()));
            };

            metrics::counter!("store.commits.total").increment(1);

            let (dispatch, published) = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");
                let dispatch = handler.apply(&mut *state, &payload);
                (dispatch, self.publish(state.take_changes()))
            };

            match dispatch {
                Dispatch::Applied(event) => {
                    tracing::debug!(%event, changes = published, "Mutation applied");
                },
                Dispatch::Ignored => {
                    tracing::trace!(type_id = %payload.type_id(), "Mutation ignored payload");
                    metrics::counter!("store.commits.ignored").increment(1);
                },
            }

            Ok(dispatch)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let pending = store.state(|s| s.status(&set).pending).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&StateMap) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Change state outside the mutation registry
        ///
        /// Escape hatch for callers that need writes no registered handler
        /// performs. Writes are broadcast exactly like committed ones.
        pub async fn update_state<F>(&self, f: F)
        where
            F: FnOnce(&mut StateMap),
        {
            let published = {
                let mut state = self.state.write().await;
                f(&mut *state);
                self.publish(state.take_changes())
            };

            tracing::debug!(changes = published, "State updated outside registry");
            metrics::counter!("store.state.updates").increment(1);
        }

        /// Subscribe to state changes
        ///
        /// The receiver sees every write made after this call, in order. A
        /// subscriber that falls more than `change_capacity` writes behind
        /// observes a lag error and skips ahead.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
            self.changes.subscribe()
        }

        /// The registry this store dispatches to
        #[must_use]
        pub fn registry(&self) -> &MutationRegistry {
            &self.registry
        }

        /// Broadcast journaled writes, returning how many there were
        ///
        /// Callers hold the state write lock so concurrent commits cannot
        /// interleave their changes.
        fn publish(&self, changes: Vec<StateChange>) -> usize {
            let count = changes.len();
            for change in changes {
                // No receivers is not an error: nobody is watching yet.
                let _ = self.changes.send(change);
            }
            count
        }
    }

    impl Clone for Store {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                registry: Arc::clone(&self.registry),
                changes: self.changes.clone(),
            }
        }
    }

    impl std::fmt::Debug for Store {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Store")
                .field("registry", &self.registry)
                .field("subscribers", &self.changes.receiver_count())
                .finish_non_exhaustive()
        }
    }

    impl CommitTarget for Store {
        fn commit<'a>(&'a self, mutation: &'a str, payload: MutationPayload) -> CommitFuture<'a> {
            Box::pin(Store::commit(self, mutation, payload))
        }

        fn update_state<'a>(
            &'a self,
            update: StateUpdate<'a>,
        ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
            Box::pin(Store::update_state(self, update))
        }
    }
}
