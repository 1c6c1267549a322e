//! # Async Lifecycle Core
//!
//! Core types for reporting async operations through a mutation-based store.
//!
//! An async operation (say, `GET_DATA`) moves through three lifecycle events:
//! pending, success and failure. This crate provides the conventions that tie
//! those events to store state:
//!
//! - **Identifier set**: the identifiers and state keys derived from the operation name
//! - **Payload**: the closed set of lifecycle payloads committed to the store
//! - **Handler**: applies payloads to state under the identifier set's keys
//! - **Registry**: maps base identifiers to handlers
//! - **Boundaries**: [`CommitTarget`] (the store) and [`HttpClient`] (the network)
//!
//! This crate does no I/O. The runtime crate provides the store and the
//! runner that drives a request through its lifecycle.
//!
//! ## Example
//!
//! ```
//! use async_lifecycle_core::*;
//! use serde_json::json;
//!
//! let set = create_mutation_set("GET_DATA");
//! let mut registry = MutationRegistry::new();
//! register_mutations(&mut registry, &set);
//!
//! let mut state = StateMap::new();
//! let handler = registry.get(&set.base).unwrap();
//! handler.apply(&mut state, &MutationPayload::success(&set, json!({"id": 1}), 200));
//!
//! assert_eq!(state.status(&set).status_code, Some(200));
//! ```

/// Store boundary: committing payloads
pub mod commit;

/// Mutation handlers
pub mod handler;

/// HTTP boundary: GET requests and their failures
pub mod http;

/// Identifier sets derived from operation names
pub mod identifier;

/// Lifecycle payloads
pub mod payload;

/// The mutation registry
pub mod registry;

/// Store state and change journaling
pub mod state;

pub use commit::{CommitError, CommitFuture, CommitTarget, StateUpdate};
pub use handler::{LifecycleMutation, MutationHandler};
pub use http::{FetchRequest, HttpClient, HttpError, HttpFuture, HttpResponse};
pub use identifier::{IdentifierSet, camel_case, create_mutation_set};
pub use payload::{Dispatch, LifecycleEvent, MutationPayload};
pub use registry::{IntoIdentifierSets, MutationRegistry, register_mutations};
pub use state::{OperationStatus, StateChange, StateMap};
