//! The store boundary consumed by the async operation runner

use crate::payload::{Dispatch, MutationPayload};
use crate::state::StateMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors returned when committing a payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// No handler is registered under the base identifier
    #[error("Unknown mutation: {0}")]
    UnknownMutation(String),
}

/// Boxed future returned by [`CommitTarget::commit`]
pub type CommitFuture<'a> = Pin<Box<dyn Future<Output = Result<Dispatch, CommitError>> + Send + 'a>>;

/// One-shot state update passed to [`CommitTarget::update_state`]
pub type StateUpdate<'a> = Box<dyn FnOnce(&mut StateMap) + Send + 'a>;

/// Something payloads can be committed to
///
/// Implemented by the runtime `Store` and by recording test doubles.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures rather than using `async fn` so the trait
/// can be used as `&dyn CommitTarget` / `Arc<dyn CommitTarget>`.
pub trait CommitTarget: Send + Sync {
    /// Run the handler registered under `mutation` with `payload`
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::UnknownMutation`] if nothing is registered under
    /// `mutation`.
    fn commit<'a>(&'a self, mutation: &'a str, payload: MutationPayload) -> CommitFuture<'a>;

    /// Run `update` against the state outside the mutation registry
    ///
    /// This is the extension point behind the runner's mutation callback.
    /// Writes made here are still journaled and observed like committed ones.
    fn update_state<'a>(&'a self, update: StateUpdate<'a>) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}
