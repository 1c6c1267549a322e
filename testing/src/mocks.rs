//! In-memory test doubles for the store and HTTP boundaries
//!
//! - [`RecordingStore`]: a [`CommitTarget`] that records every call in order
//! - [`MockHttpClient`]: an [`HttpClient`] answering from a queue of canned results

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned locks

use async_lifecycle_core::{
    CommitError, CommitFuture, CommitTarget, Dispatch, FetchRequest, HttpClient, HttpError,
    HttpFuture, HttpResponse, LifecycleEvent, MutationPayload, MutationRegistry, StateMap,
    StateUpdate,
};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// One call observed by a [`RecordingStore`]
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    /// A payload committed under a base identifier
    Commit {
        /// The base identifier committed to
        mutation: String,
        /// The committed payload
        payload: MutationPayload,
    },
    /// A direct state update
    UpdateState,
}

/// A [`CommitTarget`] that records every call
///
/// Built with [`RecordingStore::new`] it only records, answering every commit
/// with [`Dispatch::Ignored`]. Built with [`RecordingStore::with_registry`] it
/// also applies commits to an in-memory [`StateMap`], like the runtime store.
///
/// # Example
///
/// ```
/// use async_lifecycle_core::{CommitTarget, IdentifierSet, MutationPayload};
/// use async_lifecycle_testing::RecordingStore;
///
/// # async fn example() {
/// let set = IdentifierSet::new("GET_DATA");
/// let store = RecordingStore::new();
///
/// store.commit(&set.base, MutationPayload::pending(&set, true)).await.unwrap();
/// assert_eq!(store.commits().len(), 1);
/// # }
/// ```
#[derive(Clone, Default)]
pub struct RecordingStore {
    registry: Option<Arc<MutationRegistry>>,
    state: Arc<Mutex<StateMap>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
}

impl RecordingStore {
    /// Create a store that records without applying
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that records and applies commits through `registry`
    #[must_use]
    pub fn with_registry(registry: MutationRegistry) -> Self {
        Self {
            registry: Some(Arc::new(registry)),
            ..Self::default()
        }
    }

    /// Every call, in order
    #[must_use]
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Every commit as `(mutation, payload)`, in order
    #[must_use]
    pub fn commits(&self) -> Vec<(String, MutationPayload)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Commit { mutation, payload } => {
                    Some((mutation.clone(), payload.clone()))
                },
                StoreCall::UpdateState => None,
            })
            .collect()
    }

    /// Every committed payload, in order
    #[must_use]
    pub fn payloads(&self) -> Vec<MutationPayload> {
        self.commits().into_iter().map(|(_, payload)| payload).collect()
    }

    /// The lifecycle event of every committed payload, in order
    #[must_use]
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.payloads().iter().map(MutationPayload::event).collect()
    }

    /// Number of calls recorded so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Whether nothing has been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().unwrap().is_empty()
    }

    /// A copy of the current state
    #[must_use]
    pub fn state(&self) -> StateMap {
        self.state.lock().unwrap().clone()
    }

    /// Forget recorded calls (for test isolation)
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record_commit(&self, mutation: &str, payload: &MutationPayload) -> Result<Dispatch, CommitError> {
        self.calls.lock().unwrap().push(StoreCall::Commit {
            mutation: mutation.to_string(),
            payload: payload.clone(),
        });

        let Some(registry) = &self.registry else {
            return Ok(Dispatch::Ignored);
        };
        let handler = registry
            .get(mutation)
            .ok_or_else(|| CommitError::UnknownMutation(mutation.to_string()))?;

        let mut state = self.state.lock().unwrap();
        let dispatch = handler.apply(&mut *state, payload);
        state.take_changes();
        Ok(dispatch)
    }
}

impl std::fmt::Debug for RecordingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingStore")
            .field("registry", &self.registry)
            .field("calls", &self.len())
            .finish_non_exhaustive()
    }
}

impl CommitTarget for RecordingStore {
    fn commit<'a>(&'a self, mutation: &'a str, payload: MutationPayload) -> CommitFuture<'a> {
        let result = self.record_commit(mutation, &payload);
        Box::pin(async move { result })
    }

    fn update_state<'a>(
        &'a self,
        update: StateUpdate<'a>,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.calls.lock().unwrap().push(StoreCall::UpdateState);
        {
            let mut state = self.state.lock().unwrap();
            update(&mut *state);
            state.take_changes();
        }
        Box::pin(async {})
    }
}

/// An [`HttpClient`] answering from a queue of canned results
///
/// Requests are recorded. When the queue is empty the client fails with a
/// transport error, like a server that is not there.
///
/// # Example
///
/// ```
/// use async_lifecycle_core::{HttpError, HttpResponse};
/// use async_lifecycle_testing::MockHttpClient;
/// use serde_json::json;
///
/// let client = MockHttpClient::responding(HttpResponse::new(200, json!({"id": 1})))
///     .then_fail(HttpError::Transport("connection reset".to_string()));
/// assert_eq!(client.remaining(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, HttpError>>>>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockHttpClient {
    /// Create a client with no queued results
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client whose first request succeeds with `response`
    #[must_use]
    pub fn responding(response: HttpResponse) -> Self {
        Self::new().then_respond(response)
    }

    /// Create a client whose first request fails with `error`
    #[must_use]
    pub fn failing(error: HttpError) -> Self {
        Self::new().then_fail(error)
    }

    /// Queue a successful response
    #[must_use]
    pub fn then_respond(self, response: HttpResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn then_fail(self, error: HttpError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Requests received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of queued results not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    fn next_result(&self, request: &FetchRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::Transport("no mock response queued".to_string())))
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("remaining", &self.remaining())
            .field("requests", &self.requests.lock().unwrap().len())
            .finish()
    }
}

impl HttpClient for MockHttpClient {
    fn get<'a>(&'a self, request: &'a FetchRequest) -> HttpFuture<'a> {
        let result = self.next_result(request);
        Box::pin(async move { result })
    }
}
