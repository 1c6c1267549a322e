//! The async operation runner
//!
//! [`fetch_async`] drives one GET request through its lifecycle and reports
//! every step as a commit under the identifier set's base identifier:
//!
//! | outcome | commits, in order |
//! |---|---|
//! | any | `pending(true)` before the request is issued |
//! | 2xx | `success(data, status)`, then `pending(false)` |
//! | failure | `pending(false)`, then `failure(status)` |
//!
//! The returned future never fails. Request errors, and commits the store
//! rejects, are logged and otherwise absorbed: callers observe outcomes
//! through store state or the optional callbacks. There are no retries, no
//! timeout and no cancellation.

use async_lifecycle_core::{
    CommitTarget, FetchRequest, HttpClient, HttpResponse, IdentifierSet, MutationPayload,
    StateMap, StateUpdate,
};
use serde_json::{Map, Value};
use std::time::Instant;

/// Transforms the raw response into the data committed on success
pub type ResponseCallback = Box<dyn FnOnce(HttpResponse) -> Value + Send>;

/// Writes state directly, with the success data, before the success commit
pub type MutationCallback = Box<dyn FnOnce(&mut StateMap, &Value) + Send>;

/// Optional hooks for a [`fetch_async`] run
///
/// - `on_response` replaces the committed data with its return value.
/// - `on_mutation` is an explicit escape hatch around the mutation registry:
///   it receives the store state and the success data before the success
///   commit. Its writes are still broadcast as state changes.
///
/// Neither callback runs when the request fails.
#[derive(Default)]
pub struct FetchCallbacks {
    response: Option<ResponseCallback>,
    mutation: Option<MutationCallback>,
}

impl FetchCallbacks {
    /// No callbacks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only a response transform
    #[must_use]
    pub fn response<F>(transform: F) -> Self
    where
        F: FnOnce(HttpResponse) -> Value + Send + 'static,
    {
        Self::new().on_response(transform)
    }

    /// Set the response transform
    #[must_use]
    pub fn on_response<F>(mut self, transform: F) -> Self
    where
        F: FnOnce(HttpResponse) -> Value + Send + 'static,
    {
        self.response = Some(Box::new(transform));
        self
    }

    /// Set the state side-effect hook
    #[must_use]
    pub fn on_mutation<F>(mut self, mutate: F) -> Self
    where
        F: FnOnce(&mut StateMap, &Value) + Send + 'static,
    {
        self.mutation = Some(Box::new(mutate));
        self
    }
}

impl std::fmt::Debug for FetchCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchCallbacks")
            .field("response", &self.response.is_some())
            .field("mutation", &self.mutation.is_some())
            .finish()
    }
}

/// Issue a GET request and commit its lifecycle to `store`
///
/// Without a response transform, the committed data is the raw response as
/// `{ "status", "headers", "data" }`.
#[tracing::instrument(
    skip_all,
    name = "fetch_async",
    fields(mutation = %set.base, url = %request.url)
)]
pub async fn fetch_async<S, C>(
    store: &S,
    client: &C,
    request: &FetchRequest,
    set: &IdentifierSet,
    callbacks: FetchCallbacks,
) where
    S: CommitTarget + ?Sized,
    C: HttpClient + ?Sized,
{
    let FetchCallbacks { response, mutation } = callbacks;

    commit(store, set, MutationPayload::pending(set, true)).await;

    metrics::counter!("fetch.requests.total").increment(1);
    let started = Instant::now();
    let result = client.get(request).await;
    metrics::histogram!("fetch.request.duration_seconds").record(started.elapsed().as_secs_f64());

    match result {
        Ok(raw) => {
            let status = raw.status;
            tracing::debug!(status, "Request succeeded");

            let data = match response {
                Some(transform) => transform(raw),
                None => raw_response(raw),
            };

            if let Some(mutate) = mutation {
                let committed = &data;
                let update: StateUpdate<'_> = Box::new(move |state| mutate(state, committed));
                store.update_state(update).await;
            }

            commit(store, set, MutationPayload::success(set, data, status)).await;
            commit(store, set, MutationPayload::pending(set, false)).await;
        },
        Err(error) => {
            metrics::counter!("fetch.requests.failed").increment(1);
            tracing::warn!(error = %error, "Request failed");

            commit(store, set, MutationPayload::pending(set, false)).await;
            commit(store, set, MutationPayload::failure(set, error.status_code())).await;
        },
    }
}

async fn commit<S>(store: &S, set: &IdentifierSet, payload: MutationPayload)
where
    S: CommitTarget + ?Sized,
{
    if let Err(error) = store.commit(&set.base, payload).await {
        tracing::warn!(error = %error, "Commit rejected by store");
    }
}

fn raw_response(response: HttpResponse) -> Value {
    let headers: Map<String, Value> = response
        .headers
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect();

    let mut raw = Map::new();
    raw.insert("status".to_string(), Value::from(response.status));
    raw.insert("headers".to_string(), Value::Object(headers));
    raw.insert("data".to_string(), response.data);
    Value::Object(raw)
}

/// Runs [`fetch_async`] with an owned HTTP client
///
/// ```ignore
/// let runner = FetchRunner::new(ReqwestClient::from_env()?);
/// runner
///     .fetch_async(&store, &FetchRequest::new("/posts"), &posts, FetchCallbacks::new())
///     .await;
/// ```
#[derive(Debug, Clone)]
pub struct FetchRunner<C> {
    client: C,
}

impl<C> FetchRunner<C>
where
    C: HttpClient,
{
    /// Create a runner around an HTTP client
    #[must_use]
    pub const fn new(client: C) -> Self {
        Self { client }
    }

    /// The HTTP client requests are issued with
    #[must_use]
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Issue a GET request and commit its lifecycle to `store`
    ///
    /// See [`fetch_async`].
    pub async fn fetch_async<S>(
        &self,
        store: &S,
        request: &FetchRequest,
        set: &IdentifierSet,
        callbacks: FetchCallbacks,
    ) where
        S: CommitTarget + ?Sized,
    {
        fetch_async(store, &self.client, request, set, callbacks).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_response_shape() {
        let response = HttpResponse::new(200, json!([1, 2])).with_header("ETag", "abc");

        assert_eq!(
            raw_response(response),
            json!({
                "status": 200,
                "headers": {"etag": "abc"},
                "data": [1, 2],
            })
        );
    }

    #[test]
    fn test_callbacks_debug() {
        let callbacks = FetchCallbacks::response(|r| r.data);

        assert_eq!(
            format!("{callbacks:?}"),
            "FetchCallbacks { response: true, mutation: false }"
        );
    }
}
