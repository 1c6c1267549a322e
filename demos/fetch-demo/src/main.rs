//! Fetch demo binary
//!
//! Registers one async operation, fetches a URL through the runner and prints
//! every state change the store broadcasts.
//!
//! ```text
//! FETCH_DEMO_URL=https://jsonplaceholder.typicode.com/todos/1 cargo run -p fetch-demo
//! ```

use async_lifecycle_core::{FetchRequest, MutationRegistry, StateMap, create_mutation_set};
use async_lifecycle_runtime::{FetchCallbacks, FetchRunner, ReqwestClient, Store, metrics};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_demo=debug,async_lifecycle_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    metrics::describe_metrics();

    let url = std::env::var("FETCH_DEMO_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());

    println!("=== Fetch Demo: async operation lifecycle ===\n");

    let todo = create_mutation_set("GET_TODO");
    println!("Identifier set: {}", serde_json::to_string_pretty(&todo)?);

    let store = Store::with_state(
        StateMap::new().seeded(&todo),
        MutationRegistry::new().with_sets(&todo),
    );
    let mut changes = store.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(change) = changes.recv().await {
            println!("  state[{}] = {}", change.key, change.value);
        }
    });

    let runner = FetchRunner::new(ReqwestClient::from_env()?);

    println!("\n>>> Fetching {url}");
    runner
        .fetch_async(
            &store,
            &FetchRequest::new(url),
            &todo,
            FetchCallbacks::new()
                .on_response(|response| response.data)
                .on_mutation(|state, data| {
                    state.set("todoFields", data.as_object().map_or(0, serde_json::Map::len));
                }),
        )
        .await;

    let status = store.state(|s| s.status(&todo)).await;
    tracing::info!(
        pending = status.pending,
        status_code = ?status.status_code,
        "Fetch settled"
    );

    // Dropping the last store handle closes the change channel.
    drop(store);
    printer.await?;

    println!("\nFinal status: {}", serde_json::to_string_pretty(&status)?);
    println!("\n=== Demo Complete ===");
    Ok(())
}
