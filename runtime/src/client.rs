//! reqwest-backed [`HttpClient`]

use crate::error::ClientError;
use async_lifecycle_core::{FetchRequest, HttpClient, HttpError, HttpFuture, HttpResponse};
use serde_json::Value;
use std::collections::BTreeMap;

/// Environment variable holding the base URL for relative request URLs
pub const BASE_URL_ENV: &str = "ASYNC_LIFECYCLE_BASE_URL";

/// Environment variable overriding the `User-Agent` header
pub const USER_AGENT_ENV: &str = "ASYNC_LIFECYCLE_USER_AGENT";

/// HTTP client configuration
///
/// # Example
///
/// ```
/// use async_lifecycle_runtime::ClientConfig;
///
/// let config = ClientConfig::default().with_base_url("https://api.example.com/v1");
/// assert_eq!(config.base_url.as_deref(), Some("https://api.example.com/v1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL that relative request URLs are resolved against
    pub base_url: Option<String>,
    /// Value of the `User-Agent` header
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration with custom values
    #[must_use]
    pub const fn new(base_url: Option<String>, user_agent: String) -> Self {
        Self {
            base_url,
            user_agent,
        }
    }

    /// Read configuration from the environment
    ///
    /// Uses [`BASE_URL_ENV`] and [`USER_AGENT_ENV`]; unset or empty variables
    /// keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base_url) = non_empty_env(BASE_URL_ENV) {
            config.base_url = Some(base_url);
        }
        if let Some(user_agent) = non_empty_env(USER_AGENT_ENV) {
            config.user_agent = user_agent;
        }
        config
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the `User-Agent` header
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: format!("async-lifecycle/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Production [`HttpClient`] built on `reqwest`
///
/// - Relative URLs are resolved against the configured base URL.
/// - Non-2xx responses become [`HttpError::Status`].
/// - JSON bodies are decoded; other bodies are kept as a JSON string and
///   empty bodies become `null`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ReqwestClient {
    /// Create a client with the default configuration
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client configured from the environment
    ///
    /// # Errors
    ///
    /// See [`ReqwestClient::with_config`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::from_env())
    }

    /// Create a client with explicit configuration
    ///
    /// # Errors
    ///
    /// - [`ClientError::InvalidBaseUrl`] if the base URL is not http(s)
    /// - [`ClientError::Build`] if the underlying client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        if let Some(base_url) = &config.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ClientError::InvalidBaseUrl(base_url.clone()));
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    /// Resolve a request URL against the base URL
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            _ => url.to_string(),
        }
    }

    async fn execute(&self, request: &FetchRequest) -> Result<HttpResponse, HttpError> {
        let url = self.resolve_url(&request.url);
        tracing::debug!(url = %url, params = request.params.len(), "Sending GET request");

        let response = self
            .client
            .get(&url)
            .query(&request.params)
            .send()
            .await
            .map_err(|e| HttpError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(|e| HttpError::Decode {
            status,
            message: e.to_string(),
        })?;

        if !(200..300).contains(&status) {
            return Err(HttpError::Status { status, body });
        }

        Ok(HttpResponse {
            status,
            headers,
            data: decode_body(&body),
        })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, request: &'a FetchRequest) -> HttpFuture<'a> {
        Box::pin(self.execute(request))
    }
}

fn decode_body(body: &str) -> Value {
    if body.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
