//! The HTTP boundary consumed by the async operation runner
//!
//! Only GET is needed: the runner issues one request per invocation and
//! reports the outcome through commits. Request execution, connection
//! handling and body decoding belong to the [`HttpClient`] implementation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// A GET request: URL plus query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Absolute URL, or a path resolved by the client against its base URL
    pub url: String,
    /// Query parameters, sent in order
    pub params: Vec<(String, String)>,
}

impl FetchRequest {
    /// Create a request without parameters
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }
}

/// A 2xx response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lower-cased names)
    pub headers: BTreeMap<String, String>,
    /// Decoded body
    pub data: Value,
}

impl HttpResponse {
    /// Create a response with no headers
    #[must_use]
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            data,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }
}

/// A failed request
///
/// Network errors, non-2xx responses and undecodable bodies all count as one
/// failure category; the status code is kept when there is one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// The server answered with a non-2xx status
    #[error("Request failed with status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response body could not be read
    #[error("Failed to decode response (status {status}): {message}")]
    Decode {
        /// HTTP status code of the undecodable response
        status: u16,
        /// Decoder error message
        message: String,
    },
}

impl HttpError {
    /// The response status, when the request got that far
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

/// Boxed future returned by [`HttpClient::get`]
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Executes GET requests
pub trait HttpClient: Send + Sync {
    /// Issue a GET request
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] for transport failures, non-2xx responses and
    /// undecodable bodies.
    fn get<'a>(&'a self, request: &'a FetchRequest) -> HttpFuture<'a>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = FetchRequest::new("/posts")
            .with_param("userId", 1)
            .with_param("sort", "desc");

        assert_eq!(request.url, "/posts");
        assert_eq!(
            request.params,
            vec![
                ("userId".to_string(), "1".to_string()),
                ("sort".to_string(), "desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_code_extraction() {
        let status = HttpError::Status {
            status: 503,
            body: String::new(),
        };
        let decode = HttpError::Decode {
            status: 200,
            message: "eof".to_string(),
        };
        let transport = HttpError::Transport("connection refused".to_string());

        assert_eq!(status.status_code(), Some(503));
        assert_eq!(decode.status_code(), Some(200));
        assert_eq!(transport.status_code(), None);
    }

    #[test]
    fn test_response_serializes_raw_shape() {
        let response = HttpResponse::new(200, json!({"id": 1})).with_header("Content-Type", "application/json");

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": 200,
                "headers": {"content-type": "application/json"},
                "data": {"id": 1},
            })
        );
    }
}
