//! Lifecycle payloads committed to the store

use crate::identifier::IdentifierSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The three states an async operation reports through commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// The request is in flight (or has just stopped being in flight)
    Pending,
    /// The request completed with a 2xx response
    Success,
    /// The request failed
    Failure,
}

impl std::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// A payload committed under an operation's base identifier
///
/// Each variant carries the identifier (`type_id`) it was created with.
/// Handlers classify that identifier against their own [`IdentifierSet`]
/// and only act when both the identifier and the variant agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MutationPayload {
    /// Loading flag transition
    Pending {
        /// Identifier of the payload (normally `IdentifierSet::pending`)
        #[serde(rename = "type")]
        type_id: String,
        /// `true` when a request starts, `false` when it settles
        value: bool,
    },

    /// Successful completion
    Success {
        /// Identifier of the payload (normally `IdentifierSet::success`)
        #[serde(rename = "type")]
        type_id: String,
        /// Response data, possibly transformed by a response callback
        data: Value,
        /// HTTP status code of the response
        #[serde(rename = "statusCode")]
        status_code: u16,
    },

    /// Failed completion
    Failure {
        /// Identifier of the payload (normally `IdentifierSet::failure`)
        #[serde(rename = "type")]
        type_id: String,
        /// HTTP status code, absent when the request never got a response
        #[serde(rename = "statusCode")]
        status_code: Option<u16>,
    },
}

impl MutationPayload {
    /// Build a pending payload for an identifier set
    #[must_use]
    pub fn pending(set: &IdentifierSet, value: bool) -> Self {
        Self::Pending {
            type_id: set.pending.clone(),
            value,
        }
    }

    /// Build a success payload for an identifier set
    #[must_use]
    pub fn success(set: &IdentifierSet, data: Value, status_code: u16) -> Self {
        Self::Success {
            type_id: set.success.clone(),
            data,
            status_code,
        }
    }

    /// Build a failure payload for an identifier set
    #[must_use]
    pub fn failure(set: &IdentifierSet, status_code: Option<u16>) -> Self {
        Self::Failure {
            type_id: set.failure.clone(),
            status_code,
        }
    }

    /// The identifier this payload is tagged with
    #[must_use]
    pub fn type_id(&self) -> &str {
        match self {
            Self::Pending { type_id, .. }
            | Self::Success { type_id, .. }
            | Self::Failure { type_id, .. } => type_id,
        }
    }

    /// The lifecycle event this payload's shape describes
    #[must_use]
    pub const fn event(&self) -> LifecycleEvent {
        match self {
            Self::Pending { .. } => LifecycleEvent::Pending,
            Self::Success { .. } => LifecycleEvent::Success,
            Self::Failure { .. } => LifecycleEvent::Failure,
        }
    }
}

/// Outcome of handing a payload to a mutation handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The handler recognised the payload and wrote state
    Applied(LifecycleEvent),
    /// The payload's identifier did not belong to the handler; nothing changed
    Ignored,
}

impl Dispatch {
    /// Whether the handler wrote state
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}
