//! Mutation handlers
//!
//! A mutation handler is registered under an operation's base identifier and
//! applies every lifecycle payload for that operation to the store state.

use crate::identifier::IdentifierSet;
use crate::payload::{Dispatch, LifecycleEvent, MutationPayload};
use crate::state::StateMap;
use serde_json::Value;

/// Applies committed payloads to store state
///
/// Implemented for [`LifecycleMutation`] and for any
/// `Fn(&mut StateMap, &MutationPayload) -> Dispatch` closure, so custom
/// handlers can sit in the same registry as the generated ones.
pub trait MutationHandler: Send + Sync {
    /// Apply a payload to state
    ///
    /// All writes must go through [`StateMap::set`].
    fn apply(&self, state: &mut StateMap, payload: &MutationPayload) -> Dispatch;
}

impl<F> MutationHandler for F
where
    F: Fn(&mut StateMap, &MutationPayload) -> Dispatch + Send + Sync,
{
    fn apply(&self, state: &mut StateMap, payload: &MutationPayload) -> Dispatch {
        self(state, payload)
    }
}

/// The generated handler for one identifier set
///
/// | payload | writes |
/// |---|---|
/// | pending | `loading_key = value` |
/// | success | `status_code_key = status_code`, then `state_key = data` |
/// | failure | `status_code_key = status_code` (`null` when absent) |
///
/// A payload whose identifier belongs to another set, or whose identifier
/// and variant disagree, is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleMutation {
    set: IdentifierSet,
}

impl LifecycleMutation {
    /// Create the handler for an identifier set
    #[must_use]
    pub const fn new(set: IdentifierSet) -> Self {
        Self { set }
    }

    /// The identifier set this handler serves
    #[must_use]
    pub const fn identifier_set(&self) -> &IdentifierSet {
        &self.set
    }
}

impl MutationHandler for LifecycleMutation {
    fn apply(&self, state: &mut StateMap, payload: &MutationPayload) -> Dispatch {
        let set = &self.set;

        match (set.event_for(payload.type_id()), payload) {
            (Some(LifecycleEvent::Pending), MutationPayload::Pending { value, .. }) => {
                state.set(set.loading_key.clone(), *value);
                Dispatch::Applied(LifecycleEvent::Pending)
            },
            (
                Some(LifecycleEvent::Success),
                MutationPayload::Success {
                    data, status_code, ..
                },
            ) => {
                state.set(set.status_code_key.clone(), *status_code);
                state.set(set.state_key.clone(), data.clone());
                Dispatch::Applied(LifecycleEvent::Success)
            },
            (Some(LifecycleEvent::Failure), MutationPayload::Failure { status_code, .. }) => {
                let status = status_code.map_or(Value::Null, Value::from);
                state.set(set.status_code_key.clone(), status);
                Dispatch::Applied(LifecycleEvent::Failure)
            },
            _ => {
                tracing::trace!(
                    mutation = %set.base,
                    type_id = %payload.type_id(),
                    kind = %payload.event(),
                    "Ignoring payload not addressed to this operation"
                );
                Dispatch::Ignored
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handler() -> LifecycleMutation {
        LifecycleMutation::new(IdentifierSet::new("GET_DATA"))
    }

    #[test]
    fn test_pending_sets_loading_key() {
        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new();

        let dispatch = handler().apply(&mut state, &MutationPayload::pending(&set, true));

        assert_eq!(dispatch, Dispatch::Applied(LifecycleEvent::Pending));
        assert_eq!(state.get("getDataPending"), Some(&json!(true)));
    }

    #[test]
    fn test_success_writes_status_before_data() {
        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new();

        handler().apply(&mut state, &MutationPayload::success(&set, json!({"ok": true}), 200));

        let changes = state.take_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].key, "getDataStatusCode");
        assert_eq!(changes[0].value, json!(200));
        assert_eq!(changes[1].key, "getDataData");
        assert_eq!(changes[1].value, json!({"ok": true}));
    }

    #[test]
    fn test_failure_writes_status_code() {
        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new();

        handler().apply(&mut state, &MutationPayload::failure(&set, Some(404)));
        assert_eq!(state.get("getDataStatusCode"), Some(&json!(404)));

        handler().apply(&mut state, &MutationPayload::failure(&set, None));
        assert_eq!(state.get("getDataStatusCode"), Some(&Value::Null));
    }

    #[test]
    fn test_foreign_payload_is_ignored() {
        let other = IdentifierSet::new("GET_POST");
        let mut state = StateMap::new();

        let dispatch = handler().apply(&mut state, &MutationPayload::pending(&other, true));

        assert_eq!(dispatch, Dispatch::Ignored);
        assert!(state.is_empty());
    }

    #[test]
    fn test_mismatched_variant_is_ignored() {
        let mut state = StateMap::new();
        let payload = MutationPayload::Pending {
            type_id: "GET_DATA_SUCCESS".to_string(),
            value: true,
        };

        assert_eq!(handler().apply(&mut state, &payload), Dispatch::Ignored);
        assert!(!state.has_pending_changes());
    }

    #[test]
    fn test_closure_handler() {
        let counter = |state: &mut StateMap, _payload: &MutationPayload| {
            state.set("calls", 1);
            Dispatch::Ignored
        };
        let set = IdentifierSet::new("X");
        let mut state = StateMap::new();

        counter.apply(&mut state, &MutationPayload::pending(&set, true));
        assert_eq!(state.get("calls"), Some(&json!(1)));
    }
}
