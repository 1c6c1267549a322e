//! String-keyed store state with change journaling
//!
//! The store's state shape is not declared up front: it is whatever keys the
//! registered identifier sets write. [`StateMap`] holds those keys and
//! journals every write so the owning store can notify observers after a
//! commit. There is no way to change a value without going through
//! [`StateMap::set`], so no write can bypass change tracking.

use crate::identifier::IdentifierSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single observed state write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// The key that was written
    pub key: String,
    /// The value written
    pub value: Value,
}

/// Store state keyed by the state keys of registered identifier sets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateMap {
    values: BTreeMap<String, Value>,
    journal: Vec<StateChange>,
}

impl StateMap {
    /// Create an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the initial keys for an identifier set
    ///
    /// Sets the loading flag to `false` and the status code and data keys to
    /// `null`, so observers can read every key before the first request.
    /// Seeding is not journaled.
    #[must_use]
    pub fn seeded(mut self, set: &IdentifierSet) -> Self {
        self.values.insert(set.loading_key.clone(), Value::Bool(false));
        self.values.insert(set.status_code_key.clone(), Value::Null);
        self.values.insert(set.state_key.clone(), Value::Null);
        self
    }

    /// Write a value and journal the change
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        self.journal.push(StateChange {
            key: key.clone(),
            value: value.clone(),
        });
        self.values.insert(key, value);
    }

    /// Read a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether a key has ever been written or seeded
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Take the writes journaled since the last call
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.journal)
    }

    /// Whether writes are waiting to be taken
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.journal.is_empty()
    }

    /// Typed view of one operation's three keys
    #[must_use]
    pub fn status(&self, set: &IdentifierSet) -> OperationStatus {
        OperationStatus {
            pending: self
                .get(&set.loading_key)
                .and_then(Value::as_bool)
                .unwrap_or(false),
            status_code: self
                .get(&set.status_code_key)
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
            data: self
                .get(&set.state_key)
                .filter(|value| !value.is_null())
                .cloned(),
        }
    }
}

/// Snapshot of one async operation as seen through the store state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStatus {
    /// Whether a request is in flight
    pub pending: bool,
    /// Status code of the last settled request, if it had one
    pub status_code: Option<u16>,
    /// Data of the last successful request
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_journals_changes() {
        let mut state = StateMap::new();
        state.set("getDataPending", true);
        state.set("getDataData", json!({"id": 7}));

        assert_eq!(state.get("getDataPending"), Some(&json!(true)));
        assert!(state.has_pending_changes());

        let changes = state.take_changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].key, "getDataPending");
        assert_eq!(changes[1].value, json!({"id": 7}));
        assert!(!state.has_pending_changes());
    }

    #[test]
    fn test_seeded_is_not_journaled() {
        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new().seeded(&set);

        assert_eq!(state.len(), 3);
        assert!(state.take_changes().is_empty());
        assert_eq!(state.status(&set), OperationStatus::default());
    }

    #[test]
    fn test_status_view() {
        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new();
        state.set(set.loading_key.clone(), true);
        state.set(set.status_code_key.clone(), 201);
        state.set(set.state_key.clone(), json!(["a"]));

        let status = state.status(&set);
        assert!(status.pending);
        assert_eq!(status.status_code, Some(201));
        assert_eq!(status.data, Some(json!(["a"])));
    }

    #[test]
    fn test_keys_are_ordered() {
        let mut state = StateMap::new();
        state.set("b", 1);
        state.set("a", 2);

        assert_eq!(state.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(state.contains_key("a"));
        assert!(!state.is_empty());
    }
}
