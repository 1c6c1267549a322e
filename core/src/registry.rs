//! The mutation registry
//!
//! Maps base identifiers to [`MutationHandler`]s. A registry is built during
//! store setup and handed to the store by value; entries are added and
//! overwritten, never removed.

use crate::handler::{LifecycleMutation, MutationHandler};
use crate::identifier::IdentifierSet;
use std::collections::HashMap;
use std::sync::Arc;

/// Base identifier to handler mapping
#[derive(Clone, Default)]
pub struct MutationRegistry {
    handlers: HashMap<String, Arc<dyn MutationHandler>>,
}

impl MutationRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register generated handlers and return the registry
    ///
    /// ```
    /// use async_lifecycle_core::{IdentifierSet, MutationRegistry};
    ///
    /// let registry = MutationRegistry::new()
    ///     .with_sets([IdentifierSet::new("GET_DATA"), IdentifierSet::new("GET_POST")]);
    /// assert_eq!(registry.len(), 2);
    /// ```
    #[must_use]
    pub fn with_sets(mut self, sets: impl IntoIdentifierSets) -> Self {
        register_mutations(&mut self, sets);
        self
    }

    /// Install a handler under a base identifier
    ///
    /// Returns the handler previously installed under that identifier, if any.
    /// The last registration wins.
    pub fn insert(
        &mut self,
        base: impl Into<String>,
        handler: impl MutationHandler + 'static,
    ) -> Option<Arc<dyn MutationHandler>> {
        self.handlers.insert(base.into(), Arc::new(handler))
    }

    /// Look up the handler for a base identifier
    #[must_use]
    pub fn get(&self, base: &str) -> Option<&Arc<dyn MutationHandler>> {
        self.handlers.get(base)
    }

    /// Whether a handler is installed under a base identifier
    #[must_use]
    pub fn contains(&self, base: &str) -> bool {
        self.handlers.contains_key(base)
    }

    /// Number of installed handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is installed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Installed base identifiers, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for MutationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("MutationRegistry")
            .field("mutations", &keys)
            .finish()
    }
}

/// One identifier set or an ordered sequence of them
///
/// Lets [`register_mutations`] accept a single set as well as a list; a
/// single set is treated as a one-element sequence.
pub trait IntoIdentifierSets {
    /// Normalize into an ordered list of identifier sets
    fn into_identifier_sets(self) -> Vec<IdentifierSet>;
}

impl IntoIdentifierSets for IdentifierSet {
    fn into_identifier_sets(self) -> Vec<IdentifierSet> {
        vec![self]
    }
}

impl IntoIdentifierSets for &IdentifierSet {
    fn into_identifier_sets(self) -> Vec<IdentifierSet> {
        vec![self.clone()]
    }
}

impl IntoIdentifierSets for Vec<IdentifierSet> {
    fn into_identifier_sets(self) -> Vec<IdentifierSet> {
        self
    }
}

impl IntoIdentifierSets for &[IdentifierSet] {
    fn into_identifier_sets(self) -> Vec<IdentifierSet> {
        self.to_vec()
    }
}

impl<const N: usize> IntoIdentifierSets for [IdentifierSet; N] {
    fn into_identifier_sets(self) -> Vec<IdentifierSet> {
        self.into()
    }
}

/// Install a [`LifecycleMutation`] for each identifier set
///
/// Sets are processed in order, each under its `base` identifier. A set whose
/// base is already registered replaces the earlier handler.
///
/// ```
/// use async_lifecycle_core::{register_mutations, IdentifierSet, MutationRegistry};
///
/// let mut registry = MutationRegistry::new();
/// register_mutations(&mut registry, IdentifierSet::new("GET_DATA"));
/// assert!(registry.contains("GET_DATA"));
/// ```
pub fn register_mutations(registry: &mut MutationRegistry, sets: impl IntoIdentifierSets) {
    for set in sets.into_identifier_sets() {
        tracing::debug!(mutation = %set.base, "Registering lifecycle mutation");
        let base = set.base.clone();
        if registry.insert(base, LifecycleMutation::new(set)).is_some() {
            tracing::debug!("Replaced previously registered handler");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::payload::{Dispatch, LifecycleEvent, MutationPayload};
    use crate::state::StateMap;
    use serde_json::json;

    #[test]
    fn test_register_single_set() {
        let mut registry = MutationRegistry::new();
        let set = IdentifierSet::new("GET_DATA");

        register_mutations(&mut registry, &set);

        assert_eq!(registry.len(), 1);
        let handler = registry.get("GET_DATA").unwrap();
        let mut state = StateMap::new();
        assert_eq!(
            handler.apply(&mut state, &MutationPayload::pending(&set, true)),
            Dispatch::Applied(LifecycleEvent::Pending)
        );
    }

    #[test]
    fn test_register_sequence() {
        let mut registry = MutationRegistry::new();
        let data = IdentifierSet::new("GET_DATA");
        let post = IdentifierSet::new("GET_POST");

        register_mutations(&mut registry, vec![data.clone(), post.clone()]);

        assert_eq!(registry.len(), 2);
        let mut state = StateMap::new();
        registry
            .get("GET_DATA")
            .unwrap()
            .apply(&mut state, &MutationPayload::success(&data, json!(1), 200));
        registry
            .get("GET_POST")
            .unwrap()
            .apply(&mut state, &MutationPayload::success(&post, json!(2), 200));
        assert_eq!(state.get("getDataData"), Some(&json!(1)));
        assert_eq!(state.get("getPostData"), Some(&json!(2)));
    }

    #[test]
    fn test_slice_and_array_inputs() {
        let sets = [IdentifierSet::new("A"), IdentifierSet::new("B")];
        let mut from_slice = MutationRegistry::new();
        register_mutations(&mut from_slice, &sets[..]);

        let from_array = MutationRegistry::new().with_sets(sets);

        assert_eq!(from_slice.len(), 2);
        assert_eq!(from_array.len(), 2);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = MutationRegistry::new();
        register_mutations(&mut registry, IdentifierSet::new("GET_DATA"));
        let previous = registry.insert("GET_DATA", |state: &mut StateMap, _: &MutationPayload| {
            state.set("overridden", true);
            Dispatch::Ignored
        });
        assert!(previous.is_some());

        let set = IdentifierSet::new("GET_DATA");
        let mut state = StateMap::new();
        registry
            .get("GET_DATA")
            .unwrap()
            .apply(&mut state, &MutationPayload::pending(&set, true));

        assert_eq!(registry.len(), 1);
        assert_eq!(state.get("overridden"), Some(&json!(true)));
        assert!(!state.contains_key("getDataPending"));
    }

    #[test]
    fn test_debug_lists_sorted_keys() {
        let registry = MutationRegistry::new().with_sets(vec![
            IdentifierSet::new("B"),
            IdentifierSet::new("A"),
        ]);

        assert_eq!(
            format!("{registry:?}"),
            r#"MutationRegistry { mutations: ["A", "B"] }"#
        );
    }
}
