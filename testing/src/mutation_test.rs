//! Ergonomic testing utilities for mutation handlers
//!
//! This module provides a fluent API for testing handlers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // MutationTest is the natural name

use async_lifecycle_core::{Dispatch, MutationHandler, MutationPayload, StateChange, StateMap};

/// Type alias for state assertion functions
type StateAssertion = Box<dyn FnOnce(&StateMap)>;

/// Type alias for change assertion functions
type ChangeAssertion = Box<dyn FnOnce(&[StateChange])>;

/// Fluent API for testing mutation handlers with Given-When-Then syntax
///
/// Payloads are applied in order. Change assertions see every write made by
/// all payloads, in order.
///
/// # Example
///
/// ```
/// use async_lifecycle_core::{IdentifierSet, LifecycleMutation, MutationPayload, StateMap};
/// use async_lifecycle_testing::MutationTest;
/// use serde_json::json;
///
/// let set = IdentifierSet::new("GET_DATA");
///
/// MutationTest::new(LifecycleMutation::new(set.clone()))
///     .given_state(StateMap::new().seeded(&set))
///     .when_payload(MutationPayload::success(&set, json!([1, 2]), 200))
///     .then_state(|state| {
///         assert_eq!(state.get("getDataData"), Some(&json!([1, 2])));
///     })
///     .then_changes(|changes| {
///         assert_eq!(changes.len(), 2);
///     })
///     .run();
/// ```
pub struct MutationTest<H>
where
    H: MutationHandler,
{
    handler: H,
    initial_state: Option<StateMap>,
    payloads: Vec<MutationPayload>,
    expected_dispatches: Option<Vec<Dispatch>>,
    state_assertions: Vec<StateAssertion>,
    change_assertions: Vec<ChangeAssertion>,
}

impl<H> MutationTest<H>
where
    H: MutationHandler,
{
    /// Create a new mutation test with the given handler
    #[must_use]
    pub const fn new(handler: H) -> Self {
        Self {
            handler,
            initial_state: None,
            payloads: Vec::new(),
            expected_dispatches: None,
            state_assertions: Vec::new(),
            change_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given); defaults to empty
    #[must_use]
    pub fn given_state(mut self, state: StateMap) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add a payload to apply (When)
    #[must_use]
    pub fn when_payload(mut self, payload: MutationPayload) -> Self {
        self.payloads.push(payload);
        self
    }

    /// Expect these dispatch results, one per payload (Then)
    #[must_use]
    pub fn then_dispatches(mut self, expected: Vec<Dispatch>) -> Self {
        self.expected_dispatches = Some(expected);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&StateMap) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the journaled writes (Then)
    #[must_use]
    pub fn then_changes<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[StateChange]) + 'static,
    {
        self.change_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if no payload was set, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    pub fn run(self) {
        assert!(
            !self.payloads.is_empty(),
            "At least one payload must be set with when_payload()"
        );

        let mut state = self.initial_state.unwrap_or_default();
        state.take_changes();

        let dispatches: Vec<Dispatch> = self
            .payloads
            .iter()
            .map(|payload| self.handler.apply(&mut state, payload))
            .collect();
        let changes = state.take_changes();

        if let Some(expected) = self.expected_dispatches {
            assert_eq!(dispatches, expected, "Unexpected dispatch results");
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.change_assertions {
            assertion(&changes);
        }
    }
}

/// Helper assertions for committed payloads
pub mod assertions {
    use async_lifecycle_core::{LifecycleEvent, MutationPayload};

    /// Assert the sequence of lifecycle events and pending flags
    ///
    /// Each expected entry is the event plus, for pending payloads, the flag
    /// value (`None` for success and failure).
    ///
    /// # Panics
    ///
    /// Panics if the payloads don't match the expected sequence.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_lifecycle(payloads: &[MutationPayload], expected: &[(LifecycleEvent, Option<bool>)]) {
        let actual: Vec<(LifecycleEvent, Option<bool>)> = payloads
            .iter()
            .map(|payload| match payload {
                MutationPayload::Pending { value, .. } => (LifecycleEvent::Pending, Some(*value)),
                other => (other.event(), None),
            })
            .collect();

        assert_eq!(
            actual, expected,
            "Expected lifecycle {expected:?}, but found {actual:?}"
        );
    }

    /// Assert that every payload is tagged with an identifier of one operation
    ///
    /// # Panics
    ///
    /// Panics if a payload's identifier does not start with `base`.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_all_for_operation(payloads: &[MutationPayload], base: &str) {
        for payload in payloads {
            assert!(
                payload.type_id().starts_with(base),
                "Payload {payload:?} is not addressed to {base}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::*;
    use async_lifecycle_core::{IdentifierSet, LifecycleEvent, LifecycleMutation};
    use serde_json::json;

    #[test]
    fn test_full_lifecycle() {
        let set = IdentifierSet::new("GET_DATA");

        MutationTest::new(LifecycleMutation::new(set.clone()))
            .when_payload(MutationPayload::pending(&set, true))
            .when_payload(MutationPayload::success(&set, json!("body"), 200))
            .when_payload(MutationPayload::pending(&set, false))
            .then_dispatches(vec![
                Dispatch::Applied(LifecycleEvent::Pending),
                Dispatch::Applied(LifecycleEvent::Success),
                Dispatch::Applied(LifecycleEvent::Pending),
            ])
            .then_state(move |state| {
                let status = state.status(&set);
                assert!(!status.pending);
                assert_eq!(status.status_code, Some(200));
                assert_eq!(status.data, Some(json!("body")));
            })
            .then_changes(|changes| {
                let keys: Vec<&str> = changes.iter().map(|c| c.key.as_str()).collect();
                assert_eq!(
                    keys,
                    vec!["getDataPending", "getDataStatusCode", "getDataData", "getDataPending"]
                );
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "At least one payload")]
    fn test_run_requires_payload() {
        MutationTest::new(LifecycleMutation::new(IdentifierSet::new("X"))).run();
    }

    #[test]
    fn test_assert_lifecycle() {
        let set = IdentifierSet::new("GET_DATA");
        let payloads = vec![
            MutationPayload::pending(&set, false),
            MutationPayload::failure(&set, Some(500)),
        ];

        assert_lifecycle(
            &payloads,
            &[
                (LifecycleEvent::Pending, Some(false)),
                (LifecycleEvent::Failure, None),
            ],
        );
        assert_all_for_operation(&payloads, "GET_DATA");
    }
}
