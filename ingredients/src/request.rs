//! Reducer for the request lifecycle: in flight, idle, or failed.

use crate::actions::RequestAction;
use crate::types::RequestState;
use pantry_core::{effect::Effect, reducer::Reducer, SmallVec};

/// Tracks whether a request is in flight and the last error
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestStatusReducer;

impl RequestStatusReducer {
    /// Creates a new `RequestStatusReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for RequestStatusReducer {
    type State = RequestState;
    type Action = RequestAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            RequestAction::Begin => {
                state.pending = true;
                state.error = None;
            },
            RequestAction::Complete => {
                state.pending = false;
            },
            RequestAction::Fail { message } => {
                state.pending = false;
                state.error = Some(message);
            },
            RequestAction::ClearError => {
                state.error = None;
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_testing::{assertions, ReducerTest};
    use proptest::prelude::*;

    fn failed(message: &str) -> RequestState {
        RequestState {
            pending: false,
            error: Some(message.to_string()),
        }
    }

    #[test]
    fn test_begin_from_initial() {
        ReducerTest::new(RequestStatusReducer::new())
            .with_env(())
            .given_state(RequestState::default())
            .when_action(RequestAction::Begin)
            .then_state(|state| {
                assert!(state.pending);
                assert!(state.error.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_complete_preserves_error() {
        ReducerTest::new(RequestStatusReducer::new())
            .with_env(())
            .given_state(RequestState {
                pending: true,
                error: Some("net fail".to_string()),
            })
            .when_action(RequestAction::Complete)
            .then_state(|state| {
                assert_eq!(state, &failed("net fail"));
            })
            .run();
    }

    #[test]
    fn test_send_then_fail_then_clear() {
        ReducerTest::new(RequestStatusReducer::new())
            .with_env(())
            .given_state(RequestState::default())
            .when_actions([
                RequestAction::Begin,
                RequestAction::Fail {
                    message: "offline".to_string(),
                },
                RequestAction::ClearError,
            ])
            .then_state(|state| {
                assert_eq!(state, &RequestState::default());
            })
            .run();
    }

    fn arb_state() -> impl Strategy<Value = RequestState> {
        (any::<bool>(), proptest::option::of("[a-z ]{0,12}"))
            .prop_map(|(pending, error)| RequestState { pending, error })
    }

    proptest! {
        #[test]
        fn prop_begin_always_pending_without_error(state in arb_state()) {
            let mut state = state;
            let _ = RequestStatusReducer.reduce(&mut state, RequestAction::Begin, &());

            prop_assert!(state.pending);
            prop_assert_eq!(state.error, None);
        }

        #[test]
        fn prop_fail_sets_error(state in arb_state(), message in "[a-z ]{0,12}") {
            let mut state = state;
            let _ = RequestStatusReducer.reduce(&mut state, RequestAction::Fail { message: message.clone() }, &());

            prop_assert!(!state.pending);
            prop_assert_eq!(state.error, Some(message));
        }

        #[test]
        fn prop_clear_error_keeps_pending(state in arb_state()) {
            let pending = state.pending;
            let mut state = state;
            let _ = RequestStatusReducer.reduce(&mut state, RequestAction::ClearError, &());

            prop_assert_eq!(state.pending, pending);
            prop_assert_eq!(state.error, None);
        }

        #[test]
        fn prop_complete_keeps_error(state in arb_state()) {
            let error = state.error.clone();
            let mut state = state;
            let _ = RequestStatusReducer.reduce(&mut state, RequestAction::Complete, &());

            prop_assert!(!state.pending);
            prop_assert_eq!(state.error, error);
        }
    }
}
