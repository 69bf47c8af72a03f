//! Orchestration of remote calls around the list and request-status reducers.
//!
//! Each user operation issues one remote call as an [`Effect::Future`]. The
//! call's outcome comes back as an action stamped with the session it was
//! issued in; outcomes from a session that has since been torn down are
//! dropped.
//!
//! | Operation | Before the call | On success | On failure |
//! |-----------|-----------------|------------|------------|
//! | add       | `Begin`         | `Complete`, `Append` | `Fail` |
//! | remove    | `Begin`         | `Complete`, `RemoveById` | `Fail` |
//! | search    | nothing         | `Replace`  | logged only |

use crate::actions::{AppAction, ListAction, RequestAction};
use crate::list::ListReducer;
use crate::request::RequestStatusReducer;
use crate::types::{AppState, Ingredient, IngredientId, IngredientList, NewIngredient, RequestState, SessionId};
use pantry_core::composition::{combine_reducers, scope_reducer, CombinedReducer, SharedReducer};
use pantry_core::document_store::{DocumentKey, DocumentStore, DocumentStoreError, Query};
use pantry_core::{effect::Effect, reducer::Reducer, smallvec, store_call, SmallVec};
use std::sync::Arc;

/// Field ingredients are ordered and searched by
pub const TITLE_FIELD: &str = "title";

/// Dependencies of the orchestration reducer
#[derive(Clone)]
pub struct IngredientsEnvironment {
    /// Remote document store
    pub store: Arc<dyn DocumentStore>,
    /// Collection holding the ingredients
    pub collection: String,
}

impl IngredientsEnvironment {
    /// Creates a new `IngredientsEnvironment`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }
}

impl std::fmt::Debug for IngredientsEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngredientsEnvironment")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

/// Reducer running the application's remote operations
#[derive(Clone, Copy, Debug, Default)]
pub struct OrchestrationReducer;

impl OrchestrationReducer {
    /// Creates a new `OrchestrationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn request(state: &mut AppState, action: RequestAction) {
        let _ = RequestStatusReducer.reduce(&mut state.request, action, &());
    }

    fn list(state: &mut AppState, action: ListAction) {
        let _ = ListReducer.reduce(&mut state.ingredients, action, &());
    }

    /// `true` if an outcome from `session` still belongs to the live state
    fn is_current(state: &AppState, session: SessionId, outcome: &str) -> bool {
        if session == state.session {
            return true;
        }
        tracing::debug!(
            issued = %session,
            current = %state.session,
            outcome,
            "Dropping outcome from a torn-down session"
        );
        false
    }

    fn add(state: &mut AppState, candidate: NewIngredient, env: &IngredientsEnvironment) -> Effect<AppAction> {
        let session = state.session;
        Self::request(state, RequestAction::Begin);

        let document = match encode_ingredient(&candidate) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(%error, "Could not encode ingredient");
                Self::request(state, RequestAction::Fail { message: error.to_string() });
                return Effect::None;
            },
        };

        tracing::debug!(collection = %env.collection, title = %candidate.title, "Adding ingredient");
        let store = Arc::clone(&env.store);
        let collection = env.collection.clone();
        store_call! {
            call: store.append(collection, document),
            on_success: |key| Some(AppAction::IngredientAdded {
                session,
                ingredient: candidate.with_id(key.into()),
            }),
            on_error: |error| Some(AppAction::AddFailed {
                session,
                message: error.to_string(),
            })
        }
    }

    fn remove(state: &mut AppState, id: IngredientId, env: &IngredientsEnvironment) -> Effect<AppAction> {
        let session = state.session;
        Self::request(state, RequestAction::Begin);

        tracing::debug!(collection = %env.collection, %id, "Removing ingredient");
        let store = Arc::clone(&env.store);
        let collection = env.collection.clone();
        let key = id.to_key();
        store_call! {
            call: store.remove(collection, key),
            on_success: |()| Some(AppAction::IngredientRemoved { session, id }),
            on_error: |error| Some(AppAction::RemoveFailed {
                session,
                message: error.to_string(),
            })
        }
    }

    fn search(state: &AppState, filter: &str, env: &IngredientsEnvironment) -> Effect<AppAction> {
        let session = state.session;
        let query = if filter.is_empty() {
            Query::all()
        } else {
            Query::all().order_by(TITLE_FIELD).equal_to(filter)
        };

        tracing::debug!(collection = %env.collection, %filter, "Searching ingredients");
        let store = Arc::clone(&env.store);
        let collection = env.collection.clone();
        store_call! {
            call: store.query(collection, query),
            on_success: |documents| Some(AppAction::SearchCompleted {
                session,
                ingredients: decode_ingredients(documents),
            }),
            on_error: |error| Some(AppAction::SearchFailed {
                session,
                message: error.to_string(),
            })
        }
    }
}

/// JSON body for a new ingredient
///
/// JSON has no NaN or infinity, and `serde_json` would silently write them as
/// `null`, so non-finite amounts are refused here.
fn encode_ingredient(candidate: &NewIngredient) -> Result<serde_json::Value, DocumentStoreError> {
    if !candidate.amount.is_finite() {
        return Err(DocumentStoreError::Serialization(format!(
            "amount {} has no JSON representation",
            candidate.amount
        )));
    }
    serde_json::to_value(candidate).map_err(|e| DocumentStoreError::Serialization(e.to_string()))
}

/// Turn query results into ingredients, skipping documents that do not decode
fn decode_ingredients(documents: Vec<(DocumentKey, serde_json::Value)>) -> Vec<Ingredient> {
    documents
        .into_iter()
        .filter_map(|(key, document)| match serde_json::from_value::<NewIngredient>(document) {
            Ok(candidate) => Some(candidate.with_id(key.into())),
            Err(e) => {
                tracing::warn!(%key, error = %e, "Skipping undecodable ingredient");
                None
            },
        })
        .collect()
}

impl Reducer for OrchestrationReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = IngredientsEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // Handled by the scoped reducers
            AppAction::List(_) | AppAction::Request(_) => SmallVec::new(),

            AppAction::AddIngredient(candidate) => smallvec![Self::add(state, candidate, env)],
            AppAction::IngredientAdded { session, ingredient } => {
                if Self::is_current(state, session, "add") {
                    Self::request(state, RequestAction::Complete);
                    Self::list(state, ListAction::Append { ingredient });
                }
                SmallVec::new()
            },
            AppAction::AddFailed { session, message } => {
                if Self::is_current(state, session, "add") {
                    tracing::warn!(%message, "Adding ingredient failed");
                    Self::request(state, RequestAction::Fail { message });
                }
                SmallVec::new()
            },

            AppAction::RemoveIngredient(id) => smallvec![Self::remove(state, id, env)],
            AppAction::IngredientRemoved { session, id } => {
                if Self::is_current(state, session, "remove") {
                    Self::request(state, RequestAction::Complete);
                    Self::list(state, ListAction::RemoveById { id });
                }
                SmallVec::new()
            },
            AppAction::RemoveFailed { session, message } => {
                if Self::is_current(state, session, "remove") {
                    tracing::warn!(%message, "Removing ingredient failed");
                    Self::request(state, RequestAction::Fail { message });
                }
                SmallVec::new()
            },

            AppAction::SearchIngredients { filter } => smallvec![Self::search(state, &filter, env)],
            AppAction::SearchCompleted { session, ingredients } => {
                if Self::is_current(state, session, "search") {
                    Self::list(state, ListAction::Replace { ingredients });
                }
                SmallVec::new()
            },
            AppAction::SearchFailed { session, message } => {
                if Self::is_current(state, session, "search") {
                    tracing::warn!(%message, "Searching ingredients failed");
                }
                SmallVec::new()
            },

            AppAction::Teardown => {
                let session = state.session.next();
                tracing::debug!(%session, "Tearing down session");
                *state = AppState {
                    session,
                    ..AppState::default()
                };
                SmallVec::new()
            },
        }
    }
}

/// The application reducer type
pub type AppReducer = CombinedReducer<AppState, AppAction, IngredientsEnvironment>;

fn no_env(_: &IngredientsEnvironment) -> &() {
    &()
}

fn ingredients_slice(state: &mut AppState) -> &mut IngredientList {
    &mut state.ingredients
}

fn request_slice(state: &mut AppState) -> &mut RequestState {
    &mut state.request
}

/// Build the application reducer
///
/// Direct list and request-status actions go to their scoped reducers; the
/// orchestration reducer handles everything that involves the remote store.
#[must_use]
pub fn app_reducer() -> AppReducer {
    let reducers: Vec<SharedReducer<AppState, AppAction, IngredientsEnvironment>> = vec![
        Arc::new(scope_reducer(
            ListReducer::new(),
            ingredients_slice,
            AppAction::into_list,
            AppAction::List,
            no_env,
        )),
        Arc::new(scope_reducer(
            RequestStatusReducer::new(),
            request_slice,
            AppAction::into_request,
            AppAction::Request,
            no_env,
        )),
        Arc::new(OrchestrationReducer::new()),
    ];
    combine_reducers(reducers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_testing::{assertions, InMemoryDocumentStore, ReducerTest};
    use serde_json::json;

    fn env(store: &InMemoryDocumentStore) -> IngredientsEnvironment {
        IngredientsEnvironment::new(Arc::new(store.clone()), "ingredients")
    }

    async fn run(effects: SmallVec<[Effect<AppAction>; 4]>) -> Vec<AppAction> {
        let mut actions = Vec::new();
        for effect in effects {
            if let Effect::Future(fut) = effect {
                actions.extend(fut.await);
            }
        }
        actions
    }

    #[test]
    fn test_add_begins_request() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                request: RequestState::with_error("old"),
                ..AppState::default()
            })
            .when_action(AppAction::AddIngredient(NewIngredient::new("Salt", 1.0)))
            .then_state(|state| {
                assert!(state.request.pending);
                assert!(state.request.error.is_none());
                assert!(state.ingredients.is_empty());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[tokio::test]
    async fn test_add_effect_reports_server_key() {
        let store = InMemoryDocumentStore::new();
        let env = env(&store);
        let mut state = AppState::default();

        let effects = OrchestrationReducer.reduce(
            &mut state,
            AppAction::AddIngredient(NewIngredient::new("Salt", 1.0)),
            &env,
        );
        let actions = run(effects).await;

        let key = store.documents("ingredients")[0].0.clone();
        assert_eq!(
            actions,
            vec![AppAction::IngredientAdded {
                session: SessionId::default(),
                ingredient: Ingredient::new(key.as_str(), "Salt", 1.0),
            }]
        );
        assert_eq!(
            store.documents("ingredients")[0].1,
            json!({"title": "Salt", "amount": 1.0})
        );
    }

    #[tokio::test]
    async fn test_add_effect_reports_failure() {
        let store = InMemoryDocumentStore::new();
        store.fail_next(DocumentStoreError::RequestFailed("offline".to_string()));
        let env = env(&store);
        let mut state = AppState::default();

        let effects = OrchestrationReducer.reduce(
            &mut state,
            AppAction::AddIngredient(NewIngredient::new("Salt", 1.0)),
            &env,
        );

        assert_eq!(
            run(effects).await,
            vec![AppAction::AddFailed {
                session: SessionId::default(),
                message: "Request failed: offline".to_string(),
            }]
        );
    }

    #[test]
    fn test_add_non_finite_amount_fails_without_remote_call() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState::default())
            .when_action(AppAction::AddIngredient(NewIngredient::new("Salt", f64::NAN)))
            .then_state(|state| {
                assert_eq!(
                    state.request,
                    RequestState::with_error("Serialization error: amount NaN has no JSON representation")
                );
                assert!(state.ingredients.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        assert!(store.calls().is_empty());
    }

    #[test]
    fn test_added_appends_and_completes() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                request: RequestState {
                    pending: true,
                    error: None,
                },
                ..AppState::default()
            })
            .when_action(AppAction::IngredientAdded {
                session: SessionId::default(),
                ingredient: Ingredient::new("k1", "Salt", 1.0),
            })
            .then_state(|state| {
                assert!(!state.request.pending);
                assert_eq!(state.ingredients.items(), &[Ingredient::new("k1", "Salt", 1.0)]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_add_failed_sets_error_and_keeps_list() {
        let store = InMemoryDocumentStore::new();
        let existing = Ingredient::new("k1", "Salt", 1.0);
        let expected = existing.clone();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                ingredients: vec![existing].into(),
                request: RequestState {
                    pending: true,
                    error: None,
                },
                ..AppState::default()
            })
            .when_action(AppAction::AddFailed {
                session: SessionId::default(),
                message: "offline".to_string(),
            })
            .then_state(move |state| {
                assert_eq!(state.request, RequestState::with_error("offline"));
                assert_eq!(state.ingredients.items(), &[expected]);
            })
            .run();
    }

    #[test]
    fn test_removed_drops_item() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                ingredients: vec![Ingredient::new("a", "Salt", 1.0), Ingredient::new("b", "Sugar", 2.0)].into(),
                ..AppState::default()
            })
            .when_action(AppAction::RemoveIngredient("a".into()))
            .when_action(AppAction::IngredientRemoved {
                session: SessionId::default(),
                id: "a".into(),
            })
            .then_state(|state| {
                assert_eq!(state.ingredients.items(), &[Ingredient::new("b", "Sugar", 2.0)]);
                assert!(!state.request.pending);
            })
            .run();
    }

    #[test]
    fn test_stale_outcomes_are_ignored() {
        let store = InMemoryDocumentStore::new();
        let stale = SessionId::default();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState::default())
            .when_action(AppAction::Teardown)
            .when_action(AppAction::IngredientAdded {
                session: stale,
                ingredient: Ingredient::new("k1", "Salt", 1.0),
            })
            .when_action(AppAction::RemoveFailed {
                session: stale,
                message: "late".to_string(),
            })
            .when_action(AppAction::SearchCompleted {
                session: stale,
                ingredients: vec![Ingredient::new("k2", "Sugar", 1.0)],
            })
            .then_state(move |state| {
                assert_eq!(state.session, stale.next());
                assert!(state.ingredients.is_empty());
                assert_eq!(state.request, RequestState::default());
            })
            .run();
    }

    #[test]
    fn test_teardown_resets_state() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                ingredients: vec![Ingredient::new("a", "Salt", 1.0)].into(),
                request: RequestState {
                    pending: true,
                    error: Some("x".to_string()),
                },
                session: SessionId::default(),
            })
            .when_action(AppAction::Teardown)
            .then_state(|state| {
                assert!(state.ingredients.is_empty());
                assert_eq!(state.request, RequestState::default());
                assert_eq!(state.session.value(), 1);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn test_search_uses_title_filter() {
        let store = InMemoryDocumentStore::new();
        store.seed("ingredients", "k1", json!({"title": "Salt", "amount": 1.0}));
        store.seed("ingredients", "k2", json!({"title": "Sugar", "amount": 2.0}));
        let env = env(&store);
        let mut state = AppState::default();

        let effects = OrchestrationReducer.reduce(
            &mut state,
            AppAction::SearchIngredients {
                filter: "Sugar".to_string(),
            },
            &env,
        );

        assert!(!state.request.pending);
        assert_eq!(
            run(effects).await,
            vec![AppAction::SearchCompleted {
                session: SessionId::default(),
                ingredients: vec![Ingredient::new("k2", "Sugar", 2.0)],
            }]
        );
    }

    #[test]
    fn test_search_failure_leaves_list() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(OrchestrationReducer::new())
            .with_env(env(&store))
            .given_state(AppState {
                ingredients: vec![Ingredient::new("a", "Salt", 1.0)].into(),
                ..AppState::default()
            })
            .when_action(AppAction::SearchFailed {
                session: SessionId::default(),
                message: "offline".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.ingredients.len(), 1);
                assert!(state.request.error.is_none());
            })
            .run();
    }

    #[test]
    fn test_decode_skips_bad_documents() {
        let decoded = decode_ingredients(vec![
            (DocumentKey::new("k1"), json!({"title": "Salt", "amount": 1})),
            (DocumentKey::new("k2"), json!({"title": "Broken"})),
        ]);

        assert_eq!(decoded, vec![Ingredient::new("k1", "Salt", 1.0)]);
    }

    #[test]
    fn test_app_reducer_routes_direct_actions() {
        let store = InMemoryDocumentStore::new();
        ReducerTest::new(app_reducer())
            .with_env(env(&store))
            .given_state(AppState::default())
            .when_actions([
                AppAction::List(ListAction::Append {
                    ingredient: Ingredient::new("a", "Salt", 1.0),
                }),
                AppAction::Request(RequestAction::Fail {
                    message: "net fail".to_string(),
                }),
                AppAction::Request(RequestAction::Complete),
            ])
            .then_state(|state| {
                assert_eq!(state.ingredients.len(), 1);
                assert_eq!(state.request, RequestState::with_error("net fail"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
