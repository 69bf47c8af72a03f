//! The ingredients application: a [`Store`] running [`app_reducer`] plus
//! typed entry points for each operation and read-only views of the state.
//!
//! Every operation waits until the effects it started have been reduced, so
//! when it returns the state already reflects the remote outcome. Transport
//! failures are not returned as errors; they land in the request state.

use crate::actions::{ActionError, AppAction, ListAction, RequestAction};
use crate::config::{ConfigError, PantryConfig};
use crate::orchestration::{app_reducer, AppReducer, IngredientsEnvironment};
use crate::types::{AppState, Ingredient, IngredientId, NewIngredient, RequestState};
use pantry_core::document_store::{DocumentStore, DocumentStoreError};
use pantry_rest_store::RestDocumentStore;
use pantry_runtime::{EffectHandle, Store, StoreConfig, StoreError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// The application store type
pub type AppStore = Store<AppState, AppAction, IngredientsEnvironment, AppReducer>;

/// Errors surfaced by [`IngredientsApp`]
#[derive(Error, Debug)]
pub enum AppError {
    /// The runtime rejected the action or timed out waiting for effects
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A wire action was rejected
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Configuration is missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The document store client could not be created
    #[error(transparent)]
    Remote(#[from] DocumentStoreError),
}

/// Ingredient list manager
#[derive(Clone)]
pub struct IngredientsApp {
    store: AppStore,
    effect_timeout: Duration,
}

impl IngredientsApp {
    /// Default time to wait for an operation's effects
    pub const DEFAULT_EFFECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create an app over any document store
    #[must_use]
    pub fn new(remote: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self::with_store_config(remote, collection, StoreConfig::default())
    }

    /// Create an app with a custom runtime configuration
    #[must_use]
    pub fn with_store_config(
        remote: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        config: StoreConfig,
    ) -> Self {
        let env = IngredientsEnvironment::new(remote, collection);
        Self {
            store: Store::with_config(AppState::new(), app_reducer(), env, config),
            effect_timeout: Self::DEFAULT_EFFECT_TIMEOUT,
        }
    }

    /// Create an app talking to the REST store described by `config`
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the configuration is invalid and
    /// [`AppError::Remote`] if the HTTP client cannot be built.
    pub fn from_config(config: &PantryConfig) -> Result<Self, AppError> {
        config.validate()?;
        let remote = RestDocumentStore::with_timeout(config.store_url.clone(), config.request_timeout)?;
        tracing::info!(
            store_url = %config.store_url,
            collection = %config.collection,
            "Connecting to document store"
        );

        let store_config = StoreConfig::default().with_broadcast_capacity(config.broadcast_capacity);
        Ok(Self::with_store_config(Arc::new(remote), config.collection.clone(), store_config)
            // Leave room for the request's own timeout before giving up on it
            .with_effect_timeout(config.request_timeout.saturating_add(Duration::from_secs(1))))
    }

    /// Set how long operations wait for their effects
    #[must_use]
    pub const fn with_effect_timeout(mut self, timeout: Duration) -> Self {
        self.effect_timeout = timeout;
        self
    }

    /// Underlying store, for observers and custom actions
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Send an action without waiting for its effects
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn dispatch(&self, action: AppAction) -> Result<EffectHandle, AppError> {
        Ok(self.store.send(action).await?)
    }

    /// Send an action and wait until its effects have been reduced
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down or the
    /// effects outlive the effect timeout.
    pub async fn dispatch_and_wait(&self, action: AppAction) -> Result<(), AppError> {
        let mut handle = self.dispatch(action).await?;
        handle.wait_with_timeout(self.effect_timeout).await?;
        Ok(())
    }

    /// Decode a wire action and dispatch it
    ///
    /// Rejected input never reaches the reducers.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Action`] for unknown or malformed actions, and
    /// [`AppError::Store`] as for [`Self::dispatch_and_wait`].
    pub async fn dispatch_json(&self, input: &str) -> Result<(), AppError> {
        let action = AppAction::from_json(input).inspect_err(|e| {
            tracing::error!(error = %e, "Rejected action");
        })?;
        self.dispatch_and_wait(action).await
    }

    /// Persist a new ingredient and append it with its server id
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] as for [`Self::dispatch_and_wait`].
    pub async fn add_ingredient(&self, candidate: NewIngredient) -> Result<(), AppError> {
        self.dispatch_and_wait(AppAction::AddIngredient(candidate)).await
    }

    /// Delete an ingredient remotely and drop it from the list
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] as for [`Self::dispatch_and_wait`].
    pub async fn remove_ingredient(&self, id: IngredientId) -> Result<(), AppError> {
        self.dispatch_and_wait(AppAction::RemoveIngredient(id)).await
    }

    /// Replace the list with search results
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn set_filtered_ingredients(&self, ingredients: Vec<Ingredient>) -> Result<(), AppError> {
        self.dispatch_and_wait(ListAction::Replace { ingredients }.into()).await
    }

    /// Dismiss the current error
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn clear_error(&self) -> Result<(), AppError> {
        self.dispatch_and_wait(RequestAction::ClearError.into()).await
    }

    /// Fetch ingredients titled exactly `filter` (all when empty) into the list
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] as for [`Self::dispatch_and_wait`].
    pub async fn search_ingredients(&self, filter: impl Into<String>) -> Result<(), AppError> {
        self.dispatch_and_wait(AppAction::SearchIngredients { filter: filter.into() })
            .await
    }

    /// Fetch every ingredient into the list
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] as for [`Self::dispatch_and_wait`].
    pub async fn load_ingredients(&self) -> Result<(), AppError> {
        self.search_ingredients("").await
    }

    /// Reset state; requests still in flight will not touch it
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the store is shutting down.
    pub async fn teardown(&self) -> Result<(), AppError> {
        self.dispatch_and_wait(AppAction::Teardown).await
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> AppState {
        self.store.state(Clone::clone).await
    }

    /// Ingredients in order
    pub async fn ingredients(&self) -> Vec<Ingredient> {
        self.store.state(|s| s.ingredients.items().to_vec()).await
    }

    /// Current request state
    pub async fn request_state(&self) -> RequestState {
        self.store.state(|s| s.request.clone()).await
    }

    /// `true` while a tracked request is in flight
    pub async fn is_loading(&self) -> bool {
        self.store.state(AppState::is_loading).await
    }

    /// Current error message
    pub async fn error(&self) -> Option<String> {
        self.store.state(|s| s.request.error.clone()).await
    }

    /// Ingredient with the given id
    pub async fn find(&self, id: &IngredientId) -> Option<Ingredient> {
        self.store.state(|s| s.ingredients.find(id).cloned()).await
    }

    /// Ingredients whose title starts with `prefix`, ignoring case
    pub async fn filter_by_title(&self, prefix: &str) -> Vec<Ingredient> {
        self.store.state(|s| s.ingredients.filter_by_title(prefix)).await
    }

    /// Sum of all amounts
    pub async fn total_amount(&self) -> f64 {
        self.store.state(|s| s.ingredients.total_amount()).await
    }

    /// Observe every action fed back by effects
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AppAction> {
        self.store.subscribe_actions()
    }

    /// Stop accepting actions and wait for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if effects are still running after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), AppError> {
        Ok(self.store.shutdown(timeout).await?)
    }
}

impl std::fmt::Debug for IngredientsApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngredientsApp")
            .field("environment", self.store.environment())
            .field("effect_timeout", &self.effect_timeout)
            .finish_non_exhaustive()
    }
}
