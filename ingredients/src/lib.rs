//! Ingredient list manager backed by a remote JSON document store.
//!
//! Users add and remove named ingredients with quantities; the list lives in
//! a remote document store and is mirrored locally. Two pure reducers own
//! the local state:
//!
//! - [`ListReducer`]: the ordered ingredient collection
//! - [`RequestStatusReducer`]: whether a request is in flight and the last error
//!
//! [`OrchestrationReducer`] drives the remote calls and feeds their outcomes
//! to both. [`IngredientsApp`] wraps the store with one method per operation.
//!
//! # Quick Start
//!
//! ```no_run
//! use pantry_ingredients::{IngredientsApp, NewIngredient, PantryConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = IngredientsApp::from_config(&PantryConfig::from_env()?)?;
//!
//! app.load_ingredients().await?;
//! app.add_ingredient(NewIngredient::new("Flour", 500.0)).await?;
//!
//! if let Some(error) = app.error().await {
//!     eprintln!("Could not save: {error}");
//!     app.clear_error().await?;
//! }
//!
//! for ingredient in app.ingredients().await {
//!     println!("{} x{}", ingredient.title, ingredient.amount);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod app;
pub mod config;
pub mod list;
pub mod orchestration;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use actions::{ActionError, AppAction, ListAction, RequestAction};
pub use app::{AppError, IngredientsApp};
pub use config::{ConfigError, PantryConfig};
pub use list::ListReducer;
pub use orchestration::{app_reducer, AppReducer, IngredientsEnvironment, OrchestrationReducer};
pub use request::RequestStatusReducer;
pub use types::{AppState, Ingredient, IngredientId, IngredientList, NewIngredient, RequestState, SessionId};
