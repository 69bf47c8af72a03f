//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a child reducer on a slice of state and a
//!   subset of the parent's actions
//!
//! # Examples
//!
//! ## Combining Reducers
//!
//! ```
//! use pantry_core::{smallvec, Effect, Reducer, SmallVec};
//! use pantry_core::composition::{combine_reducers, SharedReducer};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default)]
//! struct MyState {
//!     count: i32,
//!     name: String,
//! }
//!
//! #[derive(Clone)]
//! enum MyAction {
//!     Increment,
//!     SetName(String),
//! }
//!
//! struct CounterReducer;
//! struct NameReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = MyState;
//!     type Action = MyAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut MyState, action: MyAction, _env: &()) -> SmallVec<[Effect<MyAction>; 4]> {
//!         if matches!(action, MyAction::Increment) {
//!             state.count += 1;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! impl Reducer for NameReducer {
//!     type State = MyState;
//!     type Action = MyAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut MyState, action: MyAction, _env: &()) -> SmallVec<[Effect<MyAction>; 4]> {
//!         if let MyAction::SetName(name) = action {
//!             state.name = name;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let reducers: Vec<SharedReducer<MyState, MyAction, ()>> =
//!     vec![Arc::new(CounterReducer), Arc::new(NameReducer)];
//! let combined = combine_reducers(reducers);
//! let mut state = MyState::default();
//! let _ = combined.reduce(&mut state, MyAction::Increment, &());
//! assert_eq!(state.count, 1);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;
use smallvec::SmallVec;
use std::sync::Arc;

/// Shared, thread-safe reducer trait object
pub type SharedReducer<S, A, E> = Arc<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, in the order given, and all effects are
/// collected and concatenated.
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<SharedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    A: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<SharedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers in the combination
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns `true` if no reducers were combined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> Clone for CombinedReducer<S, A, E> {
    fn clone(&self) -> Self {
        Self {
            reducers: self.reducers.iter().map(Arc::clone).collect(),
        }
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    A: Clone,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a child reducer to a slice of a larger state.
///
/// Parent actions are offered to `extract`; when it yields a child action the
/// child reducer runs on the slice returned by `state`, and its effects are
/// lifted back into parent actions with `embed`. Parent actions the child does
/// not own pass through untouched and produce no effects.
///
/// # Examples
///
/// ```
/// use pantry_core::{smallvec, Effect, Reducer, SmallVec};
/// use pantry_core::composition::scope_reducer;
///
/// #[derive(Clone, Default)]
/// struct CounterState {
///     count: i32,
/// }
///
/// #[derive(Clone)]
/// enum CounterAction {
///     Increment,
/// }
///
/// struct CounterReducer;
///
/// impl Reducer for CounterReducer {
///     type State = CounterState;
///     type Action = CounterAction;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut CounterState, action: CounterAction, _env: &()) -> SmallVec<[Effect<CounterAction>; 4]> {
///         match action {
///             CounterAction::Increment => state.count += 1,
///         }
///         smallvec![Effect::None]
///     }
/// }
///
/// #[derive(Clone, Default)]
/// struct AppState {
///     counter: CounterState,
///     title: String,
/// }
///
/// #[derive(Clone)]
/// enum AppAction {
///     Counter(CounterAction),
///     Rename(String),
/// }
///
/// let scoped = scope_reducer(
///     CounterReducer,
///     |app: &mut AppState| &mut app.counter,
///     |action: AppAction| match action {
///         AppAction::Counter(inner) => Some(inner),
///         AppAction::Rename(_) => None,
///     },
///     AppAction::Counter,
///     |_: &()| &(),
/// );
///
/// let mut state = AppState::default();
/// let _ = scoped.reduce(&mut state, AppAction::Counter(CounterAction::Increment), &());
/// assert_eq!(state.counter.count, 1);
/// ```
pub fn scope_reducer<S, SubS, A, SubA, E, SubE, R>(
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    env: fn(&E) -> &SubE,
) -> ScopedReducer<S, SubS, A, SubA, E, SubE, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = SubE>,
{
    ScopedReducer {
        reducer,
        state,
        extract,
        embed,
        env,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, SubA, E, SubE, R> {
    reducer: R,
    state: fn(&mut S) -> &mut SubS,
    extract: fn(A) -> Option<SubA>,
    embed: fn(SubA) -> A,
    env: fn(&E) -> &SubE,
}

impl<S, SubS, A, SubA, E, SubE, R: Clone> Clone for ScopedReducer<S, SubS, A, SubA, E, SubE, R> {
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            state: self.state,
            extract: self.extract,
            embed: self.embed,
            env: self.env,
        }
    }
}

impl<S, SubS, A, SubA, E, SubE, R> Reducer for ScopedReducer<S, SubS, A, SubA, E, SubE, R>
where
    R: Reducer<State = SubS, Action = SubA, Environment = SubE>,
    A: Send + 'static,
    SubA: Send + 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let Some(child_action) = (self.extract)(action) else {
            return SmallVec::new();
        };

        let slice = (self.state)(state);
        self.reducer
            .reduce(slice, child_action, (self.env)(env))
            .into_iter()
            .map(|effect| effect.map(self.embed))
            .collect()
    }
}
