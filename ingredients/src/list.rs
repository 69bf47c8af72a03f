//! Reducer for the ingredient list.
//!
//! Pure reconciliation of the local collection with what the remote store
//! reported. It never issues effects.

use crate::actions::ListAction;
use crate::types::IngredientList;
use pantry_core::{effect::Effect, reducer::Reducer, SmallVec};

/// Maintains the ordered ingredient collection
#[derive(Clone, Copy, Debug, Default)]
pub struct ListReducer;

impl ListReducer {
    /// Creates a new `ListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for ListReducer {
    type State = IngredientList;
    type Action = ListAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ListAction::Replace { ingredients } => {
                tracing::trace!(count = ingredients.len(), "Replacing ingredient list");
                state.replace(ingredients);
            },
            ListAction::Append { ingredient } => {
                tracing::trace!(id = %ingredient.id, "Appending ingredient");
                state.push(ingredient);
            },
            ListAction::RemoveById { id } => {
                tracing::trace!(%id, "Removing ingredient");
                state.remove_id(&id);
            },
        }

        SmallVec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Ingredient, IngredientId};
    use pantry_testing::{assertions, ReducerTest};
    use proptest::prelude::*;

    fn ingredient(id: &str) -> Ingredient {
        Ingredient::new(id, format!("title-{id}"), 1.0)
    }

    #[test]
    fn test_append_onto_empty() {
        ReducerTest::new(ListReducer::new())
            .with_env(())
            .given_state(IngredientList::default())
            .when_action(ListAction::Append {
                ingredient: ingredient("a"),
            })
            .then_state(|list| {
                assert_eq!(list.items(), &[ingredient("a")]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_remove_by_id_keeps_others() {
        ReducerTest::new(ListReducer::new())
            .with_env(())
            .given_state(IngredientList::new(vec![ingredient("a"), ingredient("b")]))
            .when_action(ListAction::RemoveById { id: "a".into() })
            .then_state(|list| {
                assert_eq!(list.items(), &[ingredient("b")]);
            })
            .run();
    }

    #[test]
    fn test_remove_by_id_drops_duplicates() {
        ReducerTest::new(ListReducer::new())
            .with_env(())
            .given_state(IngredientList::new(vec![
                ingredient("a"),
                ingredient("b"),
                ingredient("a"),
            ]))
            .when_action(ListAction::RemoveById { id: "a".into() })
            .then_state(|list| {
                assert_eq!(list.items(), &[ingredient("b")]);
            })
            .run();
    }

    #[test]
    fn test_replace_with_one() {
        ReducerTest::new(ListReducer::new())
            .with_env(())
            .given_state(IngredientList::new(vec![ingredient("a"), ingredient("b")]))
            .when_action(ListAction::Replace {
                ingredients: vec![ingredient("c")],
            })
            .then_state(|list| {
                assert_eq!(list.items(), &[ingredient("c")]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_append_does_not_check_duplicates() {
        ReducerTest::new(ListReducer::new())
            .with_env(())
            .given_state(IngredientList::new(vec![ingredient("a")]))
            .when_action(ListAction::Append {
                ingredient: ingredient("a"),
            })
            .then_state(|list| assert_eq!(list.len(), 2))
            .run();
    }

    fn arb_ingredient() -> impl Strategy<Value = Ingredient> {
        ("[a-e]", "[A-Za-z ]{0,8}", 0.0f64..1000.0)
            .prop_map(|(id, title, amount)| Ingredient::new(id.as_str(), title, amount))
    }

    fn arb_list() -> impl Strategy<Value = IngredientList> {
        prop::collection::vec(arb_ingredient(), 0..8).prop_map(IngredientList::new)
    }

    proptest! {
        #[test]
        fn prop_append_adds_last(list in arb_list(), item in arb_ingredient()) {
            let mut state = list.clone();
            let _ = ListReducer.reduce(&mut state, ListAction::Append { ingredient: item.clone() }, &());

            prop_assert_eq!(state.len(), list.len() + 1);
            prop_assert_eq!(&state.items()[..list.len()], list.items());
            prop_assert_eq!(state.items().last(), Some(&item));
        }

        #[test]
        fn prop_remove_absent_is_noop(list in arb_list()) {
            let mut state = list.clone();
            let _ = ListReducer.reduce(&mut state, ListAction::RemoveById { id: IngredientId::new("zz") }, &());

            prop_assert_eq!(state, list);
        }

        #[test]
        fn prop_remove_present_drops_all_matches(list in arb_list(), id in "[a-e]") {
            let id = IngredientId::new(id);
            let matches = list.iter().filter(|i| i.id == id).count();
            let mut state = list.clone();
            let _ = ListReducer.reduce(&mut state, ListAction::RemoveById { id: id.clone() }, &());

            prop_assert_eq!(state.len(), list.len() - matches);
            prop_assert!(!state.contains(&id));
        }

        #[test]
        fn prop_replace_sets_exactly(list in arb_list(), items in prop::collection::vec(arb_ingredient(), 0..8)) {
            let mut state = list;
            let _ = ListReducer.reduce(&mut state, ListAction::Replace { ingredients: items.clone() }, &());

            prop_assert_eq!(state.items(), items.as_slice());
        }
    }
}
