//! Domain types for the ingredient list.
//!
//! Ingredients are created by the remote store: the form submits a
//! [`NewIngredient`], the store answers with the key it assigned, and the
//! pair becomes an [`Ingredient`]. Ingredients are never edited in place.

use pantry_core::DocumentKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of an ingredient
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(String);

impl IngredientId {
    /// Wrap an identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which this ingredient is stored remotely
    #[must_use]
    pub fn to_key(&self) -> DocumentKey {
        DocumentKey::new(self.0.clone())
    }
}

impl From<DocumentKey> for IngredientId {
    fn from(key: DocumentKey) -> Self {
        Self(key.into_inner())
    }
}

impl From<&str> for IngredientId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted ingredient
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Identifier assigned by the remote store
    pub id: IngredientId,
    /// Display name
    pub title: String,
    /// Quantity, unit-less
    pub amount: f64,
}

impl Ingredient {
    /// Creates a new ingredient
    #[must_use]
    pub fn new(id: impl Into<IngredientId>, title: impl Into<String>, amount: f64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            amount,
        }
    }
}

/// An ingredient as submitted, before the store assigns an id
///
/// This is also the document body sent to and read from the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewIngredient {
    /// Display name
    pub title: String,
    /// Quantity, unit-less
    pub amount: f64,
}

impl NewIngredient {
    /// Creates a new candidate ingredient
    #[must_use]
    pub fn new(title: impl Into<String>, amount: f64) -> Self {
        Self {
            title: title.into(),
            amount,
        }
    }

    /// Attach the id assigned by the store
    #[must_use]
    pub fn with_id(self, id: IngredientId) -> Ingredient {
        Ingredient {
            id,
            title: self.title,
            amount: self.amount,
        }
    }
}

/// Ordered collection of ingredients
///
/// Append order is significant. Duplicate ids are not prevented here;
/// the remote store never hands out the same key twice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientList {
    items: Vec<Ingredient>,
}

impl IngredientList {
    /// Creates a list from items, keeping their order
    #[must_use]
    pub const fn new(items: Vec<Ingredient>) -> Self {
        Self { items }
    }

    /// Items in order
    #[must_use]
    pub fn items(&self) -> &[Ingredient] {
        &self.items
    }

    /// Returns the number of ingredients
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over ingredients in order
    pub fn iter(&self) -> std::slice::Iter<'_, Ingredient> {
        self.items.iter()
    }

    /// Returns the first ingredient with the given id
    #[must_use]
    pub fn find(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Returns `true` if any ingredient has the given id
    #[must_use]
    pub fn contains(&self, id: &IngredientId) -> bool {
        self.find(id).is_some()
    }

    /// Ingredients whose title starts with `prefix`, ignoring case
    #[must_use]
    pub fn filter_by_title(&self, prefix: &str) -> Vec<Ingredient> {
        let prefix = prefix.to_lowercase();
        self.items
            .iter()
            .filter(|i| i.title.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// Sum of all amounts
    #[must_use]
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(|i| i.amount).sum()
    }

    /// Consume the list, returning the items
    #[must_use]
    pub fn into_vec(self) -> Vec<Ingredient> {
        self.items
    }

    pub(crate) fn replace(&mut self, items: Vec<Ingredient>) {
        self.items = items;
    }

    pub(crate) fn push(&mut self, item: Ingredient) {
        self.items.push(item);
    }

    pub(crate) fn remove_id(&mut self, id: &IngredientId) {
        self.items.retain(|i| &i.id != id);
    }
}

impl From<Vec<Ingredient>> for IngredientList {
    fn from(items: Vec<Ingredient>) -> Self {
        Self::new(items)
    }
}

impl<'a> IntoIterator for &'a IngredientList {
    type Item = &'a Ingredient;
    type IntoIter = std::slice::Iter<'a, Ingredient>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lifecycle of the (single) tracked remote request
///
/// `pending` is one flag shared by every operation: two overlapping calls
/// clear it as soon as the first one answers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestState {
    /// A tracked request is in flight
    pub pending: bool,
    /// Message of the last failed request, until dismissed
    pub error: Option<String>,
}

impl RequestState {
    /// An idle request state carrying an error
    #[must_use]
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            pending: false,
            error: Some(message.into()),
        }
    }
}

/// Epoch distinguishing live requests from ones issued before a teardown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// The epoch following this one
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw epoch value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Complete application state
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// The ingredient list
    pub ingredients: IngredientList,
    /// Status of the tracked request
    pub request: RequestState,
    /// Current session epoch
    pub session: SessionId,
}

impl AppState {
    /// Creates the initial state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a tracked request is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.request.pending
    }

    /// Current error message, if any
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.request.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> IngredientList {
        IngredientList::new(vec![
            Ingredient::new("a", "Salt", 1.0),
            Ingredient::new("b", "sugar", 2.5),
            Ingredient::new("c", "Saffron", 0.5),
        ])
    }

    #[test]
    fn test_filter_by_title_ignores_case() {
        let titles: Vec<_> = list()
            .filter_by_title("sa")
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, vec!["Salt", "Saffron"]);
    }

    #[test]
    fn test_filter_by_empty_prefix_returns_all() {
        assert_eq!(list().filter_by_title("").len(), 3);
    }

    #[test]
    fn test_total_amount() {
        assert!((list().total_amount() - 4.0).abs() < f64::EPSILON);
        assert!(IngredientList::default().total_amount().abs() < f64::EPSILON);
    }

    #[test]
    fn test_find() {
        let list = list();
        assert_eq!(list.find(&"b".into()).map(|i| i.title.as_str()), Some("sugar"));
        assert!(list.find(&"z".into()).is_none());
    }

    #[test]
    fn test_new_ingredient_with_id() {
        let ingredient = NewIngredient::new("Flour", 500.0).with_id(IngredientId::new("-K1"));
        assert_eq!(ingredient, Ingredient::new("-K1", "Flour", 500.0));
    }

    #[test]
    fn test_session_next_increases() {
        let first = SessionId::default();
        assert!(first.next() > first);
        assert_eq!(first.next().value(), 1);
    }

    #[test]
    fn test_id_from_document_key() {
        let id = IngredientId::from(DocumentKey::new("-Kxyz"));
        assert_eq!(id.as_str(), "-Kxyz");
        assert_eq!(id.to_key(), DocumentKey::new("-Kxyz"));
    }

    #[test]
    fn test_ingredient_json_shape() {
        let json = serde_json::to_value(Ingredient::new("a", "Salt", 1.0)).unwrap_or_default();
        assert_eq!(json, serde_json::json!({"id": "a", "title": "Salt", "amount": 1.0}));
    }
}
