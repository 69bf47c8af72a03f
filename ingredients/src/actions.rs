//! Actions for the ingredient reducers and their JSON wire form.
//!
//! [`ListAction`] and [`RequestAction`] are the two reducers' inputs. On the
//! wire they are objects tagged by `type`:
//!
//! | Tag      | Action                                   |
//! |----------|------------------------------------------|
//! | `SET`    | `{"type":"SET","ingredients":[...]}`      |
//! | `ADD`    | `{"type":"ADD","ingredient":{...}}`       |
//! | `DELETE` | `{"type":"DELETE","id":"..."}`            |
//! | `SEND`   | `{"type":"SEND"}`                        |
//! | `RESP`   | `{"type":"RESP"}`                        |
//! | `ERR`    | `{"type":"ERR","errorData":"..."}`       |
//! | `CLEAR`  | `{"type":"CLEAR"}`                       |
//!
//! Any other tag is rejected by [`AppAction::from_json`] before it reaches a
//! reducer.

use crate::types::{Ingredient, IngredientId, NewIngredient, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tags accepted for [`ListAction`]
const LIST_TAGS: [&str; 3] = ["SET", "ADD", "DELETE"];

/// Tags accepted for [`RequestAction`]
const REQUEST_TAGS: [&str; 4] = ["SEND", "RESP", "ERR", "CLEAR"];

/// Inputs of the list reducer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ListAction {
    /// The collection becomes exactly these items
    #[serde(rename = "SET")]
    Replace {
        /// New contents, in order
        ingredients: Vec<Ingredient>,
    },
    /// Add an item at the end
    #[serde(rename = "ADD")]
    Append {
        /// Item to add
        ingredient: Ingredient,
    },
    /// Drop every item with this id
    #[serde(rename = "DELETE")]
    RemoveById {
        /// Id to drop
        id: IngredientId,
    },
}

/// Inputs of the request-status reducer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestAction {
    /// A tracked request was issued
    #[serde(rename = "SEND")]
    Begin,
    /// The tracked request answered
    #[serde(rename = "RESP")]
    Complete,
    /// The tracked request failed
    #[serde(rename = "ERR")]
    Fail {
        /// Human-readable reason
        #[serde(rename = "errorData")]
        message: String,
    },
    /// The user dismissed the error
    #[serde(rename = "CLEAR")]
    ClearError,
}

/// Every action the application store accepts
///
/// `List` and `Request` go straight to their reducers. The rest drive the
/// remote calls; the `*ed`/`*Failed` variants are fed back by effects and
/// carry the session they were issued in.
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    /// Direct list mutation
    List(ListAction),
    /// Direct request-status transition
    Request(RequestAction),

    /// Persist a new ingredient
    AddIngredient(NewIngredient),
    /// The store accepted the ingredient
    IngredientAdded {
        /// Session the request was issued in
        session: SessionId,
        /// Ingredient with its assigned id
        ingredient: Ingredient,
    },
    /// The add request failed
    AddFailed {
        /// Session the request was issued in
        session: SessionId,
        /// Failure reason
        message: String,
    },

    /// Delete an ingredient remotely
    RemoveIngredient(IngredientId),
    /// The store deleted the ingredient
    IngredientRemoved {
        /// Session the request was issued in
        session: SessionId,
        /// Deleted id
        id: IngredientId,
    },
    /// The delete request failed
    RemoveFailed {
        /// Session the request was issued in
        session: SessionId,
        /// Failure reason
        message: String,
    },

    /// Fetch ingredients whose title equals `filter` (all when empty)
    SearchIngredients {
        /// Exact title, or empty for everything
        filter: String,
    },
    /// The search answered
    SearchCompleted {
        /// Session the request was issued in
        session: SessionId,
        /// Matching ingredients in key order
        ingredients: Vec<Ingredient>,
    },
    /// The search failed
    SearchFailed {
        /// Session the request was issued in
        session: SessionId,
        /// Failure reason
        message: String,
    },

    /// Reset state and disown in-flight requests
    Teardown,
}

impl From<ListAction> for AppAction {
    fn from(action: ListAction) -> Self {
        Self::List(action)
    }
}

impl From<RequestAction> for AppAction {
    fn from(action: RequestAction) -> Self {
        Self::Request(action)
    }
}

impl AppAction {
    /// Extract a list action, if this is one
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Destructors cannot run in const fn
    pub fn into_list(self) -> Option<ListAction> {
        match self {
            Self::List(action) => Some(action),
            _ => None,
        }
    }

    /// Extract a request-status action, if this is one
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Destructors cannot run in const fn
    pub fn into_request(self) -> Option<RequestAction> {
        match self {
            Self::Request(action) => Some(action),
            _ => None,
        }
    }

    /// Decode a wire action
    ///
    /// # Errors
    ///
    /// - [`ActionError::UnknownKind`] if the `type` tag names no known action
    /// - [`ActionError::Malformed`] if the input is not a tagged object or
    ///   its fields do not fit the tag
    pub fn from_json(input: &str) -> Result<Self, ActionError> {
        let value: serde_json::Value =
            serde_json::from_str(input).map_err(|e| ActionError::Malformed(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| ActionError::Malformed("missing string field `type`".to_string()))?;

        if LIST_TAGS.contains(&kind) {
            serde_json::from_value(value)
                .map(Self::List)
                .map_err(|e| ActionError::Malformed(e.to_string()))
        } else if REQUEST_TAGS.contains(&kind) {
            serde_json::from_value(value)
                .map(Self::Request)
                .map_err(|e| ActionError::Malformed(e.to_string()))
        } else {
            Err(ActionError::UnknownKind(kind.to_string()))
        }
    }
}

/// Rejected wire action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The `type` tag names no action either reducer handles
    #[error("Unknown action type: {0}")]
    UnknownKind(String),

    /// The input could not be decoded as an action
    #[error("Malformed action: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list_actions() {
        let action = AppAction::from_json(r#"{"type":"DELETE","id":"-K1"}"#);
        assert_eq!(
            action,
            Ok(AppAction::List(ListAction::RemoveById { id: "-K1".into() }))
        );

        let action = AppAction::from_json(
            r#"{"type":"ADD","ingredient":{"id":"-K2","title":"Salt","amount":1}}"#,
        );
        assert_eq!(
            action,
            Ok(AppAction::List(ListAction::Append {
                ingredient: Ingredient::new("-K2", "Salt", 1.0)
            }))
        );

        let action = AppAction::from_json(r#"{"type":"SET","ingredients":[]}"#);
        assert_eq!(
            action,
            Ok(AppAction::List(ListAction::Replace { ingredients: vec![] }))
        );
    }

    #[test]
    fn test_decode_request_actions() {
        assert_eq!(
            AppAction::from_json(r#"{"type":"SEND"}"#),
            Ok(AppAction::Request(RequestAction::Begin))
        );
        assert_eq!(
            AppAction::from_json(r#"{"type":"ERR","errorData":"net fail"}"#),
            Ok(AppAction::Request(RequestAction::Fail {
                message: "net fail".to_string()
            }))
        );
        assert_eq!(
            AppAction::from_json(r#"{"type":"CLEAR"}"#),
            Ok(AppAction::Request(RequestAction::ClearError))
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert_eq!(
            AppAction::from_json(r#"{"type":"RENAME","id":"a"}"#),
            Err(ActionError::UnknownKind("RENAME".to_string()))
        );
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            AppAction::from_json("not json"),
            Err(ActionError::Malformed(_))
        ));
        assert!(matches!(
            AppAction::from_json(r#"{"id":"a"}"#),
            Err(ActionError::Malformed(_))
        ));
        assert!(matches!(
            AppAction::from_json(r#"{"type":"ERR"}"#),
            Err(ActionError::Malformed(_))
        ));
    }

    #[test]
    fn test_wire_tags_round_trip_through_serde() {
        let json = serde_json::to_string(&RequestAction::Fail {
            message: "boom".to_string(),
        })
        .unwrap_or_default();
        assert_eq!(json, r#"{"type":"ERR","errorData":"boom"}"#);
    }
}
