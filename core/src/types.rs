//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names follow the API's camelCase (`userId`).

use serde::{Deserialize, Serialize};

/// Server-assigned todo identifier.
pub type TodoId = u64;

/// Identifier of the user every request is scoped to.
pub type UserId = u64;

/// Id carried by a placeholder whose create request is still pending.
pub const TEMP_ID: TodoId = 0;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: UserId,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// Client-only stand-in shown while a create request is in flight.
    pub fn placeholder(user_id: UserId, title: &str) -> Self {
        Self {
            id: TEMP_ID,
            user_id,
            title: title.to_string(),
            completed: false,
        }
    }

    pub fn is_temp(&self) -> bool {
        self.id == TEMP_ID
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: UserId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}
