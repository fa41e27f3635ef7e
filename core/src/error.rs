//! Error types for the todo API client and the state container.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the raw status
//! code and body. `Transport` is reported by the host when no response
//! arrived at all.

use crate::types::TodoId;

/// Errors produced while talking to the todo API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The host could not complete the round-trip.
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Errors returned by `TodoStore` operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("title should not be empty")]
    EmptyTitle,

    #[error("no todo with id {0}")]
    UnknownTodo(TodoId),

    #[error(transparent)]
    Api(#[from] ApiError),
}
