//! Optimistic client core for a todo-list REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps the client-side
//! state those calls reconcile into.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url` and the user id.
//! - `TodoStore` is the single root state container. Operations are split
//!   into `begin_*` (tentative state + request) and `finish_*` (commit or
//!   revert from the host's outcome).
//! - `Session` drives a store over any `Transport`, joining batched
//!   requests so each keeps its own outcome.
//! - `RowEditor` is the per-row inline edit state machine; `Filter` and
//!   `Summary` are pure view derivations.

pub mod client;
pub mod editor;
pub mod error;
pub mod filter;
pub mod http;
pub mod notice;
pub mod session;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use editor::{Commit, EditState, RowEditor};
pub use error::{ApiError, StoreError};
pub use filter::{Filter, Summary};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Outcome};
pub use notice::{ErrorMessage, NOTICE_TTL};
pub use session::{Session, Transport};
pub use store::{BatchItem, BatchReport, TodoStore, ToggleAll};
pub use types::{CreateTodo, Todo, TodoId, UpdateTodo, UserId, TEMP_ID};
