//! In-memory implementation of the todo REST API.
//!
//! Ids come from a counter starting at 1. `GET /todos` filters by the
//! optional `userId` query parameter. Faults can be injected per todo id
//! (`PATCH`/`DELETE` answer 500) and for listing, so clients can be tested
//! against partial failure over real HTTP.

use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<u64>,
}

#[derive(Debug)]
struct Inner {
    todos: BTreeMap<u64, Todo>,
    next_id: u64,
    faulty: HashSet<u64>,
    fail_list: bool,
}

/// Shared server state. Cloning shares the same store, so a test can keep a
/// handle and inject faults while the server runs.
#[derive(Clone, Debug)]
pub struct Db(Arc<RwLock<Inner>>);

impl Default for Db {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(Inner {
            todos: BTreeMap::new(),
            next_id: 1,
            faulty: HashSet::new(),
            fail_list: false,
        })))
    }
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a todo with the next free id and return it.
    pub async fn seed(&self, user_id: u64, title: &str, completed: bool) -> Todo {
        let mut inner = self.0.write().await;
        let todo = Todo {
            id: inner.next_id,
            user_id,
            title: title.to_string(),
            completed,
        };
        inner.next_id += 1;
        inner.todos.insert(todo.id, todo.clone());
        todo
    }

    /// Make every `PATCH`/`DELETE` on `id` answer 500.
    pub async fn fail_on(&self, id: u64) {
        self.0.write().await.faulty.insert(id);
    }

    pub async fn set_fail_list(&self, fail: bool) {
        self.0.write().await.fail_list = fail;
    }

    pub async fn todos(&self) -> Vec<Todo> {
        self.0.read().await.todos.values().cloned().collect()
    }
}

pub fn app() -> Router {
    app_with(Db::new())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Db::new()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock todo API listening");
    }
    axum::serve(listener, app_with(db)).await
}

async fn list_todos(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Todo>>, StatusCode> {
    let inner = db.0.read().await;
    if inner.fail_list {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todos = inner
        .todos
        .values()
        .filter(|todo| query.user_id.is_none_or(|user_id| todo.user_id == user_id))
        .cloned()
        .collect();
    Ok(Json(todos))
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> (StatusCode, Json<Todo>) {
    let mut inner = db.0.write().await;
    let todo = Todo {
        id: inner.next_id,
        user_id: input.user_id,
        title: input.title,
        completed: input.completed,
    };
    inner.next_id += 1;
    inner.todos.insert(todo.id, todo.clone());
    debug!(id = todo.id, "created todo");
    (StatusCode::CREATED, Json(todo))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    let mut inner = db.0.write().await;
    if inner.faulty.contains(&id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todo = inner.todos.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut inner = db.0.write().await;
    if inner.faulty.contains(&id) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match inner.todos.remove(&id) {
        Some(_) => {
            debug!(id, "deleted todo");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
