//! Async driver pairing a `TodoStore` with a host transport.
//!
//! # Design
//! `Session` runs each store operation end to end: `begin_*`, execute the
//! request(s) through the `Transport`, `finish_*`. Batched operations fire
//! every request at once and join with `join_all`, so each request keeps its
//! own outcome and a failure never cancels its siblings. Nothing here
//! spawns; concurrency is cooperative and suspends only inside the
//! transport.

use std::future::Future;
use std::time::Instant;

use futures::future::join_all;
use tracing::debug;

use crate::editor::{Commit, RowEditor};
use crate::error::StoreError;
use crate::http::{HttpRequest, Outcome};
use crate::store::{BatchItem, BatchReport, TodoStore};
use crate::types::{Todo, TodoId};

/// Executes one HTTP round-trip for the core.
///
/// Non-2xx statuses are returned as responses; `Err` is reserved for
/// failures where no response arrived.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> impl Future<Output = Outcome>;
}

pub struct Session<T> {
    store: TodoStore,
    transport: T,
}

impl<T: Transport> Session<T> {
    pub fn new(store: TodoStore, transport: T) -> Self {
        Self { store, transport }
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub async fn load(&mut self) -> Result<(), StoreError> {
        let request = self.store.begin_load();
        let outcome = self.send(request).await;
        self.store.finish_load(outcome, Instant::now())
    }

    pub async fn add(&mut self, title: &str) -> Result<Todo, StoreError> {
        let request = self.store.begin_add(title, Instant::now())?;
        let outcome = self.send(request).await;
        self.store.finish_add(outcome, Instant::now())
    }

    pub async fn remove(&mut self, id: TodoId) -> Result<bool, StoreError> {
        let request = self.store.begin_remove(id)?;
        let outcome = self.send(request).await;
        Ok(self.store.finish_remove(id, outcome, Instant::now()))
    }

    pub async fn clear_completed(&mut self) -> BatchReport {
        let items = self.store.begin_clear_completed();
        let results = self.send_all(items).await;
        self.store.finish_clear_completed(results, Instant::now())
    }

    pub async fn toggle_one(&mut self, id: TodoId) -> Result<bool, StoreError> {
        let request = self.store.begin_toggle(id)?;
        let outcome = self.send(request).await;
        Ok(self.store.finish_toggle(id, outcome, Instant::now()))
    }

    pub async fn toggle_all(&mut self) -> Result<BatchReport, StoreError> {
        let batch = self.store.begin_toggle_all()?;
        let results = self.send_all(batch.items).await;
        Ok(self.store.finish_toggle_all(batch.completed, results, Instant::now()))
    }

    pub async fn rename(&mut self, id: TodoId, title: &str) -> Result<bool, StoreError> {
        let request = self.store.begin_rename(id, title, Instant::now())?;
        let outcome = self.send(request).await;
        Ok(self.store.finish_rename(id, outcome, Instant::now()))
    }

    /// Finish an inline edit: no request for an unchanged title, a rename
    /// for a new one, a delete for a blank one. The editor leaves `Editing`
    /// only when that succeeds.
    pub async fn commit_edit(&mut self, editor: &mut RowEditor) -> Result<(), StoreError> {
        let Some(commit) = editor.commit() else {
            return Ok(());
        };
        let succeeded = match &commit {
            Commit::Unchanged => true,
            Commit::Rename(title) => self.rename(editor.id(), title).await?,
            Commit::Delete => self.remove(editor.id()).await?,
        };
        editor.resolve(&commit, succeeded);
        Ok(())
    }

    async fn send(&self, request: HttpRequest) -> Outcome {
        debug!(method = %request.method, path = %request.path, "sending request");
        self.transport.execute(request).await
    }

    async fn send_all(&self, items: Vec<BatchItem>) -> Vec<(TodoId, Outcome)> {
        let requests = items.into_iter().map(|item| async move {
            let outcome = self.send(item.request).await;
            (item.id, outcome)
        });
        join_all(requests).await
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    use super::*;
    use crate::client::TodoClient;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpResponse};
    use crate::notice::ErrorMessage;

    /// Canned transport: echoes updates, deletes succeed unless the path's
    /// id is listed in `failing`.
    #[derive(Default)]
    struct Scripted {
        todos: Vec<Todo>,
        failing: HashSet<TodoId>,
        offline: bool,
        calls: Cell<usize>,
        log: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn id_of(path: &str) -> TodoId {
            path.rsplit('/').next().and_then(|s| s.parse().ok()).unwrap_or(0)
        }
    }

    impl Transport for Scripted {
        async fn execute(&self, request: HttpRequest) -> Outcome {
            self.calls.set(self.calls.get() + 1);
            self.log.borrow_mut().push(request.clone());
            if self.offline {
                return Err(ApiError::Transport("offline".into()));
            }
            let id = Self::id_of(&request.path);
            if self.failing.contains(&id) {
                return Ok(HttpResponse::new(500, "fault"));
            }
            let current = self.todos.iter().find(|t| t.id == id).cloned();
            Ok(match request.method {
                HttpMethod::Get => HttpResponse::new(200, serde_json::to_string(&self.todos).unwrap()),
                HttpMethod::Post => {
                    let body: serde_json::Value =
                        serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                    let todo = Todo {
                        id: 100,
                        user_id: 42,
                        title: body["title"].as_str().unwrap().to_string(),
                        completed: false,
                    };
                    HttpResponse::new(201, serde_json::to_string(&todo).unwrap())
                }
                HttpMethod::Patch => {
                    let mut todo = current.unwrap();
                    let body: serde_json::Value =
                        serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
                    if let Some(title) = body["title"].as_str() {
                        todo.title = title.to_string();
                    }
                    if let Some(completed) = body["completed"].as_bool() {
                        todo.completed = completed;
                    }
                    HttpResponse::new(200, serde_json::to_string(&todo).unwrap())
                }
                HttpMethod::Delete => HttpResponse::new(204, ""),
            })
        }
    }

    fn todo(id: TodoId, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            user_id: 42,
            title: title.to_string(),
            completed,
        }
    }

    async fn loaded(transport: Scripted) -> Session<Scripted> {
        let mut session = Session::new(TodoStore::new(TodoClient::new("http://api", 42)), transport);
        session.load().await.unwrap();
        session
    }

    #[tokio::test]
    async fn load_populates_from_server() {
        let session = loaded(Scripted {
            todos: vec![todo(1, "a", false), todo(2, "b", true)],
            ..Default::default()
        })
        .await;
        assert_eq!(session.store().todos().len(), 2);
    }

    #[tokio::test]
    async fn offline_load_shows_error() {
        let mut session = Session::new(
            TodoStore::new(TodoClient::new("http://api", 42)),
            Scripted {
                offline: true,
                ..Default::default()
            },
        );
        assert!(session.load().await.is_err());
        assert!(session.store().todos().is_empty());
        assert_eq!(
            session.store().notice(Instant::now()),
            Some(ErrorMessage::UnableToLoad)
        );
    }

    #[tokio::test]
    async fn blank_add_makes_no_call() {
        let mut session = loaded(Scripted::default()).await;
        let before = session.transport.calls.get();
        assert_eq!(session.add("  ").await.unwrap_err(), StoreError::EmptyTitle);
        assert_eq!(session.transport.calls.get(), before);
    }

    #[tokio::test]
    async fn add_appends_one_server_todo() {
        let mut session = loaded(Scripted::default()).await;
        let created = session.add("Buy milk").await.unwrap();
        assert_eq!(created.id, 100);
        assert_eq!(session.store().todos(), &[todo(100, "Buy milk", false)]);
    }

    #[tokio::test]
    async fn clear_completed_with_one_failure() {
        let mut session = loaded(Scripted {
            todos: vec![todo(1, "a", true), todo(2, "b", true), todo(3, "c", true)],
            failing: HashSet::from([2]),
            ..Default::default()
        })
        .await;
        let report = session.clear_completed().await;
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(session.store().todos(), &[todo(2, "b", true)]);
        assert_eq!(
            session.store().notice(Instant::now()),
            Some(ErrorMessage::UnableToDelete)
        );
    }

    #[tokio::test]
    async fn toggle_all_twice_round_trips() {
        let mut session = loaded(Scripted {
            todos: vec![todo(1, "a", true), todo(2, "b", false)],
            ..Default::default()
        })
        .await;
        session.toggle_all().await.unwrap();
        // Only the active todo was sent.
        let patches = session
            .transport
            .log
            .borrow()
            .iter()
            .filter(|r| r.method == HttpMethod::Patch)
            .count();
        assert_eq!(patches, 1);
        assert!(session.store().todos().iter().all(|t| t.completed));

        session.toggle_all().await.unwrap();
        assert!(session.store().todos().iter().all(|t| !t.completed));
    }

    #[tokio::test]
    async fn unchanged_edit_makes_no_call() {
        let mut session = loaded(Scripted {
            todos: vec![todo(1, "Buy milk", false)],
            ..Default::default()
        })
        .await;
        let mut editor = RowEditor::new(&session.store().todos()[0]);
        editor.start_editing();
        editor.set_draft("Buy milk ");
        let before = session.transport.calls.get();
        session.commit_edit(&mut editor).await.unwrap();
        assert_eq!(session.transport.calls.get(), before);
        assert!(!editor.is_editing());
    }

    #[tokio::test]
    async fn blank_edit_deletes_instead_of_updating() {
        let mut session = loaded(Scripted {
            todos: vec![todo(1, "Buy milk", false)],
            ..Default::default()
        })
        .await;
        let mut editor = RowEditor::new(&session.store().todos()[0]);
        editor.start_editing();
        editor.set_draft("");
        session.commit_edit(&mut editor).await.unwrap();
        let last = session.transport.log.borrow().last().cloned().unwrap();
        assert_eq!(last.method, HttpMethod::Delete);
        assert!(session.store().todos().is_empty());
        assert_eq!(editor.state(), crate::editor::EditState::Deleted);
    }

    #[tokio::test]
    async fn failed_rename_keeps_editing() {
        let mut session = loaded(Scripted {
            todos: vec![todo(1, "Buy milk", false)],
            failing: HashSet::from([1]),
            ..Default::default()
        })
        .await;
        let mut editor = RowEditor::new(&session.store().todos()[0]);
        editor.start_editing();
        editor.set_draft("Buy bread");
        session.commit_edit(&mut editor).await.unwrap();
        assert!(editor.is_editing());
        assert_eq!(session.store().todos()[0].title, "Buy milk");
    }
}
