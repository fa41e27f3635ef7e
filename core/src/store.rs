//! The root state container.
//!
//! # Design
//! `TodoStore` owns the authoritative list and every flag the view renders
//! from. It never performs I/O. Each operation is split in two:
//!
//! - `begin_*` applies the tentative state (placeholder row, loading flag,
//!   in-flight markers) and returns the request(s) the host must execute.
//! - `finish_*` consumes the host's `Outcome`(s) and either commits the
//!   server's answer or reverts, raising a notice on failure.
//!
//! Every `finish_*` releases the loading flag and the in-flight markers its
//! `begin_*` set, whatever the outcome. Batched operations report each
//! request individually; successes stick even when siblings fail.

use std::collections::BTreeSet;
use std::time::Instant;

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::error::{ApiError, StoreError};
use crate::filter::{Filter, Summary};
use crate::http::{HttpRequest, Outcome};
use crate::notice::{ErrorMessage, Notice};
use crate::types::{Todo, TodoId, UpdateTodo};

/// One request of a batched operation, tagged with the todo it targets.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub id: TodoId,
    pub request: HttpRequest,
}

/// Requests produced by `begin_toggle_all`.
#[derive(Debug, Clone)]
pub struct ToggleAll {
    /// The completed flag every targeted todo is being set to.
    pub completed: bool,
    pub items: Vec<BatchItem>,
}

/// Per-item result of a batched operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<TodoId>,
    pub failed: Vec<(TodoId, ApiError)>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TodoStore {
    client: TodoClient,
    todos: Vec<Todo>,
    temp_todo: Option<Todo>,
    /// Operations between `begin_*` and `finish_*`.
    pending: usize,
    busy: BTreeSet<TodoId>,
    should_focus: bool,
    notice: Option<Notice>,
}

impl TodoStore {
    pub fn new(client: TodoClient) -> Self {
        Self {
            client,
            todos: Vec::new(),
            temp_todo: None,
            pending: 0,
            busy: BTreeSet::new(),
            should_focus: true,
            notice: None,
        }
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn find(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Placeholder for a create request still in flight.
    pub fn temp_todo(&self) -> Option<&Todo> {
        self.temp_todo.as_ref()
    }

    pub fn visible(&self, filter: Filter) -> Vec<&Todo> {
        filter.apply(&self.todos)
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.todos)
    }

    pub fn is_loading(&self) -> bool {
        self.pending > 0
    }

    /// Whether a request targeting `id` is in flight.
    pub fn is_busy(&self, id: TodoId) -> bool {
        self.busy.contains(&id)
    }

    pub fn busy_ids(&self) -> impl Iterator<Item = TodoId> + '_ {
        self.busy.iter().copied()
    }

    /// Whether the new-todo input should hold focus.
    pub fn should_focus(&self) -> bool {
        self.should_focus && !self.is_loading()
    }

    /// The visible error message, if one was raised less than
    /// `NOTICE_TTL` before `now`.
    pub fn notice(&self, now: Instant) -> Option<ErrorMessage> {
        self.notice
            .filter(|notice| !notice.is_expired(now))
            .map(|notice| notice.message)
    }

    /// Drop the notice once it has expired.
    pub fn expire_notice(&mut self, now: Instant) {
        if self.notice.is_some_and(|notice| notice.is_expired(now)) {
            self.notice = None;
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Surface `message`, replacing any current notice.
    pub fn raise(&mut self, message: ErrorMessage, now: Instant) {
        self.notice = Some(Notice::new(message, now));
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    pub fn begin_load(&mut self) -> HttpRequest {
        self.start();
        self.client.build_list_todos()
    }

    /// Replaces the list with exactly the server's array. On failure the
    /// previous list is left untouched.
    pub fn finish_load(&mut self, outcome: Outcome, now: Instant) -> Result<(), StoreError> {
        self.settle();
        match outcome.and_then(|response| self.client.parse_list_todos(response)) {
            Ok(todos) => {
                debug!(count = todos.len(), "loaded todos");
                self.todos = todos;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load todos");
                self.raise(ErrorMessage::UnableToLoad, now);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Add
    // -----------------------------------------------------------------------

    /// An empty or whitespace-only title never reaches the network.
    pub fn begin_add(&mut self, title: &str, now: Instant) -> Result<HttpRequest, StoreError> {
        self.dismiss_notice();
        let title = title.trim();
        if title.is_empty() {
            self.raise(ErrorMessage::EmptyTitle, now);
            return Err(StoreError::EmptyTitle);
        }
        let request = self.client.build_create_todo(title)?;
        self.temp_todo = Some(Todo::placeholder(self.client.user_id(), title));
        self.pending += 1;
        Ok(request)
    }

    /// Returns the created todo, or the error so the caller can keep its
    /// input intact.
    pub fn finish_add(&mut self, outcome: Outcome, now: Instant) -> Result<Todo, StoreError> {
        self.temp_todo = None;
        self.settle();
        self.should_focus = true;
        match outcome.and_then(|response| self.client.parse_create_todo(response)) {
            Ok(todo) => {
                debug!(id = todo.id, "created todo");
                self.todos.push(todo.clone());
                Ok(todo)
            }
            Err(e) => {
                warn!(error = %e, "failed to create todo");
                self.raise(ErrorMessage::UnableToAdd, now);
                Err(e.into())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Remove
    // -----------------------------------------------------------------------

    pub fn begin_remove(&mut self, id: TodoId) -> Result<HttpRequest, StoreError> {
        self.require(id)?;
        self.start();
        self.busy.insert(id);
        Ok(self.client.build_delete_todo(id))
    }

    /// True when the server confirmed the deletion and the row is gone.
    pub fn finish_remove(&mut self, id: TodoId, outcome: Outcome, now: Instant) -> bool {
        self.busy.remove(&id);
        self.settle();
        self.should_focus = true;
        match outcome.and_then(|response| self.client.parse_delete_todo(response)) {
            Ok(()) => {
                debug!(id, "deleted todo");
                self.todos.retain(|todo| todo.id != id);
                true
            }
            Err(e) => {
                warn!(id, error = %e, "failed to delete todo");
                self.raise(ErrorMessage::UnableToDelete, now);
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Clear completed
    // -----------------------------------------------------------------------

    /// One delete per completed todo. Every returned item must be reported
    /// back to `finish_clear_completed`.
    pub fn begin_clear_completed(&mut self) -> Vec<BatchItem> {
        self.start();
        self.should_focus = false;
        let items: Vec<BatchItem> = self
            .todos
            .iter()
            .filter(|todo| todo.completed)
            .map(|todo| BatchItem {
                id: todo.id,
                request: self.client.build_delete_todo(todo.id),
            })
            .collect();
        self.busy.extend(items.iter().map(|item| item.id));
        items
    }

    pub fn finish_clear_completed(&mut self, results: Vec<(TodoId, Outcome)>, now: Instant) -> BatchReport {
        let mut report = BatchReport::default();
        for (id, outcome) in results {
            self.busy.remove(&id);
            match outcome.and_then(|response| self.client.parse_delete_todo(response)) {
                Ok(()) => report.succeeded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        self.todos.retain(|todo| !report.succeeded.contains(&todo.id));
        self.settle();
        self.should_focus = true;
        if !report.all_succeeded() {
            warn!(failed = report.failed.len(), "some completed todos could not be deleted");
            self.raise(ErrorMessage::UnableToDelete, now);
        }
        report
    }

    // -----------------------------------------------------------------------
    // Toggle
    // -----------------------------------------------------------------------

    pub fn begin_toggle(&mut self, id: TodoId) -> Result<HttpRequest, StoreError> {
        let completed = self.require(id)?.completed;
        let request = self.client.build_update_todo(id, &UpdateTodo::completed(!completed))?;
        self.start();
        self.busy.insert(id);
        Ok(request)
    }

    pub fn finish_toggle(&mut self, id: TodoId, outcome: Outcome, now: Instant) -> bool {
        self.finish_update(id, outcome, now)
    }

    /// If any todo is active, completes the active ones; otherwise marks
    /// every todo active. Only the todos whose flag changes are targeted.
    pub fn begin_toggle_all(&mut self) -> Result<ToggleAll, StoreError> {
        let completed = self.todos.iter().any(|todo| !todo.completed);
        let mut items = Vec::new();
        for todo in self.todos.iter().filter(|todo| todo.completed != completed) {
            items.push(BatchItem {
                id: todo.id,
                request: self.client.build_update_todo(todo.id, &UpdateTodo::completed(completed))?,
            });
        }
        self.start();
        self.should_focus = false;
        self.busy.extend(items.iter().map(|item| item.id));
        Ok(ToggleAll { completed, items })
    }

    /// Sets `completed` on the todos whose update succeeded. The flag is
    /// assigned rather than flipped, so overlapping calls converge.
    pub fn finish_toggle_all(
        &mut self,
        completed: bool,
        results: Vec<(TodoId, Outcome)>,
        now: Instant,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (id, outcome) in results {
            self.busy.remove(&id);
            match outcome.and_then(|response| self.client.parse_update_todo(response)) {
                Ok(_) => report.succeeded.push(id),
                Err(e) => report.failed.push((id, e)),
            }
        }
        for todo in self.todos.iter_mut().filter(|todo| report.succeeded.contains(&todo.id)) {
            todo.completed = completed;
        }
        self.settle();
        self.should_focus = true;
        if !report.all_succeeded() {
            warn!(failed = report.failed.len(), "some todos could not be toggled");
            self.raise(ErrorMessage::UnableToUpdate, now);
        }
        report
    }

    // -----------------------------------------------------------------------
    // Rename
    // -----------------------------------------------------------------------

    pub fn begin_rename(&mut self, id: TodoId, title: &str, now: Instant) -> Result<HttpRequest, StoreError> {
        self.require(id)?;
        if title.trim().is_empty() {
            self.raise(ErrorMessage::EmptyTitle, now);
            return Err(StoreError::EmptyTitle);
        }
        let request = self.client.build_update_todo(id, &UpdateTodo::title(title))?;
        self.start();
        self.busy.insert(id);
        Ok(request)
    }

    /// True when the new title was committed.
    pub fn finish_rename(&mut self, id: TodoId, outcome: Outcome, now: Instant) -> bool {
        self.finish_update(id, outcome, now)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// A user action begins: the current notice goes away.
    fn start(&mut self) {
        self.dismiss_notice();
        self.pending += 1;
    }

    fn settle(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    fn require(&self, id: TodoId) -> Result<&Todo, StoreError> {
        self.todos
            .iter()
            .find(|todo| todo.id == id)
            .ok_or(StoreError::UnknownTodo(id))
    }

    fn finish_update(&mut self, id: TodoId, outcome: Outcome, now: Instant) -> bool {
        self.busy.remove(&id);
        self.settle();
        match outcome.and_then(|response| self.client.parse_update_todo(response)) {
            Ok(updated) => {
                debug!(id, "updated todo");
                if let Some(slot) = self.todos.iter_mut().find(|todo| todo.id == updated.id) {
                    *slot = updated;
                }
                true
            }
            Err(e) => {
                warn!(id, error = %e, "failed to update todo");
                self.raise(ErrorMessage::UnableToUpdate, now);
                false
            }
        }
    }
}
