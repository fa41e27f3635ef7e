//! Per-row inline title editing.
//!
//! ```text
//! Viewing --start_editing--> Editing --resolve(ok)--> Viewing | Deleted
//!    ^                          |
//!    +---------cancel-----------+
//! ```
//!
//! `commit` decides what a finished edit means; the caller runs the matching
//! store operation and feeds the result back through `resolve`. A failed
//! rename or delete leaves the row in `Editing`.

use crate::types::{Todo, TodoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    Editing,
    Deleted,
}

/// What committing the current draft requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    /// The trimmed draft equals the current title; no request needed.
    Unchanged,
    Rename(String),
    /// The draft is blank; the row goes away instead.
    Delete,
}

#[derive(Debug, Clone)]
pub struct RowEditor {
    id: TodoId,
    title: String,
    draft: String,
    state: EditState,
}

impl RowEditor {
    pub fn new(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            draft: todo.title.clone(),
            state: EditState::Viewing,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        self.state == EditState::Editing
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Double-click on the title.
    pub fn start_editing(&mut self) {
        if self.state == EditState::Viewing {
            self.draft = self.title.clone();
            self.state = EditState::Editing;
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.is_editing() {
            self.draft = text.into();
        }
    }

    /// Escape: revert the draft without committing.
    pub fn cancel(&mut self) {
        if self.is_editing() {
            self.draft = self.title.clone();
            self.state = EditState::Viewing;
        }
    }

    /// Enter or blur. `None` when the row is not being edited.
    pub fn commit(&self) -> Option<Commit> {
        if !self.is_editing() {
            return None;
        }
        let trimmed = self.draft.trim();
        Some(if trimmed.is_empty() {
            Commit::Delete
        } else if trimmed == self.title.trim() {
            Commit::Unchanged
        } else {
            Commit::Rename(trimmed.to_string())
        })
    }

    /// Apply the outcome of the request `commit` called for. `Unchanged`
    /// always succeeds.
    pub fn resolve(&mut self, commit: &Commit, succeeded: bool) {
        if !self.is_editing() {
            return;
        }
        match commit {
            Commit::Unchanged => {
                self.draft = self.title.clone();
                self.state = EditState::Viewing;
            }
            Commit::Rename(title) if succeeded => {
                self.title = title.clone();
                self.draft = title.clone();
                self.state = EditState::Viewing;
            }
            Commit::Delete if succeeded => self.state = EditState::Deleted,
            _ => {}
        }
    }
}
