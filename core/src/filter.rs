//! View-only partitions of the todo list.

use std::fmt;
use std::str::FromStr;

use crate::types::Todo;

/// Which todos a view shows. Never affects stored data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(&self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn apply<'a>(&self, todos: &'a [Todo]) -> Vec<&'a Todo> {
        todos.iter().filter(|todo| self.matches(todo)).collect()
    }

    /// Hash route the filter is selected by.
    pub fn route(&self) -> &'static str {
        match self {
            Filter::All => "#/",
            Filter::Active => "#/active",
            Filter::Completed => "#/completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Active => f.write_str("active"),
            Filter::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter: {0}")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    /// Accepts plain names and hash routes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('#').trim_start_matches('/');
        match name.to_ascii_lowercase().as_str() {
            "" | "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            _ => Err(ParseFilterError(s.to_string())),
        }
    }
}

/// Counts the footer and header render from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub active_count: usize,
    pub completed_count: usize,
}

impl Summary {
    pub fn of(todos: &[Todo]) -> Self {
        let completed_count = todos.iter().filter(|todo| todo.completed).count();
        Self {
            total: todos.len(),
            active_count: todos.len() - completed_count,
            completed_count,
        }
    }

    /// True for an empty list, matching the toggle-all button's state.
    pub fn all_completed(&self) -> bool {
        self.active_count == 0
    }

    pub fn has_completed(&self) -> bool {
        self.completed_count > 0
    }

    /// "1 item left" / "3 items left".
    pub fn items_left(&self) -> String {
        match self.active_count {
            1 => "1 item left".to_string(),
            n => format!("{n} items left"),
        }
    }
}
