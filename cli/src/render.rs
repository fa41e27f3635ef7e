//! Plain-text view of the store.

use std::fmt::Write;
use std::time::Instant;

use todos_core::{Filter, Todo, TodoStore};

fn row(out: &mut String, todo: &Todo, busy: bool) {
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    let id = if todo.is_temp() {
        "...".to_string()
    } else {
        todo.id.to_string()
    };
    let suffix = if busy || todo.is_temp() { "  (saving)" } else { "" };
    let _ = writeln!(out, "{mark} {id:>4}  {}{suffix}", todo.title);
}

/// Rows for `filter`, the pending placeholder, the footer, and the current
/// notice if one is still visible at `now`.
pub fn render(store: &TodoStore, filter: Filter, now: Instant) -> String {
    let mut out = String::new();
    for todo in store.visible(filter) {
        row(&mut out, todo, store.is_busy(todo.id));
    }
    if let Some(temp) = store.temp_todo() {
        row(&mut out, temp, true);
    }

    let summary = store.summary();
    if summary.total > 0 {
        let _ = write!(out, "{}  [{filter}]", summary.items_left());
        if summary.has_completed() {
            let _ = write!(out, "  clear-completed: {}", summary.completed_count);
        }
        out.push('\n');
    }

    if let Some(message) = store.notice(now) {
        let _ = writeln!(out, "! {message}");
    }
    out
}
