//! Transient error banner shown to the user.
//!
//! A notice expires `NOTICE_TTL` after it was raised. The caller supplies
//! `Instant`s, so expiry is deterministic under test.

use std::fmt;
use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// The fixed set of messages the user can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    UnableToLoad,
    EmptyTitle,
    UnableToAdd,
    UnableToDelete,
    UnableToUpdate,
}

impl ErrorMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMessage::UnableToLoad => "Unable to load todos",
            ErrorMessage::EmptyTitle => "Title should not be empty",
            ErrorMessage::UnableToAdd => "Unable to add a todo",
            ErrorMessage::UnableToDelete => "Unable to delete a todo",
            ErrorMessage::UnableToUpdate => "Unable to update a todo",
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub message: ErrorMessage,
    pub raised_at: Instant,
}

impl Notice {
    pub fn new(message: ErrorMessage, raised_at: Instant) -> Self {
        Self { message, raised_at }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.raised_at) >= NOTICE_TTL
    }
}
