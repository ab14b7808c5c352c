//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Label matches no seeded course or hobby title.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stored version moved on since the caller read the conversation. Re-read and retry.
    #[error("Concurrency conflict on conversation {id}: expected version {expected}")]
    ConcurrencyConflict { id: Uuid, expected: u64 },

    /// Non-fatal: only ever surfaced as a warning next to a committed membership change.
    #[error("Notification dispatch failed: {0}")]
    NotificationDispatchFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Repository error: {0}")]
    Repo(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn conversation_not_found(id: Uuid) -> Self {
        DomainError::NotFound {
            entity: "Conversation",
            id: id.to_string(),
        }
    }

    pub fn user_not_found(id: impl ToString) -> Self {
        DomainError::NotFound {
            entity: "User",
            id: id.to_string(),
        }
    }

    /// True for outcomes the presentation layer should render as "not found".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::NotFound { .. } | DomainError::CategoryNotFound(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::ConcurrencyConflict { .. })
    }
}
