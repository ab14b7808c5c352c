//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Category, Conversation, DomainError, RemovalOutcome, User, UserId};
use uuid::Uuid;

/// Category storage. Categories are written once (seed) and only read afterwards.
#[async_trait::async_trait]
pub trait CategoryRepo: Send + Sync {
    /// True if at least one category row exists.
    async fn has_categories(&self) -> Result<bool, DomainError>;

    /// Insert `categories` only if the store holds none yet. The existence check and
    /// the insert happen under one storage transaction. Returns the number inserted
    /// (0 when seeding was skipped).
    async fn seed_if_empty(&self, categories: &[Category]) -> Result<usize, DomainError>;

    /// All categories in insertion order.
    async fn list_categories(&self) -> Result<Vec<Category>, DomainError>;
}

/// Conversation and participant storage.
#[async_trait::async_trait]
pub trait ConversationRepo: Send + Sync {
    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, DomainError>;

    async fn conversation_exists(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Persist a new conversation together with its initial participants.
    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), DomainError>;

    /// Write title and category if the stored version still equals `expected_version`.
    /// Returns the new version. A mismatch (or a vanished row) is
    /// `DomainError::ConcurrencyConflict`; the caller decides whether it was a delete.
    async fn update_conversation(
        &self,
        conversation: &Conversation,
        expected_version: u64,
    ) -> Result<u64, DomainError>;

    /// Conversations `user` participates in, ordered by title.
    async fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, DomainError>;

    /// Add `user` to the participant set. Returns true only if the set grew.
    async fn add_participant(&self, conversation_id: Uuid, user: &UserId) -> Result<bool, DomainError>;

    /// Remove `user` from the participant set. With `discard_if_empty`, a removal that
    /// empties the set deletes the conversation in the same transaction.
    async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user: &UserId,
        discard_if_empty: bool,
    ) -> Result<RemovalOutcome, DomainError>;
}

/// Read access to users mirrored from the identity system.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, DomainError>;

    /// All users ordered by display name.
    async fn list_users(&self) -> Result<Vec<User>, DomainError>;

    /// Users that are not participants of the conversation, ordered by display name.
    /// Always answered from storage; never cached.
    async fn users_not_in(&self, conversation_id: Uuid) -> Result<Vec<User>, DomainError>;

    /// Mirror a user record from the identity system.
    async fn upsert_user(&self, user: &User) -> Result<(), DomainError>;
}
