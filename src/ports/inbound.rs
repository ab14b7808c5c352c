//! Inbound ports. The presentation layer (out of this crate) calls into the application.
//!
//! The acting user's id comes from the caller's session; authentication is not done here.

use crate::domain::{
    Conversation, ConversationDetails, ConversationUpdate, DomainError, MembershipOutcome,
    RemovalOutcome, User, UserId,
};
use uuid::Uuid;

/// Conversation lifecycle: create, edit, list.
#[async_trait::async_trait]
pub trait ConversationsPort: Send + Sync {
    /// Category titles for pickers: courses first, then hobbies.
    async fn category_titles(&self) -> Result<Vec<String>, DomainError>;

    /// Create a conversation in the category named by `category_label`, with `actor`
    /// as the only participant.
    async fn create_conversation(
        &self,
        actor: &UserId,
        title: &str,
        category_label: &str,
    ) -> Result<Conversation, DomainError>;

    /// Edit title and/or category under optimistic concurrency.
    async fn update_conversation(
        &self,
        id: Uuid,
        update: ConversationUpdate,
    ) -> Result<Conversation, DomainError>;

    /// The actor's conversations, optionally restricted to one category title.
    async fn list_conversations(
        &self,
        actor: &UserId,
        category: Option<&str>,
    ) -> Result<Vec<Conversation>, DomainError>;

    /// Conversation with resolved participants and the users that could be added.
    async fn conversation_details(&self, id: Uuid) -> Result<ConversationDetails, DomainError>;
}

/// Participant management.
#[async_trait::async_trait]
pub trait MembershipPort: Send + Sync {
    /// Users not currently in the conversation. Recomputed on every call.
    async fn list_eligible_users(&self, conversation_id: Uuid) -> Result<Vec<User>, DomainError>;

    /// Idempotent add. Notifies the added user only when membership actually grew.
    async fn add_participant(
        &self,
        actor: &UserId,
        conversation_id: Uuid,
        user: &UserId,
    ) -> Result<MembershipOutcome, DomainError>;

    /// Same as `add_participant`, looking the user up by display name.
    async fn add_participant_by_name(
        &self,
        actor: &UserId,
        conversation_id: Uuid,
        user_name: &str,
    ) -> Result<MembershipOutcome, DomainError>;

    /// Removing a non-member is a no-op.
    async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user: &UserId,
    ) -> Result<RemovalOutcome, DomainError>;

    /// The actor leaves the conversation.
    async fn leave(&self, actor: &UserId, conversation_id: Uuid) -> Result<RemovalOutcome, DomainError>;
}
