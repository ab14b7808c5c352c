//! Participant management: eligible users, add (with notification), remove, leave.
//!
//! Add is two-phase: commit the membership change, then attempt dispatch once.
//! A dispatch failure is attached to the outcome as a warning; it never rolls
//! the membership back.

use crate::domain::{
    Conversation, DomainError, MembershipOutcome, NotificationRequest, RemovalOutcome, User,
    UserId,
};
use crate::ports::{ConversationRepo, MembershipPort, NotificationDispatcher, UserDirectory};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Membership service. Implements the `MembershipPort` inbound port.
pub struct MembershipService {
    conversations: Arc<dyn ConversationRepo>,
    users: Arc<dyn UserDirectory>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    discard_empty_conversations: bool,
}

impl MembershipService {
    pub fn new(
        conversations: Arc<dyn ConversationRepo>,
        users: Arc<dyn UserDirectory>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        discard_empty_conversations: bool,
    ) -> Self {
        Self {
            conversations,
            users,
            dispatcher,
            discard_empty_conversations,
        }
    }

    async fn load_conversation(&self, id: Uuid) -> Result<Conversation, DomainError> {
        self.conversations
            .get_conversation(id)
            .await?
            .ok_or_else(|| DomainError::conversation_not_found(id))
    }

    async fn load_user(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .get_user(id)
            .await?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// Shared tail of both add operations; all lookups are done by now.
    async fn add_resolved(
        &self,
        actor: &User,
        conversation: &Conversation,
        user: &User,
    ) -> Result<MembershipOutcome, DomainError> {
        let grew = self
            .conversations
            .add_participant(conversation.id, &user.id)
            .await?;
        if !grew {
            debug!(
                conversation_id = %conversation.id,
                user = %user.id,
                "already a participant, nothing to do"
            );
            return Ok(MembershipOutcome::unchanged());
        }
        info!(
            conversation_id = %conversation.id,
            user = %user.id,
            actor = %actor.id,
            "participant added"
        );

        let request = NotificationRequest::participant_added(&conversation.title, user, actor);
        let warning = match self.dispatcher.dispatch(&request).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    conversation_id = %conversation.id,
                    recipient = %user.email,
                    error = %e,
                    "notification dispatch failed; membership kept"
                );
                Some(match e {
                    DomainError::NotificationDispatchFailed(_) => e,
                    other => DomainError::NotificationDispatchFailed(other.to_string()),
                })
            }
        };

        Ok(MembershipOutcome {
            added: true,
            notification: Some(request),
            warning,
        })
    }
}

#[async_trait::async_trait]
impl MembershipPort for MembershipService {
    async fn list_eligible_users(&self, conversation_id: Uuid) -> Result<Vec<User>, DomainError> {
        if !self.conversations.conversation_exists(conversation_id).await? {
            return Err(DomainError::conversation_not_found(conversation_id));
        }
        self.users.users_not_in(conversation_id).await
    }

    async fn add_participant(
        &self,
        actor: &UserId,
        conversation_id: Uuid,
        user: &UserId,
    ) -> Result<MembershipOutcome, DomainError> {
        let conversation = self.load_conversation(conversation_id).await?;
        let actor = self.load_user(actor).await?;
        let user = self.load_user(user).await?;
        self.add_resolved(&actor, &conversation, &user).await
    }

    async fn add_participant_by_name(
        &self,
        actor: &UserId,
        conversation_id: Uuid,
        user_name: &str,
    ) -> Result<MembershipOutcome, DomainError> {
        let conversation = self.load_conversation(conversation_id).await?;
        let actor = self.load_user(actor).await?;
        let user = self
            .users
            .find_user_by_name(user_name)
            .await?
            .ok_or_else(|| DomainError::user_not_found(user_name))?;
        self.add_resolved(&actor, &conversation, &user).await
    }

    async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user: &UserId,
    ) -> Result<RemovalOutcome, DomainError> {
        if !self.conversations.conversation_exists(conversation_id).await? {
            return Err(DomainError::conversation_not_found(conversation_id));
        }
        let user = self.load_user(user).await?;
        let outcome = self
            .conversations
            .remove_participant(conversation_id, &user.id, self.discard_empty_conversations)
            .await?;
        if outcome.removed {
            info!(
                %conversation_id,
                user = %user.id,
                discarded = outcome.conversation_discarded,
                "participant removed"
            );
        }
        Ok(outcome)
    }

    async fn leave(&self, actor: &UserId, conversation_id: Uuid) -> Result<RemovalOutcome, DomainError> {
        self.remove_participant(conversation_id, actor).await
    }
}
