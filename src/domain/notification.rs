//! Notification requests handed to the dispatcher when a participant is added.

use super::entities::User;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Local-time format used for `sent_at`.
pub const SENT_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire shape accepted by the dispatcher: `{title, sentAt, recipients, message}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub title: String,
    pub sent_at: String,
    pub recipients: Vec<String>,
    pub message: String,
}

impl NotificationRequest {
    /// "Added to {title}" for `added`, stamped with the current local time.
    pub fn participant_added(conversation_title: &str, added: &User, actor: &User) -> Self {
        Self::participant_added_at(conversation_title, added, actor, Local::now())
    }

    pub fn participant_added_at(
        conversation_title: &str,
        added: &User,
        actor: &User,
        at: DateTime<Local>,
    ) -> Self {
        Self {
            title: format!("Added to {}", conversation_title),
            sent_at: at.format(SENT_AT_FORMAT).to_string(),
            recipients: vec![added.email.clone()],
            message: format!(
                "You have been added to {} by {}",
                conversation_title, actor.user_name
            ),
        }
    }
}
