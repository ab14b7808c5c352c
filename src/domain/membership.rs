//! Results of membership changes.

use super::errors::DomainError;
use super::notification::NotificationRequest;

/// Outcome of adding a participant.
///
/// `added` is false when the user was already a member; nothing is dispatched then.
/// A dispatch failure does not undo the write: it shows up in `warning`.
#[derive(Debug, Default)]
pub struct MembershipOutcome {
    pub added: bool,
    pub notification: Option<NotificationRequest>,
    pub warning: Option<DomainError>,
}

impl MembershipOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn notified(&self) -> bool {
        self.notification.is_some() && self.warning.is_none()
    }
}

/// Outcome of removing a participant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovalOutcome {
    /// False when the user was not a member (no-op).
    pub removed: bool,
    /// The removal emptied the conversation and it was deleted with it.
    pub conversation_discarded: bool,
}
