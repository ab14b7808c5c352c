//! Notification outbound ports. Hand add-notifications to whatever delivers them.

use crate::domain::{DomainError, NotificationRequest};

/// Accepts notification requests from the core.
///
/// Single attempt, no hidden retries. Implementations should return quickly: the
/// membership response waits for this call. Any error is reported to the caller as
/// a warning; the membership change stays committed.
#[async_trait::async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn dispatch(&self, request: &NotificationRequest) -> Result<(), DomainError>;
}

/// Delivers a notification to its recipients (push channel, webhook, log).
///
/// Used by the notification worker behind a queued dispatcher; the core never calls
/// a transport directly.
#[async_trait::async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(&self, request: &NotificationRequest) -> Result<(), DomainError>;
}
