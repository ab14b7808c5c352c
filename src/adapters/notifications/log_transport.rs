//! Log-only transport. Implements NotificationTransport when no webhook is configured.
//!
//! Writes each request to the tracing log instead of delivering it.

use crate::domain::{DomainError, NotificationRequest};
use crate::ports::NotificationTransport;
use async_trait::async_trait;
use tracing::info;

pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(&self, request: &NotificationRequest) -> Result<(), DomainError> {
        info!(
            title = %request.title,
            sent_at = %request.sent_at,
            recipients = ?request.recipients,
            message = %request.message,
            "notification (log transport)"
        );
        Ok(())
    }
}
