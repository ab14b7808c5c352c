//! Webhook transport. Implements NotificationTransport by POSTing the request as JSON
//! to the portal's push endpoint, which fans it out to connected clients.

use crate::domain::{DomainError, NotificationRequest};
use crate::ports::NotificationTransport;
use reqwest::Client;
use std::time::Duration;

/// Per-request timeout; the worker makes one attempt and moves on.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP webhook transport.
///
/// Body is `{"title", "sentAt", "recipients", "message"}`. An optional bearer token
/// is sent in the Authorization header.
pub struct WebhookTransport {
    client: Client,
    url: String,
    token: Option<String>,
}

impl WebhookTransport {
    /// Create a new webhook transport.
    ///
    /// # Arguments
    /// * `url` - Endpoint accepting notification requests
    /// * `token` - Optional bearer token
    pub fn new(url: String, token: Option<String>) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client, url, token })
    }
}

#[async_trait::async_trait]
impl NotificationTransport for WebhookTransport {
    async fn deliver(&self, request: &NotificationRequest) -> Result<(), DomainError> {
        let mut req = self.client.post(&self.url).json(request);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let res = req
            .send()
            .await
            .map_err(|e| DomainError::NotificationDispatchFailed(format!("Request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_else(|_| "unknown".to_string());
            return Err(DomainError::NotificationDispatchFailed(format!(
                "Webhook error {}: {}",
                status, text
            )));
        }

        Ok(())
    }
}
