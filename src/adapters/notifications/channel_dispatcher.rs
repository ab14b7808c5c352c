//! Queued dispatcher. Implements NotificationDispatcher by handing requests to a
//! bounded channel drained by `NotificationWorker`.
//!
//! `dispatch` never waits: a full or closed queue is an immediate failure, which
//! the membership service reports as a warning.

use crate::domain::{DomainError, NotificationRequest};
use crate::ports::NotificationDispatcher;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

pub struct ChannelDispatcher {
    tx: mpsc::Sender<NotificationRequest>,
}

impl ChannelDispatcher {
    /// Dispatcher plus the receiver to hand to `NotificationWorker::new`.
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<NotificationRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait::async_trait]
impl NotificationDispatcher for ChannelDispatcher {
    async fn dispatch(&self, request: &NotificationRequest) -> Result<(), DomainError> {
        match self.tx.try_send(request.clone()) {
            Ok(()) => {
                debug!(title = %request.title, "notification queued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(DomainError::NotificationDispatchFailed(
                "notification queue is full".into(),
            )),
            Err(TrySendError::Closed(_)) => Err(DomainError::NotificationDispatchFailed(
                "notification worker has stopped".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    fn request() -> NotificationRequest {
        let alice = User::new("a", "alice", "alice@lab.example");
        let bob = User::new("b", "bob", "bob@lab.example");
        NotificationRequest::participant_added("Study Group", &bob, &alice)
    }

    #[tokio::test]
    async fn test_dispatch_enqueues() {
        let (dispatcher, mut rx) = ChannelDispatcher::bounded(2);
        let req = request();
        dispatcher.dispatch(&req).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), req);
    }

    #[tokio::test]
    async fn test_full_queue_fails_fast() {
        let (dispatcher, _rx) = ChannelDispatcher::bounded(1);
        dispatcher.dispatch(&request()).await.unwrap();
        let err = dispatcher.dispatch(&request()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotificationDispatchFailed(ref m) if m.contains("full")));
    }

    #[tokio::test]
    async fn test_closed_queue_fails_fast() {
        let (dispatcher, rx) = ChannelDispatcher::bounded(4);
        drop(rx);
        let err = dispatcher.dispatch(&request()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotificationDispatchFailed(ref m) if m.contains("stopped")));
    }
}
