//! Async task: reads NotificationRequest from the mpsc channel and delivers it.
//!
//! Runs beside the request handlers so delivery latency never reaches the
//! membership response. Single attempt per request; failures are logged.

use crate::domain::NotificationRequest;
use crate::ports::NotificationTransport;
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Maximum concurrent deliveries.
const MAX_CONCURRENT: usize = 4;

/// Notification worker. Consumes the channel and delivers via a NotificationTransport.
pub struct NotificationWorker {
    transport: Arc<dyn NotificationTransport>,
    rx: mpsc::Receiver<NotificationRequest>,
}

impl NotificationWorker {
    pub fn new(transport: Arc<dyn NotificationTransport>, rx: mpsc::Receiver<NotificationRequest>) -> Self {
        Self { transport, rx }
    }

    /// Run the worker. Processes until every sender is dropped, then waits for
    /// in-flight deliveries. Returns the number of successful deliveries.
    pub async fn run(mut self) -> usize {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT));
        let mut inflight = JoinSet::new();

        while let Some(request) = self.rx.recv().await {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let transport = Arc::clone(&self.transport);
            inflight.spawn(async move {
                let _permit = permit;
                match transport.deliver(&request).await {
                    Ok(()) => {
                        debug!(title = %request.title, recipients = ?request.recipients, "notification delivered");
                        true
                    }
                    Err(e) => {
                        error!(title = %request.title, error = %e, "notification delivery failed");
                        false
                    }
                }
            });
        }

        let mut delivered = 0;
        while let Some(res) = inflight.join_next().await {
            if matches!(res, Ok(true)) {
                delivered += 1;
            }
        }
        info!(delivered, "notification worker finished (channel closed)");
        delivered
    }
}
