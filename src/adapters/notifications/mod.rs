//! Notification adapters: queued dispatcher and delivery transports.

pub mod channel_dispatcher;
pub mod log_transport;
pub mod webhook;

pub use channel_dispatcher::ChannelDispatcher;
pub use log_transport::LogTransport;
pub use webhook::WebhookTransport;
