//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by the presentation layer into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod notification;
pub mod outbound;

pub use inbound::{ConversationsPort, MembershipPort};
pub use notification::{NotificationDispatcher, NotificationTransport};
pub use outbound::{CategoryRepo, ConversationRepo, UserDirectory};
