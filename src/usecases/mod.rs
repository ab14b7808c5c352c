//! Application use cases. Orchestrate domain logic via ports.

pub mod category_service;
pub mod conversation_service;
pub mod membership_service;
pub mod notification_worker;

pub use category_service::CategoryService;
pub use conversation_service::ConversationService;
pub use membership_service::MembershipService;
pub use notification_worker::NotificationWorker;
