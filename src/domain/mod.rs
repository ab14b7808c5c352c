//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod catalog;
pub mod conversation;
pub mod entities;
pub mod errors;
pub mod membership;
pub mod notification;

pub use catalog::CategoryCatalog;
pub use conversation::{Conversation, ConversationDetails, ConversationUpdate, normalize_title};
pub use entities::{COURSE_TITLES, Category, CategoryKind, HOBBY_TITLES, User, UserId};
pub use errors::DomainError;
pub use membership::{MembershipOutcome, RemovalOutcome};
pub use notification::NotificationRequest;
