//! Conversation aggregate. One category, a set of participants, a version for
//! optimistic concurrency.

use super::entities::{Category, User, UserId};
use super::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Version assigned to a freshly created conversation.
pub const INITIAL_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub category: Category,
    pub participants: BTreeSet<UserId>,
    /// Bumped on every committed title/category edit. Membership does not touch it.
    pub version: u64,
}

impl Conversation {
    /// New conversation with the creator as its only participant.
    pub fn create(title: impl Into<String>, category: Category, creator: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category,
            participants: BTreeSet::from([creator]),
            version: INITIAL_VERSION,
        }
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn recategorize(&mut self, category: Category) {
        self.category = category;
    }

    /// Returns true only when the set grew.
    pub fn add_participant(&mut self, user: UserId) -> bool {
        self.participants.insert(user)
    }

    /// Returns true only when the user was a member.
    pub fn remove_participant(&mut self, user: &UserId) -> bool {
        self.participants.remove(user)
    }

    pub fn is_participant(&self, user: &UserId) -> bool {
        self.participants.contains(user)
    }

    pub fn has_participants(&self) -> bool {
        !self.participants.is_empty()
    }
}

/// Trimmed, non-empty conversation title.
pub fn normalize_title(raw: &str) -> Result<String, DomainError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(DomainError::InvalidInput(
            "conversation title must not be empty".into(),
        ));
    }
    Ok(title.to_string())
}

/// Edit request for an existing conversation. `expected_version` is the version
/// the caller read; the commit is rejected if storage has moved on.
#[derive(Debug, Clone, Default)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub category_label: Option<String>,
    pub expected_version: u64,
}

/// Everything the edit view needs in one read.
#[derive(Debug, Clone)]
pub struct ConversationDetails {
    pub conversation: Conversation,
    pub participants: Vec<User>,
    pub eligible_users: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CategoryKind;

    fn maths() -> Category {
        Category::new(CategoryKind::Course, "Maths")
    }

    #[test]
    fn test_create_has_creator_as_sole_participant() {
        let conv = Conversation::create("Study Group", maths(), UserId::from("user-a"));
        assert_eq!(conv.title, "Study Group");
        assert_eq!(conv.category.title, "Maths");
        assert_eq!(conv.participants, BTreeSet::from([UserId::from("user-a")]));
        assert_eq!(conv.version, INITIAL_VERSION);
    }

    #[test]
    fn test_participants_have_set_semantics() {
        let mut conv = Conversation::create("Study Group", maths(), UserId::from("user-a"));
        assert!(conv.add_participant(UserId::from("user-b")));
        assert!(!conv.add_participant(UserId::from("user-b")));
        assert_eq!(conv.participants.len(), 2);

        assert!(!conv.remove_participant(&UserId::from("user-c")));
        assert!(conv.remove_participant(&UserId::from("user-a")));
        assert!(conv.remove_participant(&UserId::from("user-b")));
        assert!(!conv.has_participants());
    }

    #[test]
    fn test_recategorize_replaces_the_single_category() {
        let mut conv = Conversation::create("Jam", maths(), UserId::from("user-a"));
        conv.recategorize(Category::new(CategoryKind::Hobby, "Music"));
        assert_eq!(conv.category.kind, CategoryKind::Hobby);
        assert_eq!(conv.category.title, "Music");
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Study Group ").unwrap(), "Study Group");
        assert!(matches!(
            normalize_title("   "),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
