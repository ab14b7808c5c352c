//! In-process store implementing CategoryRepo, ConversationRepo and UserDirectory.
//!
//! Everything lives behind one `tokio::sync::RwLock`, so each port call is atomic.
//! Used for tests and for `storage = "memory"` runs; nothing survives a restart.

use crate::domain::{Category, Conversation, DomainError, RemovalOutcome, User, UserId};
use crate::ports::{CategoryRepo, ConversationRepo, UserDirectory};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    categories: Vec<Category>,
    users: BTreeMap<UserId, User>,
    conversations: HashMap<Uuid, Conversation>,
}

/// Memory-backed repository.
#[derive(Debug, Default)]
pub struct InMemoryRepo {
    store: RwLock<Store>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            store: RwLock::new(Store {
                users,
                ..Store::default()
            }),
        }
    }
}

fn sorted_by_name(mut users: Vec<User>) -> Vec<User> {
    users.sort_by(|a, b| a.user_name.cmp(&b.user_name));
    users
}

#[async_trait::async_trait]
impl CategoryRepo for InMemoryRepo {
    async fn has_categories(&self) -> Result<bool, DomainError> {
        Ok(!self.store.read().await.categories.is_empty())
    }

    async fn seed_if_empty(&self, categories: &[Category]) -> Result<usize, DomainError> {
        let mut store = self.store.write().await;
        if !store.categories.is_empty() {
            return Ok(0);
        }
        store.categories.extend_from_slice(categories);
        Ok(categories.len())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.store.read().await.categories.clone())
    }
}

#[async_trait::async_trait]
impl ConversationRepo for InMemoryRepo {
    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, DomainError> {
        Ok(self.store.read().await.conversations.get(&id).cloned())
    }

    async fn conversation_exists(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.store.read().await.conversations.contains_key(&id))
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        if store.conversations.contains_key(&conversation.id) {
            return Err(DomainError::Repo(format!(
                "conversation {} already exists",
                conversation.id
            )));
        }
        store
            .conversations
            .insert(conversation.id, conversation.clone());
        Ok(())
    }

    async fn update_conversation(
        &self,
        conversation: &Conversation,
        expected_version: u64,
    ) -> Result<u64, DomainError> {
        let conflict = || DomainError::ConcurrencyConflict {
            id: conversation.id,
            expected: expected_version,
        };
        let next = expected_version.checked_add(1).ok_or_else(conflict)?;
        let mut store = self.store.write().await;
        let stored = match store.conversations.get_mut(&conversation.id) {
            Some(c) if c.version == expected_version => c,
            _ => return Err(conflict()),
        };
        stored.title = conversation.title.clone();
        stored.category = conversation.category.clone();
        stored.version = next;
        Ok(stored.version)
    }

    async fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, DomainError> {
        let store = self.store.read().await;
        let mut out: Vec<Conversation> = store
            .conversations
            .values()
            .filter(|c| c.is_participant(user))
            .cloned()
            .collect();
        out.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(out)
    }

    async fn add_participant(&self, conversation_id: Uuid, user: &UserId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        let conversation = store
            .conversations
            .get_mut(&conversation_id)
            .ok_or_else(|| DomainError::conversation_not_found(conversation_id))?;
        Ok(conversation.add_participant(user.clone()))
    }

    async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user: &UserId,
        discard_if_empty: bool,
    ) -> Result<RemovalOutcome, DomainError> {
        let mut store = self.store.write().await;
        let Some(conversation) = store.conversations.get_mut(&conversation_id) else {
            return Ok(RemovalOutcome::default());
        };
        let removed = conversation.remove_participant(user);
        let discard = removed && discard_if_empty && !conversation.has_participants();
        if discard {
            store.conversations.remove(&conversation_id);
            debug!(%conversation_id, "discarded empty conversation");
        }
        Ok(RemovalOutcome {
            removed,
            conversation_discarded: discard,
        })
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryRepo {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.store.read().await.users.get(id).cloned())
    }

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .store
            .read()
            .await
            .users
            .values()
            .find(|u| u.user_name == user_name)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let users = self.store.read().await.users.values().cloned().collect();
        Ok(sorted_by_name(users))
    }

    async fn users_not_in(&self, conversation_id: Uuid) -> Result<Vec<User>, DomainError> {
        let store = self.store.read().await;
        let participants = store
            .conversations
            .get(&conversation_id)
            .map(|c| c.participants.clone())
            .unwrap_or_default();
        let users = store
            .users
            .values()
            .filter(|u| !participants.contains(&u.id))
            .cloned()
            .collect();
        Ok(sorted_by_name(users))
    }

    async fn upsert_user(&self, user: &User) -> Result<(), DomainError> {
        self.store
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryKind;

    fn maths() -> Category {
        Category::new(CategoryKind::Course, "Maths")
    }

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let repo = InMemoryRepo::new();
        assert_eq!(repo.seed_if_empty(&Category::seed_set()).await.unwrap(), 11);
        assert_eq!(repo.seed_if_empty(&Category::seed_set()).await.unwrap(), 0);
        assert_eq!(repo.list_categories().await.unwrap().len(), 11);
    }

    #[tokio::test]
    async fn test_update_checks_version() {
        let repo = InMemoryRepo::new();
        let mut conv = Conversation::create("Study Group", maths(), UserId::from("a"));
        repo.insert_conversation(&conv).await.unwrap();

        conv.rename("Algebra");
        assert_eq!(repo.update_conversation(&conv, 1).await.unwrap(), 2);

        conv.rename("Geometry");
        let err = repo.update_conversation(&conv, 1).await.unwrap_err();
        assert!(err.is_retryable());
        let stored = repo.get_conversation(conv.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Algebra");
    }

    #[tokio::test]
    async fn test_update_with_max_version_conflicts() {
        let repo = InMemoryRepo::new();
        let mut conv = Conversation::create("Study Group", maths(), UserId::from("a"));
        repo.insert_conversation(&conv).await.unwrap();

        conv.rename("X");
        let err = repo.update_conversation(&conv, u64::MAX).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_add_participant_to_missing_conversation_is_not_found() {
        let repo = InMemoryRepo::new();
        let err = repo
            .add_participant(Uuid::new_v4(), &UserId::from("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Conversation", .. }));
    }

    #[tokio::test]
    async fn test_remove_last_participant_discards_only_when_asked() {
        let repo = InMemoryRepo::new();
        let conv = Conversation::create("Jam", maths(), UserId::from("a"));
        repo.insert_conversation(&conv).await.unwrap();

        let kept = repo
            .remove_participant(conv.id, &UserId::from("a"), false)
            .await
            .unwrap();
        assert!(kept.removed && !kept.conversation_discarded);
        assert!(repo.conversation_exists(conv.id).await.unwrap());

        repo.add_participant(conv.id, &UserId::from("a")).await.unwrap();
        let gone = repo
            .remove_participant(conv.id, &UserId::from("a"), true)
            .await
            .unwrap();
        assert!(gone.conversation_discarded);
        assert!(!repo.conversation_exists(conv.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_users_not_in_excludes_participants() {
        let repo = InMemoryRepo::with_users([
            User::new("a", "alice", "alice@lab.example"),
            User::new("b", "bob", "bob@lab.example"),
        ]);
        let conv = Conversation::create("Jam", maths(), UserId::from("a"));
        repo.insert_conversation(&conv).await.unwrap();

        let eligible = repo.users_not_in(conv.id).await.unwrap();
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].user_name, "bob");
    }
}
