//! Conversation lifecycle: create, edit (optimistic concurrency), list, details.
//!
//! - Category labels are resolved before anything is written
//! - A version conflict is re-checked against storage: gone means NotFound,
//!   still there means a retryable ConcurrencyConflict

use crate::domain::{
    Conversation, ConversationDetails, ConversationUpdate, DomainError, User, UserId,
    normalize_title,
};
use crate::ports::{ConversationRepo, ConversationsPort, UserDirectory};
use crate::usecases::CategoryService;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Conversation service. Implements the `ConversationsPort` inbound port.
pub struct ConversationService {
    categories: Arc<CategoryService>,
    conversations: Arc<dyn ConversationRepo>,
    users: Arc<dyn UserDirectory>,
}

impl ConversationService {
    pub fn new(
        categories: Arc<CategoryService>,
        conversations: Arc<dyn ConversationRepo>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            categories,
            conversations,
            users,
        }
    }

    async fn load(&self, id: Uuid) -> Result<Conversation, DomainError> {
        self.conversations
            .get_conversation(id)
            .await?
            .ok_or_else(|| DomainError::conversation_not_found(id))
    }
}

#[async_trait::async_trait]
impl ConversationsPort for ConversationService {
    async fn category_titles(&self) -> Result<Vec<String>, DomainError> {
        self.categories.titles().await
    }

    async fn create_conversation(
        &self,
        actor: &UserId,
        title: &str,
        category_label: &str,
    ) -> Result<Conversation, DomainError> {
        let title = normalize_title(title)?;
        let category = self.categories.resolve(category_label).await?;
        let creator = self
            .users
            .get_user(actor)
            .await?
            .ok_or_else(|| DomainError::user_not_found(actor))?;

        let conversation = Conversation::create(title, category, creator.id);
        self.conversations.insert_conversation(&conversation).await?;
        info!(
            conversation_id = %conversation.id,
            category = %conversation.category.title,
            creator = %actor,
            "conversation created"
        );
        Ok(conversation)
    }

    async fn update_conversation(
        &self,
        id: Uuid,
        update: ConversationUpdate,
    ) -> Result<Conversation, DomainError> {
        let mut conversation = self.load(id).await?;

        if let Some(label) = update.category_label.as_deref() {
            let category = self.categories.resolve(label).await?;
            conversation.recategorize(category);
        }
        if let Some(title) = update.title.as_deref() {
            conversation.rename(normalize_title(title)?);
        }

        match self
            .conversations
            .update_conversation(&conversation, update.expected_version)
            .await
        {
            Ok(version) => {
                conversation.version = version;
                info!(conversation_id = %id, version, "conversation updated");
                Ok(conversation)
            }
            Err(DomainError::ConcurrencyConflict { id, expected }) => {
                if !self.conversations.conversation_exists(id).await? {
                    return Err(DomainError::conversation_not_found(id));
                }
                warn!(conversation_id = %id, expected, "stale conversation edit rejected");
                Err(DomainError::ConcurrencyConflict { id, expected })
            }
            Err(e) => Err(e),
        }
    }

    async fn list_conversations(
        &self,
        actor: &UserId,
        category: Option<&str>,
    ) -> Result<Vec<Conversation>, DomainError> {
        if self.users.get_user(actor).await?.is_none() {
            return Err(DomainError::user_not_found(actor));
        }
        let mut conversations = self.conversations.conversations_for_user(actor).await?;
        if let Some(filter) = category {
            conversations.retain(|c| c.category.title == filter);
        }
        Ok(conversations)
    }

    async fn conversation_details(&self, id: Uuid) -> Result<ConversationDetails, DomainError> {
        let conversation = self.load(id).await?;
        let (participants, eligible_users): (Vec<User>, Vec<User>) = self
            .users
            .list_users()
            .await?
            .into_iter()
            .partition(|u| conversation.is_participant(&u.id));
        Ok(ConversationDetails {
            conversation,
            participants,
            eligible_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::InMemoryRepo;
    use crate::domain::{Category, CategoryKind};
    use crate::ports::{CategoryRepo, ConversationRepo};
    use std::collections::BTreeSet;

    async fn setup() -> (Arc<InMemoryRepo>, ConversationService) {
        let repo = Arc::new(InMemoryRepo::with_users([
            User::new("user-a", "alice", "alice@lab.example"),
            User::new("user-b", "bob", "bob@lab.example"),
        ]));
        let categories = Arc::new(CategoryService::new(repo.clone()));
        categories.initialize().await.unwrap();
        let service = ConversationService::new(categories, repo.clone(), repo.clone());
        (repo, service)
    }

    fn alice() -> UserId {
        UserId::from("user-a")
    }

    #[tokio::test]
    async fn test_create_study_group_in_maths() {
        let (_repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();

        assert_eq!(conv.title, "Study Group");
        assert_eq!(conv.category.title, "Maths");
        assert_eq!(conv.category.kind, CategoryKind::Course);
        assert_eq!(conv.participants, BTreeSet::from([alice()]));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_before_writing() {
        let (repo, service) = setup().await;

        let err = service
            .create_conversation(&alice(), "Study Group", "Chess")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CategoryNotFound(ref l) if l == "Chess"));

        let err = service
            .create_conversation(&UserId::from("ghost"), "Study Group", "Maths")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));

        let err = service
            .create_conversation(&alice(), "  ", "Maths")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        assert!(repo.conversations_for_user(&alice()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_resolves_hobbies() {
        let (_repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Pickup games", "Basketball")
            .await
            .unwrap();
        assert_eq!(conv.category.kind, CategoryKind::Hobby);
    }

    #[tokio::test]
    async fn test_update_title_and_category() {
        let (repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();

        let updated = service
            .update_conversation(
                conv.id,
                ConversationUpdate {
                    title: Some("Logic club".into()),
                    category_label: Some("Logic Programming".into()),
                    expected_version: conv.version,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Logic club");
        assert_eq!(updated.category.title, "Logic Programming");
        assert_eq!(updated.version, conv.version + 1);

        let stored = repo.get_conversation(conv.id).await.unwrap().unwrap();
        assert_eq!(stored.category.title, "Logic Programming");
    }

    #[tokio::test]
    async fn test_update_with_unknown_category_leaves_conversation_unchanged() {
        let (repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();

        let err = service
            .update_conversation(
                conv.id,
                ConversationUpdate {
                    title: Some("Renamed".into()),
                    category_label: Some("Unknown".into()),
                    expected_version: conv.version,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CategoryNotFound(_)));

        let stored = repo.get_conversation(conv.id).await.unwrap().unwrap();
        assert_eq!(stored.category.title, "Maths");
        assert_eq!(stored.title, "Study Group");
        assert_eq!(stored.version, conv.version);
    }

    #[tokio::test]
    async fn test_stale_update_is_a_retryable_conflict() {
        let (_repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();
        let first = ConversationUpdate {
            title: Some("First".into()),
            category_label: None,
            expected_version: conv.version,
        };
        service.update_conversation(conv.id, first).await.unwrap();

        let stale = ConversationUpdate {
            title: Some("Second".into()),
            category_label: None,
            expected_version: conv.version,
        };
        let err = service.update_conversation(conv.id, stale).await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_unreachable_version_on_sqlite_is_a_conflict() {
        use crate::adapters::persistence::SqliteRepo;

        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(SqliteRepo::connect(dir.path()).await.unwrap());
        repo.upsert_user(&User::new("user-a", "alice", "alice@lab.example"))
            .await
            .unwrap();
        let categories = Arc::new(CategoryService::new(repo.clone()));
        categories.initialize().await.unwrap();
        let service = ConversationService::new(categories, repo.clone(), repo.clone());

        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();
        let update = ConversationUpdate {
            title: Some("X".into()),
            category_label: None,
            expected_version: u64::MAX,
        };
        let err = service.update_conversation(conv.id, update).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ConcurrencyConflict { expected: u64::MAX, .. }
        ));
    }

    #[tokio::test]
    async fn test_update_of_missing_conversation_is_not_found() {
        let (_repo, service) = setup().await;
        let err = service
            .update_conversation(Uuid::new_v4(), ConversationUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Conversation", .. }));
    }

    /// Conversation disappears between the read and the commit.
    struct VanishingRepo {
        inner: Arc<InMemoryRepo>,
    }

    #[async_trait::async_trait]
    impl ConversationRepo for VanishingRepo {
        async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, DomainError> {
            self.inner.get_conversation(id).await
        }
        async fn conversation_exists(&self, _id: Uuid) -> Result<bool, DomainError> {
            Ok(false)
        }
        async fn insert_conversation(&self, c: &Conversation) -> Result<(), DomainError> {
            self.inner.insert_conversation(c).await
        }
        async fn update_conversation(&self, c: &Conversation, expected: u64) -> Result<u64, DomainError> {
            Err(DomainError::ConcurrencyConflict { id: c.id, expected })
        }
        async fn conversations_for_user(&self, u: &UserId) -> Result<Vec<Conversation>, DomainError> {
            self.inner.conversations_for_user(u).await
        }
        async fn add_participant(&self, id: Uuid, u: &UserId) -> Result<bool, DomainError> {
            self.inner.add_participant(id, u).await
        }
        async fn remove_participant(
            &self,
            id: Uuid,
            u: &UserId,
            discard: bool,
        ) -> Result<crate::domain::RemovalOutcome, DomainError> {
            self.inner.remove_participant(id, u, discard).await
        }
    }

    #[tokio::test]
    async fn test_conflict_on_deleted_conversation_reports_not_found() {
        let repo = Arc::new(InMemoryRepo::with_users([User::new("user-a", "alice", "a@lab.example")]));
        repo.seed_if_empty(&Category::seed_set()).await.unwrap();
        let categories = Arc::new(CategoryService::new(repo.clone()));
        let vanishing = Arc::new(VanishingRepo { inner: repo.clone() });
        let service = ConversationService::new(categories, vanishing, repo.clone());

        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();
        let err = service
            .update_conversation(
                conv.id,
                ConversationUpdate {
                    title: Some("Renamed".into()),
                    category_label: None,
                    expected_version: conv.version,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Conversation", .. }));
    }

    #[tokio::test]
    async fn test_list_conversations_with_category_filter() {
        let (_repo, service) = setup().await;
        service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();
        service
            .create_conversation(&alice(), "Band", "Music")
            .await
            .unwrap();

        assert_eq!(service.list_conversations(&alice(), None).await.unwrap().len(), 2);
        let music = service
            .list_conversations(&alice(), Some("Music"))
            .await
            .unwrap();
        assert_eq!(music.len(), 1);
        assert_eq!(music[0].title, "Band");
        assert!(
            service
                .list_conversations(&UserId::from("user-b"), None)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_conversation_details_splits_users() {
        let (_repo, service) = setup().await;
        let conv = service
            .create_conversation(&alice(), "Study Group", "Maths")
            .await
            .unwrap();

        let details = service.conversation_details(conv.id).await.unwrap();
        assert_eq!(details.participants.len(), 1);
        assert_eq!(details.participants[0].user_name, "alice");
        assert_eq!(details.eligible_users.len(), 1);
        assert_eq!(details.eligible_users[0].user_name, "bob");
    }

    #[tokio::test]
    async fn test_category_titles() {
        let (_repo, service) = setup().await;
        let titles = service.category_titles().await.unwrap();
        assert_eq!(titles.first().map(String::as_str), Some("Maths"));
        assert_eq!(titles.last().map(String::as_str), Some("Cooking"));
    }
}
