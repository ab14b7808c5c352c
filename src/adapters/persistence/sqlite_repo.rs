//! SQLite-backed repository via libsql. Implements CategoryRepo, ConversationRepo and
//! UserDirectory on one database file: data/portal.db
//!
//! Participants are a (conversation_id, user_id) join table; inserts use
//! ON CONFLICT DO NOTHING so the affected-row count says whether the set grew.
//! Conversation edits are guarded by a version column (optimistic concurrency).

use crate::domain::{Category, CategoryKind, Conversation, DomainError, RemovalOutcome, User, UserId};
use crate::ports::{CategoryRepo, ConversationRepo, UserDirectory};
use libsql::{Connection, Database, Row, TransactionBehavior, params};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

const CATEGORIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    title TEXT NOT NULL,
    UNIQUE (kind, title)
)"#;

const USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    user_name TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL
)"#;

const CONVERSATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    category_id TEXT NOT NULL REFERENCES categories (id),
    version INTEGER NOT NULL
)"#;

const PARTICIPANTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS participants (
    conversation_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    PRIMARY KEY (conversation_id, user_id)
)"#;
const PARTICIPANTS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_participants_user ON participants (user_id)";

const CONVERSATION_COLUMNS: &str = r#"
    c.id, c.title, c.version, k.id, k.kind, k.title
    FROM conversations c
    JOIN categories k ON k.id = c.category_id"#;

fn db_err(e: impl std::fmt::Display) -> DomainError {
    DomainError::Repo(e.to_string())
}

fn parse_uuid(s: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(s).map_err(|e| DomainError::Repo(format!("bad uuid {:?}: {}", s, e)))
}

/// SQLite repository. One database file (portal.db) in the given base directory.
pub struct SqliteRepo {
    db: Database,
    db_path: PathBuf,
}

impl SqliteRepo {
    /// Connect to (or create) the SQLite database and ensure the schema exists.
    /// Call this once at startup; the returned repo is safe to share via Arc.
    ///
    /// Sets WAL mode and synchronous=NORMAL for concurrent readers with one writer.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(db_err)?;
        let db_path = base.join("portal.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(db_err)?;
        let conn = db.connect().map_err(db_err)?;

        // PRAGMA returns a row (new value); use query and consume rows (execute fails when rows are returned).
        for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
            let mut rows = conn
                .query(pragma, ())
                .await
                .map_err(|e| DomainError::Repo(format!("{} failed: {}", pragma, e)))?;
            while rows.next().await.map_err(db_err)?.is_some() {}
        }

        for ddl in [
            CATEGORIES_TABLE,
            USERS_TABLE,
            CONVERSATIONS_TABLE,
            PARTICIPANTS_TABLE,
            PARTICIPANTS_INDEX,
        ] {
            conn.execute(ddl, ()).await.map_err(db_err)?;
        }

        info!(path = %db_path.display(), "SQLite connected with WAL mode");

        Ok(Self { db, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<Connection, DomainError> {
        self.db.connect().map_err(db_err)
    }

    fn row_to_user(row: &Row) -> Result<User, DomainError> {
        Ok(User {
            id: UserId(row.get::<String>(0).map_err(db_err)?),
            user_name: row.get::<String>(1).map_err(db_err)?,
            email: row.get::<String>(2).map_err(db_err)?,
        })
    }

    /// Conversation row without participants (filled in by `load_participants`).
    fn row_to_conversation(row: &Row) -> Result<Conversation, DomainError> {
        let id = parse_uuid(&row.get::<String>(0).map_err(db_err)?)?;
        let version: i64 = row.get(2).map_err(db_err)?;
        let category = Category {
            id: parse_uuid(&row.get::<String>(3).map_err(db_err)?)?,
            kind: row.get::<String>(4).map_err(db_err)?.parse::<CategoryKind>()?,
            title: row.get::<String>(5).map_err(db_err)?,
        };
        Ok(Conversation {
            id,
            title: row.get::<String>(1).map_err(db_err)?,
            category,
            participants: BTreeSet::new(),
            version: version as u64,
        })
    }

    async fn load_participants(
        conn: &Connection,
        conversation: &mut Conversation,
    ) -> Result<(), DomainError> {
        let mut rows = conn
            .query(
                "SELECT user_id FROM participants WHERE conversation_id = ?1",
                params![conversation.id.to_string()],
            )
            .await
            .map_err(db_err)?;
        while let Some(row) = rows.next().await.map_err(db_err)? {
            conversation
                .participants
                .insert(UserId(row.get::<String>(0).map_err(db_err)?));
        }
        Ok(())
    }

    async fn collect_users(conn: &Connection, sql: &str, id: Option<String>) -> Result<Vec<User>, DomainError> {
        let mut rows = match id {
            Some(id) => conn.query(sql, params![id]).await,
            None => conn.query(sql, ()).await,
        }
        .map_err(db_err)?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            users.push(Self::row_to_user(&row)?);
        }
        Ok(users)
    }
}

#[async_trait::async_trait]
impl CategoryRepo for SqliteRepo {
    async fn has_categories(&self) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT EXISTS (SELECT 1 FROM categories)", ())
            .await
            .map_err(db_err)?;
        match rows.next().await.map_err(db_err)? {
            Some(row) => Ok(row.get::<i64>(0).map_err(db_err)? != 0),
            None => Ok(false),
        }
    }

    async fn seed_if_empty(&self, categories: &[Category]) -> Result<usize, DomainError> {
        let conn = self.conn()?;
        // IMMEDIATE takes the write lock up front, so two processes cannot both see an empty table.
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(db_err)?;
        let existing: i64 = {
            let mut rows = tx
                .query("SELECT COUNT(*) FROM categories", ())
                .await
                .map_err(db_err)?;
            match rows.next().await.map_err(db_err)? {
                Some(row) => row.get(0).map_err(db_err)?,
                None => 0,
            }
        };
        if existing > 0 {
            tx.rollback().await.map_err(db_err)?;
            debug!(existing, "categories already present, seeding skipped");
            return Ok(0);
        }
        for c in categories {
            tx.execute(
                "INSERT INTO categories (id, kind, title) VALUES (?1, ?2, ?3)",
                params![c.id.to_string(), c.kind.as_str(), c.title.as_str()],
            )
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(categories.len())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query("SELECT id, kind, title FROM categories ORDER BY rowid", ())
            .await
            .map_err(db_err)?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            categories.push(Category {
                id: parse_uuid(&row.get::<String>(0).map_err(db_err)?)?,
                kind: row.get::<String>(1).map_err(db_err)?.parse()?,
                title: row.get::<String>(2).map_err(db_err)?,
            });
        }
        Ok(categories)
    }
}

#[async_trait::async_trait]
impl ConversationRepo for SqliteRepo {
    async fn get_conversation(&self, id: Uuid) -> Result<Option<Conversation>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!("SELECT {} WHERE c.id = ?1", CONVERSATION_COLUMNS),
                params![id.to_string()],
            )
            .await
            .map_err(db_err)?;
        let Some(row) = rows.next().await.map_err(db_err)? else {
            return Ok(None);
        };
        let mut conversation = Self::row_to_conversation(&row)?;
        drop(rows);
        Self::load_participants(&conn, &mut conversation).await?;
        Ok(Some(conversation))
    }

    async fn conversation_exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM conversations WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(db_err)?;
        Ok(rows.next().await.map_err(db_err)?.is_some())
    }

    async fn insert_conversation(&self, conversation: &Conversation) -> Result<(), DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(db_err)?;
        let id = conversation.id.to_string();
        tx.execute(
            "INSERT INTO conversations (id, title, category_id, version) VALUES (?1, ?2, ?3, ?4)",
            params![
                id.as_str(),
                conversation.title.as_str(),
                conversation.category.id.to_string(),
                conversation.version as i64
            ],
        )
        .await
        .map_err(db_err)?;
        for user in &conversation.participants {
            tx.execute(
                "INSERT INTO participants (conversation_id, user_id) VALUES (?1, ?2)",
                params![id.as_str(), user.as_str()],
            )
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
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
        // Versions outside SQLite's INTEGER range can never match a stored row.
        let next = expected_version.checked_add(1).ok_or_else(conflict)?;
        let (Ok(expected_db), Ok(next_db)) = (i64::try_from(expected_version), i64::try_from(next))
        else {
            return Err(conflict());
        };
        let conn = self.conn()?;
        let changed = conn
            .execute(
                r#"
                UPDATE conversations
                SET title = ?1, category_id = ?2, version = ?3
                WHERE id = ?4 AND version = ?5
                "#,
                params![
                    conversation.title.as_str(),
                    conversation.category.id.to_string(),
                    next_db,
                    conversation.id.to_string(),
                    expected_db
                ],
            )
            .await
            .map_err(db_err)?;
        if changed == 0 {
            return Err(conflict());
        }
        Ok(next)
    }

    async fn conversations_for_user(&self, user: &UserId) -> Result<Vec<Conversation>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                &format!(
                    r#"SELECT {}
                    JOIN participants p ON p.conversation_id = c.id
                    WHERE p.user_id = ?1
                    ORDER BY c.title"#,
                    CONVERSATION_COLUMNS
                ),
                params![user.as_str()],
            )
            .await
            .map_err(db_err)?;
        let mut conversations = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            conversations.push(Self::row_to_conversation(&row)?);
        }
        drop(rows);
        for conversation in &mut conversations {
            Self::load_participants(&conn, conversation).await?;
        }
        Ok(conversations)
    }

    async fn add_participant(&self, conversation_id: Uuid, user: &UserId) -> Result<bool, DomainError> {
        let conn = self.conn()?;
        let inserted = conn
            .execute(
                r#"
                INSERT INTO participants (conversation_id, user_id)
                SELECT ?1, ?2 WHERE EXISTS (SELECT 1 FROM conversations WHERE id = ?1)
                ON CONFLICT (conversation_id, user_id) DO NOTHING
                "#,
                params![conversation_id.to_string(), user.as_str()],
            )
            .await
            .map_err(db_err)?;
        if inserted == 0 && !self.conversation_exists(conversation_id).await? {
            return Err(DomainError::conversation_not_found(conversation_id));
        }
        Ok(inserted > 0)
    }

    async fn remove_participant(
        &self,
        conversation_id: Uuid,
        user: &UserId,
        discard_if_empty: bool,
    ) -> Result<RemovalOutcome, DomainError> {
        let conn = self.conn()?;
        let tx = conn.transaction().await.map_err(db_err)?;
        let id = conversation_id.to_string();
        let removed = tx
            .execute(
                "DELETE FROM participants WHERE conversation_id = ?1 AND user_id = ?2",
                params![id.as_str(), user.as_str()],
            )
            .await
            .map_err(db_err)?
            > 0;

        let mut discarded = false;
        if removed && discard_if_empty {
            let remaining: i64 = {
                let mut rows = tx
                    .query(
                        "SELECT COUNT(*) FROM participants WHERE conversation_id = ?1",
                        params![id.as_str()],
                    )
                    .await
                    .map_err(db_err)?;
                match rows.next().await.map_err(db_err)? {
                    Some(row) => row.get(0).map_err(db_err)?,
                    None => 0,
                }
            };
            if remaining == 0 {
                tx.execute("DELETE FROM conversations WHERE id = ?1", params![id.as_str()])
                    .await
                    .map_err(db_err)?;
                discarded = true;
            }
        }
        tx.commit().await.map_err(db_err)?;
        Ok(RemovalOutcome {
            removed,
            conversation_discarded: discarded,
        })
    }
}

#[async_trait::async_trait]
impl UserDirectory for SqliteRepo {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let conn = self.conn()?;
        let users = Self::collect_users(
            &conn,
            "SELECT id, user_name, email FROM users WHERE id = ?1",
            Some(id.0.clone()),
        )
        .await?;
        Ok(users.into_iter().next())
    }

    async fn find_user_by_name(&self, user_name: &str) -> Result<Option<User>, DomainError> {
        let conn = self.conn()?;
        let users = Self::collect_users(
            &conn,
            "SELECT id, user_name, email FROM users WHERE user_name = ?1",
            Some(user_name.to_string()),
        )
        .await?;
        Ok(users.into_iter().next())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        let conn = self.conn()?;
        Self::collect_users(
            &conn,
            "SELECT id, user_name, email FROM users ORDER BY user_name",
            None,
        )
        .await
    }

    async fn users_not_in(&self, conversation_id: Uuid) -> Result<Vec<User>, DomainError> {
        let conn = self.conn()?;
        Self::collect_users(
            &conn,
            r#"
            SELECT id, user_name, email FROM users
            WHERE id NOT IN (SELECT user_id FROM participants WHERE conversation_id = ?1)
            ORDER BY user_name
            "#,
            Some(conversation_id.to_string()),
        )
        .await
    }

    async fn upsert_user(&self, user: &User) -> Result<(), DomainError> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO users (id, user_name, email) VALUES (?1, ?2, ?3)
            ON CONFLICT (id) DO UPDATE SET
                user_name = excluded.user_name,
                email = excluded.email
            "#,
            params![user.id.as_str(), user.user_name.as_str(), user.email.as_str()],
        )
        .await
        .map_err(db_err)?;
        Ok(())
    }
}
