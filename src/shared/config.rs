//! Application configuration. Storage location, notification delivery, membership policy.

use serde::Deserialize;

/// Default capacity for the notification queue. When full, dispatch fails fast
/// and the membership response carries a warning.
pub const DEFAULT_NOTIFICATION_QUEUE_SIZE: usize = 256;

/// Where conversations and categories are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding portal.db. Read from PORTAL_DATA_DIR.
    pub data_dir: Option<String>,

    /// `sqlite` (default) or `memory`. Read from PORTAL_STORAGE.
    #[serde(default)]
    pub storage: Option<StorageKind>,

    /// Push endpoint for notifications. When unset, notifications are only logged.
    /// Read from PORTAL_NOTIFICATION_WEBHOOK_URL.
    #[serde(default)]
    pub notification_webhook_url: Option<String>,

    /// Bearer token for the push endpoint. Read from PORTAL_NOTIFICATION_WEBHOOK_TOKEN.
    #[serde(default)]
    pub notification_webhook_token: Option<String>,

    /// Max queued notifications between request handlers and the worker.
    /// Read from PORTAL_NOTIFICATION_QUEUE_SIZE.
    #[serde(default)]
    pub notification_queue_size: Option<usize>,

    /// Delete a conversation when its last participant leaves (default true).
    /// Read from PORTAL_DISCARD_EMPTY_CONVERSATIONS.
    #[serde(default)]
    pub discard_empty_conversations: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("PORTAL_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        // Environment wins over the file.
        c = c.add_source(config::Environment::with_prefix("PORTAL").try_parsing(true));
        c.build()?.try_deserialize()
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn storage_or_default(&self) -> StorageKind {
        self.storage.unwrap_or_default()
    }

    /// Returns the notification queue size. Defaults to DEFAULT_NOTIFICATION_QUEUE_SIZE.
    pub fn notification_queue_size_or_default(&self) -> usize {
        self.notification_queue_size
            .unwrap_or(DEFAULT_NOTIFICATION_QUEUE_SIZE)
    }

    pub fn discard_empty_conversations_or_default(&self) -> bool {
        self.discard_empty_conversations.unwrap_or(true)
    }

    /// Returns true if a webhook URL is set (and non-blank).
    pub fn is_webhook_configured(&self) -> bool {
        self.notification_webhook_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }
}
