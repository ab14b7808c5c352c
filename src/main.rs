//! Wiring & DI. Entry point: bootstrap adapters, seed categories, start the
//! notification worker, host the services until Ctrl-C.
//! No business logic here; the presentation layer calls the inbound ports.

use dotenv::dotenv;
use portal_chat::adapters::notifications::{ChannelDispatcher, LogTransport, WebhookTransport};
use portal_chat::adapters::persistence::{InMemoryRepo, SqliteRepo};
use portal_chat::ports::{
    CategoryRepo, ConversationRepo, ConversationsPort, MembershipPort, NotificationDispatcher,
    NotificationTransport, UserDirectory,
};
use portal_chat::shared::config::{AppConfig, StorageKind};
use portal_chat::usecases::{
    CategoryService, ConversationService, MembershipService, NotificationWorker,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

type Stores = (
    Arc<dyn CategoryRepo>,
    Arc<dyn ConversationRepo>,
    Arc<dyn UserDirectory>,
);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found (check CWD)"),
    }

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "invalid configuration, falling back to defaults");
            AppConfig::default()
        }
    };

    // --- Storage ---
    let (categories, conversations, users) = open_stores(&cfg).await?;

    // --- Explicit one-time seed (idempotent) ---
    let category_service = Arc::new(CategoryService::new(categories));
    category_service
        .initialize()
        .await
        .map_err(|e| anyhow::anyhow!("category seeding failed: {}", e))?;

    // --- Notifications: bounded queue -> worker -> transport ---
    let transport: Arc<dyn NotificationTransport> = if cfg.is_webhook_configured() {
        let url = cfg.notification_webhook_url.clone().unwrap_or_default();
        info!(url = %url, "notifications delivered via webhook");
        Arc::new(
            WebhookTransport::new(url, cfg.notification_webhook_token.clone())
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("PORTAL_NOTIFICATION_WEBHOOK_URL not set, notifications are only logged");
        Arc::new(LogTransport)
    };
    let queue_size = cfg.notification_queue_size_or_default();
    info!(queue_size, "notification queue buffer: {}", queue_size);
    let (dispatcher, notification_rx) = ChannelDispatcher::bounded(queue_size);
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(dispatcher);
    let worker = tokio::spawn(NotificationWorker::new(transport, notification_rx).run());

    // --- Services (inbound ports for the presentation layer) ---
    let conversations_port: Arc<dyn ConversationsPort> = Arc::new(ConversationService::new(
        Arc::clone(&category_service),
        Arc::clone(&conversations),
        Arc::clone(&users),
    ));
    let membership_port: Arc<dyn MembershipPort> = Arc::new(MembershipService::new(
        conversations,
        users,
        dispatcher,
        cfg.discard_empty_conversations_or_default(),
    ));

    let titles = conversations_port
        .category_titles()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    info!(count = titles.len(), categories = ?titles, "category catalog ready");
    info!("portal-chat ready; press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    // Dropping the services drops the last dispatcher handle, which closes the queue.
    drop(membership_port);
    drop(conversations_port);
    let delivered = worker.await?;
    info!(delivered, "notifications delivered this session");

    Ok(())
}

async fn open_stores(cfg: &AppConfig) -> anyhow::Result<Stores> {
    match cfg.storage_or_default() {
        StorageKind::Sqlite => {
            let data_path = PathBuf::from(cfg.data_dir_or_default());
            let repo = Arc::new(
                SqliteRepo::connect(&data_path)
                    .await
                    .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
            );
            info!(path = %repo.db_path().display(), "using SQLite storage");
            Ok((
                Arc::clone(&repo) as Arc<dyn CategoryRepo>,
                Arc::clone(&repo) as Arc<dyn ConversationRepo>,
                repo as Arc<dyn UserDirectory>,
            ))
        }
        StorageKind::Memory => {
            warn!("using in-memory storage; nothing is persisted");
            let repo = Arc::new(InMemoryRepo::new());
            Ok((
                Arc::clone(&repo) as Arc<dyn CategoryRepo>,
                Arc::clone(&repo) as Arc<dyn ConversationRepo>,
                repo as Arc<dyn UserDirectory>,
            ))
        }
    }
}
