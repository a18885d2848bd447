//! bundle-sync - Translation bundle synchronizer
//!
//! Keeps locale `.properties` bundles on disk and translation entries in
//! MongoDB in step, and asks translators for new untranslated keys.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `bundle` - Property files, locales and the bundle store
//! - `database` - MongoDB models and repositories
//! - `cache` - LRU-based caching with Moka
//! - `mail` - Outbound mail
//! - `sync` - Reconciliation engine, notifier and scheduler

mod bundle;
mod cache;
mod config;
mod database;
mod error;
mod mail;
mod sync;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bundle::BundleStore;
use cache::CacheRegistry;
use config::Config;
use database::{Database, Directory, DirectoryRepository, EntryRepository};
use mail::SmtpMailer;
use sync::{Notifier, PassReport, PassRunner, Reconciler, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bundle_sync=info,mongodb=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting bundle synchronizer...");

    let config = Config::from_env()?;
    info!("Configuration loaded: {} bundle families", config.families.len());
    for family in &config.families {
        info!("Bundle family: {}", family);
    }

    let bundles = BundleStore::new(&config.bundle_charset)?;
    info!("Bundle character set: {}", bundles.charset());

    // Connect to MongoDB
    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;

    let entries = EntryRepository::new(&db);
    entries.ensure_indexes().await?;
    info!("Database connected");

    let cache = CacheRegistry::new();
    let directory: Arc<dyn Directory> = Arc::new(DirectoryRepository::new(&db, &cache));
    info!("Directory caches: {:?}", cache.cache_names());

    let mailer = Arc::new(SmtpMailer::new(&config.smtp_host, config.io_timeout));
    let notifier = Notifier::new(directory.clone(), mailer, config.io_timeout);

    let reconciler = Reconciler::new(
        bundles,
        Arc::new(entries),
        directory,
        notifier,
        config.families.clone(),
    )
    .with_author(config.author.clone())
    .with_io_timeout(config.io_timeout);

    if config.run_once {
        let report: PassReport = reconciler.run_pass(&CancellationToken::new()).await;
        info!("Single pass finished: {}", report);
        return Ok(());
    }

    let mut scheduler = Scheduler::start(Arc::new(reconciler), config.sync_interval);

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    scheduler.shutdown().await;
    info!("Synchronizer {:?}, bye", scheduler.state());

    Ok(())
}
