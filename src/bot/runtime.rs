//! Engine assembly and the per-account event loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::cache::CacheRegistry;
use crate::config::{Config, SettingsStore, StaticSettings};
use crate::database::{AccountRepository, Database, SettingsRepository, UserRepository};
use crate::events;
use crate::modules::{BotContext, ModuleRegistry};
use crate::permissions::{AccountDirectory, AccountProfile, BotRole, StaticAccounts};
use crate::platform::{ChatApi, Event};
use crate::plugins;

use super::router::Router;

/// Assemble a router over explicit collaborators.
///
/// Loads the built-in module registration lists and publishes the first
/// registry generation.
pub fn build_router(
    api: Arc<dyn ChatApi>,
    settings: Arc<dyn SettingsStore>,
    accounts: Arc<dyn AccountDirectory>,
    users: Option<Arc<UserRepository>>,
    cache: Arc<CacheRegistry>,
) -> Router {
    let registry = Arc::new(ModuleRegistry::new(plugins::all(), events::all()));
    registry.load();

    let continuations = Arc::new(crate::continuations::Continuations::new(&cache));

    let ctx = BotContext {
        settings,
        accounts,
        users,
        registry,
        continuations,
        cache,
    };

    Router::new(api, ctx)
}

/// Assemble a router from environment configuration.
///
/// With `MONGODB_URI` set, settings, accounts and user tracking are backed
/// by the database. Without it the engine runs on static settings and a
/// fixed admin-tier account profile.
pub async fn build_from_config(
    api: Arc<dyn ChatApi>,
    config: &Config,
) -> anyhow::Result<Router> {
    let cache = Arc::new(CacheRegistry::new());

    match &config.mongodb_uri {
        Some(uri) => {
            info!("Connecting to MongoDB...");
            let db = Database::connect(uri, &config.mongodb_database).await?;
            let settings = Arc::new(SettingsRepository::new(&db, &cache));
            let accounts = Arc::new(AccountRepository::new(&db, &cache));
            let users = Some(Arc::new(UserRepository::new(&db, &cache)));
            Ok(build_router(api, settings, accounts, users, cache))
        }
        None => {
            info!("No database configured, using static settings");
            let settings = Arc::new(StaticSettings::from_config(config));
            let accounts = Arc::new(StaticAccounts(AccountProfile {
                role: BotRole::Admin,
                expires_at: None,
            }));
            Ok(build_router(api, settings, accounts, None, cache))
        }
    }
}

/// Drive the router off the connector's event stream.
///
/// Events arrive one at a time in platform-delivery order; handler
/// invocations are detached tasks, so a slow handler never blocks delivery
/// of the next event. Returns when the connector closes the channel.
pub async fn run(router: Router, mut events: mpsc::Receiver<Event>) {
    router.run_on_load();
    info!("event loop started");

    while let Some(event) = events.recv().await {
        router.dispatch(event).await;
    }

    info!("event stream closed, shutting down");
}
