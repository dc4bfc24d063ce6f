//! Configuration module.
//!
//! Environment configuration for the embedder plus the `SettingsStore`
//! contract the engine reads its runtime settings (command prefix, admin-id
//! list) through. A static env-backed implementation lives here; the
//! mongo-backed one is `database::SettingsRepository`.

use std::collections::HashMap;
use std::env;

use async_trait::async_trait;

/// Key the command prefix is stored under.
pub const PREFIX_KEY: &str = "prefix";
/// Key the admin-id list is stored under (JSON array of strings).
pub const ADMINS_KEY: &str = "admins";
/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "!";

/// Application configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Command prefix, defaults to `"!"`.
    pub prefix: String,

    /// User ids with developer access (comma-separated `ADMIN_IDS`).
    pub admin_ids: Vec<String>,

    /// MongoDB connection string. `None` runs the engine without a
    /// database (static settings, no account records, no user tracking).
    pub mongodb_uri: Option<String>,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let prefix = env::var("PREFIX")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let admin_ids = env::var("ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            prefix,
            admin_ids,
            mongodb_uri: env::var("MONGODB_URI").ok().filter(|s| !s.is_empty()),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "kairo".to_string()),
        }
    }
}

/// Read access to runtime settings.
///
/// `prefix` and `admin_ids` are the two values the engine itself consumes;
/// handler modules may read arbitrary keys through `get`.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Raw value for a settings key.
    async fn get(&self, key: &str) -> Option<String>;

    /// The active command prefix, falling back to `"!"`.
    async fn prefix(&self) -> String {
        self.get(PREFIX_KEY)
            .await
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
    }

    /// The configured admin-id list (JSON array under `admins`).
    async fn admin_ids(&self) -> Vec<String> {
        let Some(raw) = self.get(ADMINS_KEY).await else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

/// Fixed in-memory settings, built from [`Config`] or by hand.
///
/// Used when no database is configured.
pub struct StaticSettings {
    values: HashMap<String, String>,
}

impl StaticSettings {
    pub fn new(prefix: impl Into<String>, admin_ids: Vec<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(PREFIX_KEY.to_string(), prefix.into());
        values.insert(
            ADMINS_KEY.to_string(),
            serde_json::to_string(&admin_ids).unwrap_or_else(|_| "[]".to_string()),
        );
        Self { values }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.prefix.clone(), config.admin_ids.clone())
    }

    /// Add an arbitrary settings key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}
