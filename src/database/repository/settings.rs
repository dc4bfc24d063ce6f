//! Settings repository backed by the `configs` collection.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::config::SettingsStore;

use super::super::models::ConfigEntry;
use super::super::Database;

/// Key/value settings with a short-lived cache, read on the hot path for
/// the command prefix and admin list.
pub struct SettingsRepository {
    collection: Collection<ConfigEntry>,
    cache: TypedCache<String, Option<String>>,
}

impl SettingsRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("configs"),
            cache: cache.get_or_create("settings", CacheConfig::settings()),
        }
    }

    async fn fetch(&self, key: &str) -> anyhow::Result<Option<String>> {
        if let Some(cached) = self.cache.get(&key.to_string()) {
            return Ok(cached);
        }

        let filter = doc! { "key": key };
        let value = self
            .collection
            .find_one(filter)
            .await?
            .map(|entry| entry.value);

        self.cache.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Write a settings key, updating the cache immediately.
    pub async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let entry = ConfigEntry::new(key, value);

        let filter = doc! { "key": key };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, &entry)
            .with_options(options)
            .await?;

        self.cache.insert(key.to_string(), Some(entry.value));
        info!("updated setting {key}");
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for SettingsRepository {
    async fn get(&self, key: &str) -> Option<String> {
        match self.fetch(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("settings read for \"{key}\" failed: {e:#}");
                None
            }
        }
    }
}
