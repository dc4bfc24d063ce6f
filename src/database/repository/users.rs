//! User repository with cache-first upserts.
//!
//! The router records every message sender here in the background;
//! moderation-style modules read the records back.

use std::sync::Arc;

use anyhow::Result;
use mongodb::bson::doc;
use mongodb::Collection;
use tokio::spawn;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};

use super::super::models::TrackedUser;
use super::super::Database;

/// Repository for tracked platform users.
pub struct UserRepository {
    collection: Collection<TrackedUser>,
    cache: TypedCache<String, TrackedUser>,
}

impl UserRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("users"),
            cache: cache.get_or_create("users", CacheConfig::directory()),
        }
    }

    /// Upsert a user's last-seen state. Updates the cache immediately.
    pub async fn upsert(&self, user_id: &str, last_message: Option<&str>) -> Result<()> {
        let mut user = self
            .cache
            .get(&user_id.to_string())
            .unwrap_or_else(|| TrackedUser::new(user_id));

        user.last_message = last_message.map(str::to_string);
        user.updated_at = chrono::Utc::now().timestamp();

        self.cache.insert(user_id.to_string(), user.clone());

        let filter = doc! { "user_id": user_id };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, &user)
            .with_options(options)
            .await?;

        debug!("upserted user {user_id}");
        Ok(())
    }

    /// Upsert in the background (non-blocking).
    pub fn upsert_background(self: Arc<Self>, user_id: String, last_message: Option<String>) {
        spawn(async move {
            if let Err(e) = self.upsert(&user_id, last_message.as_deref()).await {
                warn!("failed to upsert user {user_id}: {e:#}");
            }
        });
    }

    /// Get a user by platform id.
    pub async fn get(&self, user_id: &str) -> Result<Option<TrackedUser>> {
        if let Some(user) = self.cache.get(&user_id.to_string()) {
            return Ok(Some(user));
        }

        let filter = doc! { "user_id": user_id };
        let result = self.collection.find_one(filter).await?;

        if let Some(user) = &result {
            self.cache.insert(user_id.to_string(), user.clone());
        }

        Ok(result)
    }
}
