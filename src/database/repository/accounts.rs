//! Account repository with cache-first lookups.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::Collection;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::permissions::{AccountDirectory, AccountProfile};

use super::super::models::BotAccount;
use super::super::Database;

/// Repository for bot account records.
///
/// The authorization gate reads one record per command invocation, so hits
/// ride the cache and misses (including "no such account") are cached too.
pub struct AccountRepository {
    collection: Collection<BotAccount>,
    cache: TypedCache<String, Option<BotAccount>>,
}

impl AccountRepository {
    pub fn new(db: &Database, cache: &CacheRegistry) -> Self {
        Self {
            collection: db.collection("accounts"),
            cache: cache.get_or_create("accounts", CacheConfig::directory()),
        }
    }

    /// Get an account by its platform id.
    pub async fn get(&self, account_id: &str) -> anyhow::Result<Option<BotAccount>> {
        if let Some(cached) = self.cache.get(&account_id.to_string()) {
            return Ok(cached);
        }

        let filter = doc! { "account_id": account_id };
        let result = self.collection.find_one(filter).await?;

        self.cache.insert(account_id.to_string(), result.clone());
        Ok(result)
    }

    /// Drop the cached record, forcing the next read to hit the database.
    #[allow(dead_code)]
    pub fn invalidate(&self, account_id: &str) {
        self.cache.invalidate(&account_id.to_string());
    }
}

#[async_trait]
impl AccountDirectory for AccountRepository {
    async fn profile(&self, account_id: &str) -> anyhow::Result<Option<AccountProfile>> {
        Ok(self
            .get(account_id)
            .await?
            .filter(|account| account.is_active)
            .map(|account| account.profile()))
    }
}
