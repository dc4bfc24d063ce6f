//! MongoDB database wrapper.
//!
//! Three collections back the engine: `accounts` (bot tiers and expiry),
//! `configs` (runtime settings) and `users` (tracked senders). Repositories
//! own their collection handles; nothing else touches the driver.

use mongodb::{options::ClientOptions, Client, Collection};
use tracing::info;

/// Handle to the engine's MongoDB database.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect and verify the deployment is reachable.
    ///
    /// # Errors
    /// Returns error if the URI is malformed or the ping fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping before handing the connection out.
        client
            .database("admin")
            .run_command(mongodb::bson::doc! { "ping": 1 })
            .await?;

        info!("connected to MongoDB database \"{db_name}\"");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Get a typed collection handle.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// The underlying driver database, for embedder migrations.
    #[allow(dead_code)]
    pub fn db(&self) -> &mongodb::Database {
        &self.db
    }
}
