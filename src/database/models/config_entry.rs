//! Key/value settings record.

use serde::{Deserialize, Serialize};

/// One settings row (`prefix`, `admins`, ...). Values holding structured
/// data are JSON strings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}
