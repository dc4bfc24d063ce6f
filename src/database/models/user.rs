//! Tracked platform user.

use serde::{Deserialize, Serialize};

/// A user the bot has seen, with light last-activity bookkeeping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackedUser {
    /// Platform id of the user.
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Text of the most recent message, for moderation lookups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,

    /// Unix timestamp of last update.
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl TrackedUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            avatar: None,
            is_active: true,
            last_message: None,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}
