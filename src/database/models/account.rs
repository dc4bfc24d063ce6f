//! Bot account record.

use serde::{Deserialize, Serialize};

use crate::permissions::{AccountProfile, BotRole};

/// One bot account and its subscription state.
///
/// Login material (cookies, device ids) lives with the bootstrap tooling,
/// not in this record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAccount {
    /// Platform id of the account.
    pub account_id: String,

    /// Subscription tier.
    pub role: BotRole,

    /// Epoch seconds after which a non-admin account is expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Unix timestamps.
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl BotAccount {
    pub fn new(account_id: impl Into<String>, role: BotRole) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            account_id: account_id.into(),
            role,
            expires_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The slice the authorization gate consumes.
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            role: self.role,
            expires_at: self.expires_at,
        }
    }
}
