//! Authorization and rate-limit gate.
//!
//! Runs once per routed command, before the handler. Checks are ordered and
//! short-circuit on the first failure: self-message filter, cooldown, bot
//! tier (including expiration), user tier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::config::SettingsStore;
use crate::modules::ModuleConfig;

use super::cooldown::CooldownTracker;
use super::roles::{BotRole, UserRole};

/// The slice of an account record the gate consumes.
#[derive(Debug, Clone)]
pub struct AccountProfile {
    pub role: BotRole,
    /// Epoch seconds. `None` means the account never expires.
    pub expires_at: Option<i64>,
}

/// Read access to bot-account records.
///
/// Implemented by the mongo-backed account repository; tests plug in an
/// in-memory directory.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn profile(&self, account_id: &str) -> anyhow::Result<Option<AccountProfile>>;
}

/// Directory granting one fixed profile to every account id.
///
/// Used when no database is configured; the embedder picks the tier.
pub struct StaticAccounts(pub AccountProfile);

#[async_trait]
impl AccountDirectory for StaticAccounts {
    async fn profile(&self, _account_id: &str) -> anyhow::Result<Option<AccountProfile>> {
        Ok(Some(self.0.clone()))
    }
}

/// Why the gate suppressed an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    /// The bot triggered itself and the module opted out of self-messages.
    /// The only silent rejection.
    SelfMessage,
    Cooldown { command: String, remaining_secs: u64 },
    /// No account record exists for the bot account.
    AccountMissing,
    /// Non-admin account past its expiration timestamp.
    AccountExpired,
    BotTier { required: BotRole },
    UserTier { required: UserRole },
}

impl GateRejection {
    /// The notice to send the user, or `None` for silent rejections.
    pub fn notice(&self) -> Option<String> {
        match self {
            GateRejection::SelfMessage => None,
            GateRejection::Cooldown {
                command,
                remaining_secs,
            } => Some(format!(
                "⏳ Please wait {remaining_secs}s before using \"{command}\" again."
            )),
            GateRejection::AccountMissing => {
                Some("❌ No account record found for this bot.".to_string())
            }
            GateRejection::AccountExpired => Some(
                "❌ This bot account has expired. Renew it to keep using the bot.".to_string(),
            ),
            GateRejection::BotTier { required } => Some(format!(
                "❌ The bot needs the {required} tier to run this command."
            )),
            GateRejection::UserTier { required } => Some(format!(
                "❌ You need the {required} tier to run this command."
            )),
        }
    }
}

/// The gate itself: cooldown state plus the collaborators the tier checks
/// read from.
pub struct Gate {
    cooldowns: CooldownTracker,
    accounts: Arc<dyn AccountDirectory>,
    settings: Arc<dyn SettingsStore>,
}

impl Gate {
    pub fn new(accounts: Arc<dyn AccountDirectory>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            cooldowns: CooldownTracker::new(),
            accounts,
            settings,
        }
    }

    /// Evaluate every check for one command invocation.
    ///
    /// `own_id` is the bot account, `sender_id` the invoking user. On `Ok`
    /// the cooldown timestamp has already been recorded.
    pub async fn check(
        &self,
        config: &ModuleConfig,
        own_id: &str,
        sender_id: &str,
        is_self: bool,
    ) -> Result<(), GateRejection> {
        // 1. Self-message filter.
        if is_self && !config.run_on_self_messages {
            return Err(GateRejection::SelfMessage);
        }

        // 2. Cooldown, recorded before the handler runs.
        let window = Duration::from_secs(config.count_down);
        if let Err(remaining_secs) = self.cooldowns.check_and_touch(&config.name, window) {
            return Err(GateRejection::Cooldown {
                command: config.name.clone(),
                remaining_secs,
            });
        }

        // 3. Bot tier.
        let profile = match self.accounts.profile(own_id).await {
            Ok(profile) => profile,
            Err(e) => {
                // Fail closed on directory errors.
                warn!("account lookup for {own_id} failed: {e:#}");
                return Err(GateRejection::AccountMissing);
            }
        };
        let Some(profile) = profile else {
            return Err(GateRejection::AccountMissing);
        };

        if profile.role != BotRole::Admin
            && let Some(expires_at) = profile.expires_at
            && expires_at < chrono::Utc::now().timestamp()
        {
            return Err(GateRejection::AccountExpired);
        }

        if profile.role < config.bot_role {
            return Err(GateRejection::BotTier {
                required: config.bot_role,
            });
        }

        // 4. User tier. The admin-id list is the only user directory: its
        // members resolve to Developer, everyone else to All.
        let admins = self.settings.admin_ids().await;
        let is_admin = admins.iter().any(|id| id == sender_id);
        if config.user_role == UserRole::Developer {
            if !is_admin {
                return Err(GateRejection::UserTier {
                    required: UserRole::Developer,
                });
            }
        } else {
            let resolved = if is_admin {
                UserRole::Developer
            } else {
                UserRole::All
            };
            if resolved < config.user_role {
                return Err(GateRejection::UserTier {
                    required: config.user_role,
                });
            }
        }

        Ok(())
    }
}
