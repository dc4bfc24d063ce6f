//! Role tiers for bot accounts and invoking users.
//!
//! Both hierarchies are strict orders; `Ord` derives from variant order,
//! lowest capability first.

use serde::{Deserialize, Serialize};

/// Capability tier of the bot account itself (independent of the human
/// operating it). Non-Admin tiers may expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BotRole {
    Free,
    Pro,
    Admin,
}

impl std::fmt::Display for BotRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BotRole::Free => "FREE",
            BotRole::Pro => "PRO",
            BotRole::Admin => "ADMIN",
        };
        f.write_str(name)
    }
}

/// Capability tier of the human sending the triggering event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    All,
    User,
    Deputy,
    Admin,
    Developer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UserRole::All => "ALL",
            UserRole::User => "USER",
            UserRole::Deputy => "DEPUTY",
            UserRole::Admin => "ADMIN",
            UserRole::Developer => "DEVELOPER",
        };
        f.write_str(name)
    }
}
