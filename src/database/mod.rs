//! Database module exports.

mod models;
mod mongo;
mod repository;

pub use models::{BotAccount, ConfigEntry, TrackedUser};
pub use mongo::Database;
pub use repository::{AccountRepository, SettingsRepository, UserRepository};
