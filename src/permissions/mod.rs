//! Authorization and rate limiting.
//!
//! Two strict role hierarchies guard every command invocation: the tier of
//! the bot account itself (Free < Pro < Admin, may expire) and the tier of
//! the invoking user (All < User < Deputy < Admin < Developer). A global
//! per-command cooldown runs ahead of both.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let gate = Gate::new(accounts, settings);
//!
//! match gate.check(module.config(), &own_id, &sender_id, is_self).await {
//!     Ok(()) => { /* run the handler */ }
//!     Err(rejection) => {
//!         if let Some(notice) = rejection.notice() {
//!             // reply to the triggering message
//!         }
//!     }
//! }
//! ```

mod cooldown;
mod gate;
mod roles;

pub use cooldown::CooldownTracker;
pub use gate::{AccountDirectory, AccountProfile, Gate, GateRejection, StaticAccounts};
pub use roles::{BotRole, UserRole};
