//! Cache module - Modular caching system using Moka.
//!
//! This module provides a registry-based caching system that the correlation
//! stores and the persistence repositories build on.
//!
//! ## Architecture
//!
//! The cache system follows a registry pattern:
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Typed wrapper over a bounded Moka cache
//! - Individual caches are created per domain (continuations, accounts,
//!   settings, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Create a cache for account records
//! let accounts = registry.get_or_create::<String, BotAccount>(
//!     "accounts",
//!     CacheConfig::directory(),
//! );
//!
//! // Use the cache
//! accounts.insert(account_id, account);
//! let account = accounts.get(&account_id);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
