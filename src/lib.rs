//! Kairo - Modular Chat-Automation Bot Engine
//!
//! A command/event dispatch engine that sits on top of an external
//! messaging-platform connector. The connector handles login, sessions and
//! wire transport; this crate decides which handler module runs for each
//! inbound event, enforces authorization and cooldowns, and keeps
//! short-lived conversational continuations alive across turns.
//!
//! ## Architecture
//!
//! - `platform` - Connector contract (event model + action surface)
//! - `config` - Environment configuration and the settings contract
//! - `database` - MongoDB integration (accounts, settings, tracked users)
//! - `cache` - Bounded caching with Moka
//! - `continuations` - Reply/reaction/undo correlation stores
//! - `modules` - Handler contract and the module registry
//! - `permissions` - Role tiers, cooldowns and the authorization gate
//! - `bot` - Event router and runtime loop
//! - `plugins` - Built-in command modules (extensible)
//! - `events` - Built-in event modules (extensible)
//! - `utils` - Utility functions
//!
//! ## Usage
//!
//! ```rust,ignore
//! let api: Arc<dyn ChatApi> = connector.api();          // external connector
//! let (tx, rx) = tokio::sync::mpsc::channel(256);       // connector -> engine
//!
//! let config = Config::from_env();
//! let router = bot::build_from_config(api, &config).await?;
//! bot::run(router, rx).await;
//! ```

pub mod bot;
pub mod cache;
pub mod config;
pub mod continuations;
pub mod database;
pub mod events;
pub mod modules;
pub mod permissions;
pub mod platform;
pub mod plugins;
pub mod utils;

pub use bot::{build_from_config, build_router, run, Router};
pub use config::{Config, SettingsStore, StaticSettings};
pub use continuations::{Continuation, ContinuationKey, Continuations, Payload};
pub use modules::{BotContext, BotModule, Capabilities, ModuleConfig, ModuleRegistry};
pub use permissions::{BotRole, Gate, GateRejection, UserRole};
pub use platform::{ChatApi, Event, OutgoingMessage, SentMessage, ThreadType};
