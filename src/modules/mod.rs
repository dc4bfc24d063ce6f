//! Handler module contract.
//!
//! A handler module is a value implementing [`BotModule`]: a config record
//! plus any non-empty subset of capabilities (prefixed command, unprefixed
//! command, continuation callbacks, lifecycle hook, group-event handler,
//! catch-all). Modules are discovered from startup-time registration lists
//! (see `plugins::all` / `events::all`) and classified into the
//! [`registry::ModuleRegistry`] by the capabilities they declare.

pub mod registry;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::cache::CacheRegistry;
use crate::config::SettingsStore;
use crate::continuations::{Continuation, Continuations, Payload};
use crate::database::UserRepository;
use crate::permissions::{AccountDirectory, BotRole, UserRole};
use crate::platform::{ChatApi, Event, GroupEvent, MessageEvent, ReactionEvent, UndoEvent};

pub use registry::{ModuleFactory, ModuleMap, ModuleRegistry};

/// Metadata every handler module carries.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Unique name; also the command word for command capabilities.
    pub name: String,
    /// Category shown in command listings.
    pub tag: String,
    /// Usage hint shown in command listings.
    pub usage: String,
    /// Cooldown window in seconds, global per command name.
    pub count_down: u64,
    /// Minimum tier of the invoking user.
    pub user_role: UserRole,
    /// Minimum tier of the bot account.
    pub bot_role: BotRole,
    /// Whether the module also runs on the bot's own messages.
    pub run_on_self_messages: bool,
}

impl ModuleConfig {
    /// Config with permissive defaults: no cooldown, open tiers, runs on
    /// self-messages.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            usage: String::new(),
            count_down: 0,
            user_role: UserRole::All,
            bot_role: BotRole::Free,
            run_on_self_messages: true,
        }
    }

    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    #[must_use]
    pub fn count_down(mut self, seconds: u64) -> Self {
        self.count_down = seconds;
        self
    }

    #[must_use]
    pub fn user_role(mut self, role: UserRole) -> Self {
        self.user_role = role;
        self
    }

    #[must_use]
    pub fn bot_role(mut self, role: BotRole) -> Self {
        self.bot_role = role;
        self
    }

    #[must_use]
    pub fn skip_self_messages(mut self) -> Self {
        self.run_on_self_messages = false;
        self
    }
}

/// Which capabilities a module implements.
///
/// The registry reads this once per load to decide which mappings the
/// module lands in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub run: bool,
    pub no_prefix: bool,
    pub on_load: bool,
    pub handler_reply: bool,
    pub handler_reaction: bool,
    pub handler_undo: bool,
    pub handler_event: bool,
    pub any_handler: bool,
}

impl Capabilities {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A handler module. Implementations override the methods matching the
/// capabilities they declare; a dispatched call into an undeclared
/// capability surfaces as a handler fault.
#[async_trait]
pub trait BotModule: Send + Sync {
    fn config(&self) -> &ModuleConfig;

    fn capabilities(&self) -> Capabilities;

    /// Prefixed command entry point.
    async fn run(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: MessageEvent,
        _args: Vec<String>,
    ) -> Result<()> {
        anyhow::bail!("module '{}' declares no run handler", self.config().name)
    }

    /// Unprefixed command entry point.
    async fn no_prefix(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: MessageEvent,
        _args: Vec<String>,
    ) -> Result<()> {
        anyhow::bail!(
            "module '{}' declares no no-prefix handler",
            self.config().name
        )
    }

    /// Fires once per registry (re)load, before any event is routed against
    /// the new generation.
    async fn on_load(&self, _api: Arc<dyn ChatApi>, _ctx: BotContext) -> Result<()> {
        Ok(())
    }

    /// A message quoted one of this module's live replies.
    async fn handler_reply(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: MessageEvent,
        _args: Vec<String>,
        _continuation: Continuation<Payload>,
    ) -> Result<()> {
        anyhow::bail!(
            "module '{}' declares no reply handler",
            self.config().name
        )
    }

    /// A reaction referenced one of this module's live replies.
    async fn handler_reaction(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: ReactionEvent,
        _continuation: Continuation<Payload>,
    ) -> Result<()> {
        anyhow::bail!(
            "module '{}' declares no reaction handler",
            self.config().name
        )
    }

    /// One of this module's live replies was recalled.
    async fn handler_undo(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: UndoEvent,
        _continuation: Continuation<Payload>,
    ) -> Result<()> {
        anyhow::bail!("module '{}' declares no undo handler", self.config().name)
    }

    /// Group-membership change.
    async fn handler_event(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: GroupEvent,
    ) -> Result<()> {
        anyhow::bail!(
            "module '{}' declares no group-event handler",
            self.config().name
        )
    }

    /// Fires on every normalized event regardless of routing outcome.
    async fn any_handler(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        _event: Event,
    ) -> Result<()> {
        Ok(())
    }
}

/// Shared collaborators handed to every handler invocation.
///
/// The registry mappings and the correlation stores are only ever mutated
/// through their own operations (`load`/`reload`, `put`); handlers hold the
/// context by value but never replace its parts.
#[derive(Clone)]
pub struct BotContext {
    pub settings: Arc<dyn SettingsStore>,
    pub accounts: Arc<dyn AccountDirectory>,
    /// Present when a database is configured.
    pub users: Option<Arc<UserRepository>>,
    pub registry: Arc<ModuleRegistry>,
    pub continuations: Arc<Continuations>,
    pub cache: Arc<CacheRegistry>,
}
