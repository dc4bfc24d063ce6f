//! Observer event module.
//!
//! The cross-cutting observability hook: logs every normalized event
//! through the any-handler broadcast, group-membership changes in detail,
//! and announces each registry generation via its on-load hook.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, Event, GroupEvent};

struct Observer {
    config: ModuleConfig,
}

/// Factory registered in `events::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Observer {
        config: ModuleConfig::new("observer", "System"),
    }))
}

#[async_trait]
impl BotModule for Observer {
    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            handler_event: true,
            on_load: true,
            any_handler: true,
            ..Default::default()
        }
    }

    async fn on_load(&self, _api: Arc<dyn ChatApi>, ctx: BotContext) -> Result<()> {
        let generation = ctx.registry.snapshot();
        info!(
            commands = generation.commands.len(),
            events = generation.event_handlers.len(),
            "observer online"
        );
        Ok(())
    }

    async fn handler_event(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        event: GroupEvent,
    ) -> Result<()> {
        info!(
            thread = %event.thread_id,
            kind = ?event.kind,
            members = event.member_ids.len(),
            "group membership changed"
        );
        Ok(())
    }

    async fn any_handler(
        &self,
        _api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        event: Event,
    ) -> Result<()> {
        info!(kind = event.kind(), thread = event.thread_id(), "event observed");
        Ok(())
    }
}
