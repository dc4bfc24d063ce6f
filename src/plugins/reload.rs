//! Reload command module.
//!
//! Rebuilds every registry mapping from the module sources, then refires
//! the on-load handlers of the new generation. Restricted to the admin-id
//! list.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::permissions::UserRole;
use crate::platform::{ChatApi, MessageEvent, OutgoingMessage};

struct Reload {
    config: ModuleConfig,
}

/// Factory registered in `plugins::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Reload {
        config: ModuleConfig::new("reload", "System")
            .usage("reload")
            .count_down(1)
            .user_role(UserRole::Developer),
    }))
}

#[async_trait]
impl BotModule for Reload {
    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            run: true,
            ..Default::default()
        }
    }

    async fn run(
        &self,
        api: Arc<dyn ChatApi>,
        ctx: BotContext,
        event: MessageEvent,
        _args: Vec<String>,
    ) -> Result<()> {
        ctx.registry.reload();
        crate::bot::fire_on_load(api.clone(), &ctx);

        api.send_message(
            OutgoingMessage::quoting("✅ Reloaded all handler modules.", event.data.clone()),
            &event.thread_id,
            event.thread_type,
        )
        .await?;
        Ok(())
    }
}
