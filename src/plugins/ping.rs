//! Ping command module.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, MessageEvent, OutgoingMessage};

struct Ping {
    config: ModuleConfig,
}

/// Factory registered in `plugins::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Ping {
        config: ModuleConfig::new("ping", "Utility")
            .usage("ping")
            .count_down(3),
    }))
}

#[async_trait]
impl BotModule for Ping {
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
        _ctx: BotContext,
        event: MessageEvent,
        _args: Vec<String>,
    ) -> Result<()> {
        api.send_message(
            OutgoingMessage::quoting("🏓 Pong!", event.data.clone()),
            &event.thread_id,
            event.thread_type,
        )
        .await?;
        Ok(())
    }
}
