//! Welcome event module.
//!
//! Greets members joining a group and waves off members leaving it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, GroupEvent, GroupEventKind, OutgoingMessage, ThreadType};

struct Welcome {
    config: ModuleConfig,
}

/// Factory registered in `events::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Welcome {
        config: ModuleConfig::new("welcome", "Group"),
    }))
}

fn greeting(event: &GroupEvent) -> Option<String> {
    let members = event.member_ids.len();
    match event.kind {
        GroupEventKind::MemberJoin if members > 1 => {
            Some(format!("👋 Welcome to the group, all {members} of you!"))
        }
        GroupEventKind::MemberJoin => Some("👋 Welcome to the group!".to_string()),
        GroupEventKind::MemberLeave | GroupEventKind::MemberRemoved => {
            Some("👋 Goodbye.".to_string())
        }
        GroupEventKind::NameChanged => None,
    }
}

#[async_trait]
impl BotModule for Welcome {
    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            handler_event: true,
            ..Default::default()
        }
    }

    async fn handler_event(
        &self,
        api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        event: GroupEvent,
    ) -> Result<()> {
        let Some(text) = greeting(&event) else {
            return Ok(());
        };
        api.send_message(
            OutgoingMessage::text(text),
            &event.thread_id,
            ThreadType::Group,
        )
        .await?;
        Ok(())
    }
}
