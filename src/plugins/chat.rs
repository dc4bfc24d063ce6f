//! Chat command module.
//!
//! Keeps a running conversation alive across turns: every reply the module
//! sends is anchored in the reply-continuation store, and each follow-up
//! that quotes it extends the stored history and re-arms the continuation
//! on the new reply.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::continuations::{Continuation, Payload};
use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, MessageEvent, OutgoingMessage};

const NAME: &str = "chat";

struct Chat {
    config: ModuleConfig,
}

/// Factory registered in `plugins::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Chat {
        config: ModuleConfig::new(NAME, "Chat")
            .usage("chat <message>")
            .count_down(1),
    }))
}

/// Conversation turns stored in the continuation payload.
fn history_of(data: &Payload) -> Vec<String> {
    data.get("history")
        .cloned()
        .and_then(|turns| serde_json::from_value(turns).ok())
        .unwrap_or_default()
}

fn acknowledgment(turns: usize) -> String {
    format!("💬 Got it - {turns} turn(s) in this conversation. Reply to this message to continue.")
}

impl Chat {
    /// Send the acknowledgment and arm the continuation on its message id.
    async fn reply_and_arm(
        &self,
        api: &Arc<dyn ChatApi>,
        ctx: &BotContext,
        event: &MessageEvent,
        history: Vec<String>,
    ) -> Result<()> {
        let sent = api
            .send_message(
                OutgoingMessage::quoting(acknowledgment(history.len()), event.data.clone()),
                &event.thread_id,
                event.thread_type,
            )
            .await?;

        ctx.continuations.reply().put(Continuation::new(
            NAME,
            event.thread_id.clone(),
            event.thread_type,
            sent.msg_id,
            Some(event.data.clone()),
            json!({ "history": history }),
        ));
        Ok(())
    }
}

#[async_trait]
impl BotModule for Chat {
    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            run: true,
            handler_reply: true,
            ..Default::default()
        }
    }

    async fn run(
        &self,
        api: Arc<dyn ChatApi>,
        ctx: BotContext,
        event: MessageEvent,
        args: Vec<String>,
    ) -> Result<()> {
        if args.is_empty() {
            api.send_message(
                OutgoingMessage::quoting("Usage: chat <message>", event.data.clone()),
                &event.thread_id,
                event.thread_type,
            )
            .await?;
            return Ok(());
        }

        let history = vec![args.join(" ")];
        self.reply_and_arm(&api, &ctx, &event, history).await
    }

    async fn handler_reply(
        &self,
        api: Arc<dyn ChatApi>,
        ctx: BotContext,
        event: MessageEvent,
        args: Vec<String>,
        continuation: Continuation<Payload>,
    ) -> Result<()> {
        let mut history = history_of(&continuation.data);
        history.push(args.join(" "));
        self.reply_and_arm(&api, &ctx, &event, history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_round_trips_through_payload() {
        let data = json!({ "history": ["hello", "again"] });
        assert_eq!(history_of(&data), vec!["hello", "again"]);
    }

    #[test]
    fn missing_or_malformed_history_is_empty() {
        assert!(history_of(&json!({})).is_empty());
        assert!(history_of(&json!({ "history": 7 })).is_empty());
    }
}
