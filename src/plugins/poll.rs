//! Poll command module.
//!
//! Votes arrive as reactions to the poll message (reaction continuation);
//! recalling the poll message closes it (undo continuation). Each counted
//! vote re-arms the reaction continuation with the updated tally.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use crate::continuations::{Continuation, Payload};
use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, MessageEvent, OutgoingMessage, ReactionEvent, UndoEvent};

const NAME: &str = "poll";

struct Poll {
    config: ModuleConfig,
}

/// Factory registered in `plugins::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Poll {
        config: ModuleConfig::new(NAME, "Group")
            .usage("poll <question>")
            .count_down(5),
    }))
}

/// Count one vote for `icon` in the payload's tally.
fn record_vote(data: &Payload, icon: &str) -> Payload {
    let mut data = data.clone();
    let votes = data
        .as_object_mut()
        .and_then(|obj| obj.get_mut("votes"))
        .and_then(|v| v.as_object_mut());

    if let Some(votes) = votes {
        let count = votes.get(icon).and_then(|c| c.as_u64()).unwrap_or(0);
        votes.insert(icon.to_string(), json!(count + 1));
    }
    data
}

fn total_votes(data: &Payload) -> u64 {
    data.get("votes")
        .and_then(|v| v.as_object())
        .map(|votes| votes.values().filter_map(|c| c.as_u64()).sum())
        .unwrap_or(0)
}

fn question_of(data: &Payload) -> String {
    data.get("question")
        .and_then(|q| q.as_str())
        .unwrap_or("(unknown)")
        .to_string()
}

#[async_trait]
impl BotModule for Poll {
    fn config(&self) -> &ModuleConfig {
        &self.config
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            run: true,
            handler_reaction: true,
            handler_undo: true,
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
                OutgoingMessage::quoting("Usage: poll <question>", event.data.clone()),
                &event.thread_id,
                event.thread_type,
            )
            .await?;
            return Ok(());
        }

        let question = args.join(" ");
        let text = format!(
            "📊 {question}\nReact to this message to vote. Recall it to close the poll."
        );
        let sent = api
            .send_message(
                OutgoingMessage::quoting(text, event.data.clone()),
                &event.thread_id,
                event.thread_type,
            )
            .await?;

        // Seed reaction so the vote affordance is visible.
        api.add_reaction("👍", &event.thread_id, &sent.msg_id).await?;

        let data = json!({ "question": question, "votes": {} });
        ctx.continuations.reaction().put(Continuation::new(
            NAME,
            event.thread_id.clone(),
            event.thread_type,
            sent.msg_id.clone(),
            Some(event.data.clone()),
            data.clone(),
        ));
        ctx.continuations.undo().put(Continuation::new(
            NAME,
            event.thread_id.clone(),
            event.thread_type,
            sent.msg_id,
            Some(event.data.clone()),
            data,
        ));
        Ok(())
    }

    async fn handler_reaction(
        &self,
        _api: Arc<dyn ChatApi>,
        ctx: BotContext,
        event: ReactionEvent,
        continuation: Continuation<Payload>,
    ) -> Result<()> {
        // The bot's own seed reaction is not a vote.
        if event.is_self {
            return Ok(());
        }

        let data = record_vote(&continuation.data, &event.data.icon);
        ctx.continuations.reaction().put(Continuation::new(
            NAME,
            continuation.thread_id,
            continuation.thread_type,
            continuation.message_id,
            continuation.quote,
            data,
        ));
        Ok(())
    }

    async fn handler_undo(
        &self,
        api: Arc<dyn ChatApi>,
        _ctx: BotContext,
        event: UndoEvent,
        continuation: Continuation<Payload>,
    ) -> Result<()> {
        let text = format!(
            "📊 Poll closed: {} - {} vote(s) counted.",
            question_of(&continuation.data),
            total_votes(&continuation.data)
        );
        api.send_message(OutgoingMessage::text(text), &event.thread_id, event.thread_type)
            .await?;
        Ok(())
    }
}
