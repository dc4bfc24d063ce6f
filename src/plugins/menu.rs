//! Menu command module.
//!
//! Lists every registered prefixed command from the live registry.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::modules::{BotContext, BotModule, Capabilities, ModuleConfig};
use crate::platform::{ChatApi, MessageEvent, OutgoingMessage};

struct Menu {
    config: ModuleConfig,
}

/// Factory registered in `plugins::all`.
pub fn module() -> Result<Arc<dyn BotModule>> {
    Ok(Arc::new(Menu {
        config: ModuleConfig::new("menu", "Utility")
            .usage("menu")
            .count_down(10),
    }))
}

/// Render the command listing. Entries are (name, tag, usage).
fn render_menu(mut entries: Vec<(String, String, String)>) -> String {
    entries.sort();

    let mut text = String::from("📋 COMMAND LIST:\n\n");
    for (name, tag, usage) in entries {
        text.push_str(&format!("🔹 {name}\n"));
        if !usage.is_empty() {
            text.push_str(&format!("💡 Usage: {usage}\n"));
        }
        text.push_str(&format!("🏷️ Tag: {tag}\n"));
        text.push_str("─────────────────\n");
    }
    text
}

#[async_trait]
impl BotModule for Menu {
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
        let commands = ctx.registry.commands();

        let text = if commands.is_empty() {
            "No commands registered.".to_string()
        } else {
            let entries = commands
                .values()
                .map(|module| {
                    let config = module.config();
                    (config.name.clone(), config.tag.clone(), config.usage.clone())
                })
                .collect();
            render_menu(entries)
        };

        api.send_message(
            OutgoingMessage::quoting(text, event.data.clone()),
            &event.thread_id,
            event.thread_type,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sorted_entries_with_usage() {
        let text = render_menu(vec![
            ("ping".into(), "Utility".into(), "ping".into()),
            ("chat".into(), "Chat".into(), "chat <message>".into()),
        ]);

        let chat_pos = text.find("🔹 chat").unwrap();
        let ping_pos = text.find("🔹 ping").unwrap();
        assert!(chat_pos < ping_pos);
        assert!(text.contains("💡 Usage: chat <message>"));
    }

    #[test]
    fn omits_empty_usage_lines() {
        let text = render_menu(vec![("ping".into(), "Utility".into(), String::new())]);
        assert!(!text.contains("💡 Usage:"));
    }
}
