//! Event router.
//!
//! The runtime entry point invoked once per inbound platform event.
//! Classifies the event, tokenizes textual content, consults the module
//! registry and the correlation stores, applies the authorization gate and
//! spawns the selected handlers. The router never awaits handler
//! completion: invocations are fire-and-forget tasks, so handlers for
//! different events run concurrently while per-thread delivery order into
//! the router is preserved by the runtime loop.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::continuations::ContinuationKey;
use crate::modules::{BotContext, BotModule};
use crate::permissions::Gate;
use crate::platform::{
    ChatApi, Event, GroupEvent, MessageEvent, OutgoingMessage, ReactionEvent, UndoEvent,
};
use crate::utils::tokenize;

/// Per-account event router.
pub struct Router {
    api: Arc<dyn ChatApi>,
    ctx: BotContext,
    gate: Arc<Gate>,
}

impl Router {
    pub fn new(api: Arc<dyn ChatApi>, ctx: BotContext) -> Self {
        let gate = Arc::new(Gate::new(ctx.accounts.clone(), ctx.settings.clone()));
        Self { api, ctx, gate }
    }

    /// The shared collaborators handlers receive.
    pub fn context(&self) -> &BotContext {
        &self.ctx
    }

    /// Route one inbound event.
    pub async fn dispatch(&self, event: Event) {
        debug!(kind = event.kind(), thread = event.thread_id(), "routing event");

        match &event {
            Event::Message(msg) => {
                self.track_sender(msg);
                // Continuation dispatch and command dispatch are not
                // mutually exclusive: both run for the same message when
                // both apply.
                if msg.data.quote.is_some() {
                    self.dispatch_reply(msg).await;
                }
                self.dispatch_message(msg).await;
            }
            Event::Reaction(reaction) => self.dispatch_reaction(reaction),
            Event::Undo(undo) => self.dispatch_undo(undo),
            Event::GroupEvent(group) => self.dispatch_group_event(group),
        }

        self.broadcast_any(event);
    }

    /// Fire every on-load handler of the current generation.
    pub fn run_on_load(&self) {
        fire_on_load(self.api.clone(), &self.ctx);
    }

    /// Command dispatch for a message event.
    async fn dispatch_message(&self, msg: &MessageEvent) {
        let tokens = tokenize(&msg.data.content);
        if tokens.is_empty() {
            return;
        }

        let prefix = self.ctx.settings.prefix().await;

        if tokens.len() == 1 && tokens[0] == prefix {
            let notice = format!("❌ No command name given after \"{prefix}\".");
            self.send_notice(msg, notice).await;
            return;
        }

        let generation = self.ctx.registry.snapshot();
        let first = tokens[0].as_str();
        // No-prefix commands are only consulted for tokens that do not
        // start with the prefix.
        let (module, prefixed) = match first.strip_prefix(prefix.as_str()) {
            Some(name) => (generation.commands.get(name).cloned(), true),
            None => (generation.no_prefix_commands.get(first).cloned(), false),
        };

        let Some(module) = module else {
            debug!("no command route for \"{first}\"");
            return;
        };

        let args = tokens[1..].to_vec();
        self.invoke_command(module, prefixed, msg.clone(), args);
    }

    /// Gate and run a command handler as a detached task.
    fn invoke_command(
        &self,
        module: Arc<dyn BotModule>,
        prefixed: bool,
        msg: MessageEvent,
        args: Vec<String>,
    ) {
        let api = self.api.clone();
        let ctx = self.ctx.clone();
        let gate = self.gate.clone();

        tokio::spawn(async move {
            let own_id = api.own_id();
            let verdict = gate
                .check(module.config(), &own_id, &msg.data.uid_from, msg.is_self)
                .await;

            match verdict {
                Err(rejection) => {
                    debug!(
                        "command \"{}\" gated: {rejection:?}",
                        module.config().name
                    );
                    if let Some(text) = rejection.notice() {
                        send_notice(&api, &msg, text).await;
                    }
                }
                Ok(()) => {
                    let name = module.config().name.clone();
                    let result = if prefixed {
                        module.run(api, ctx, msg, args).await
                    } else {
                        module.no_prefix(api, ctx, msg, args).await
                    };
                    if let Err(e) = result {
                        error!("handler \"{name}\" failed: {e:#}");
                    }
                }
            }
        });
    }

    /// Reply-continuation dispatch for a quoting message.
    async fn dispatch_reply(&self, msg: &MessageEvent) {
        let Some(quote) = &msg.data.quote else { return };

        let args = tokenize(&msg.data.content);
        let prefix = self.ctx.settings.prefix().await;
        // Prefixed commands always take precedence over a pending
        // conversation.
        if args.first().is_some_and(|t| t.starts_with(prefix.as_str())) {
            return;
        }

        let key = ContinuationKey::new(msg.thread_id.clone(), quote.global_msg_id.clone());
        let Some(continuation) = self.ctx.continuations.reply().get(&key) else {
            debug!(
                "no live reply continuation for {}:{}",
                msg.thread_id, quote.global_msg_id
            );
            return;
        };

        let generation = self.ctx.registry.snapshot();
        let Some(module) = generation
            .reply_handlers
            .get(&continuation.handler_name)
            .cloned()
        else {
            debug!(
                "reply continuation names unknown handler \"{}\"",
                continuation.handler_name
            );
            return;
        };

        if msg.is_self && !module.config().run_on_self_messages {
            return;
        }

        let api = self.api.clone();
        let ctx = self.ctx.clone();
        let event = msg.clone();
        tokio::spawn(async move {
            let name = module.config().name.clone();
            if let Err(e) = module
                .handler_reply(api, ctx, event, args, continuation)
                .await
            {
                error!("reply handler \"{name}\" failed: {e:#}");
            }
        });
    }

    fn dispatch_reaction(&self, reaction: &ReactionEvent) {
        let Some(target) = reaction.data.targets.first() else {
            return;
        };

        let key = ContinuationKey::new(
            reaction.thread_id.clone(),
            target.global_msg_id.clone(),
        );
        let Some(continuation) = self.ctx.continuations.reaction().get(&key) else {
            debug!(
                "no live reaction continuation for {}:{}",
                reaction.thread_id, target.global_msg_id
            );
            return;
        };

        let generation = self.ctx.registry.snapshot();
        let Some(module) = generation
            .reaction_handlers
            .get(&continuation.handler_name)
            .cloned()
        else {
            return;
        };

        let api = self.api.clone();
        let ctx = self.ctx.clone();
        let event = reaction.clone();
        tokio::spawn(async move {
            let name = module.config().name.clone();
            if let Err(e) = module.handler_reaction(api, ctx, event, continuation).await {
                error!("reaction handler \"{name}\" failed: {e:#}");
            }
        });
    }

    fn dispatch_undo(&self, undo: &UndoEvent) {
        let key = ContinuationKey::new(undo.thread_id.clone(), undo.data.global_msg_id.clone());
        let Some(continuation) = self.ctx.continuations.undo().get(&key) else {
            debug!(
                "no live undo continuation for {}:{}",
                undo.thread_id, undo.data.global_msg_id
            );
            return;
        };

        let generation = self.ctx.registry.snapshot();
        let Some(module) = generation
            .undo_handlers
            .get(&continuation.handler_name)
            .cloned()
        else {
            return;
        };

        let api = self.api.clone();
        let ctx = self.ctx.clone();
        let event = undo.clone();
        tokio::spawn(async move {
            let name = module.config().name.clone();
            if let Err(e) = module.handler_undo(api, ctx, event, continuation).await {
                error!("undo handler \"{name}\" failed: {e:#}");
            }
        });
    }

    /// Group-membership events fan out to every registered event handler.
    fn dispatch_group_event(&self, group: &GroupEvent) {
        let generation = self.ctx.registry.snapshot();
        for (name, module) in &generation.event_handlers {
            let api = self.api.clone();
            let ctx = self.ctx.clone();
            let event = group.clone();
            let module = module.clone();
            let name = name.clone();
            tokio::spawn(async move {
                if let Err(e) = module.handler_event(api, ctx, event).await {
                    error!("event handler \"{name}\" failed: {e:#}");
                }
            });
        }
    }

    /// Every event also reaches every any-handler, independent of whether a
    /// more specific route matched.
    fn broadcast_any(&self, event: Event) {
        let generation = self.ctx.registry.snapshot();
        for (name, module) in &generation.any_handlers {
            let api = self.api.clone();
            let ctx = self.ctx.clone();
            let event = event.clone();
            let module = module.clone();
            let name = name.clone();
            tokio::spawn(async move {
                if let Err(e) = module.any_handler(api, ctx, event).await {
                    error!("any handler \"{name}\" failed: {e:#}");
                }
            });
        }
    }

    /// Record the sender in the background (when a database is configured).
    fn track_sender(&self, msg: &MessageEvent) {
        if msg.is_self {
            return;
        }
        if let Some(users) = &self.ctx.users {
            users.clone().upsert_background(
                msg.data.uid_from.clone(),
                Some(msg.data.content.text().to_string()),
            );
        }
    }

    async fn send_notice(&self, msg: &MessageEvent, text: String) {
        send_notice(&self.api, msg, text).await;
    }
}

/// Fire every on-load handler of the current generation as detached tasks.
///
/// Runs once per (re)load, before the runtime routes the next event against
/// the new generation.
pub fn fire_on_load(api: Arc<dyn ChatApi>, ctx: &BotContext) {
    let generation = ctx.registry.snapshot();
    for (name, module) in &generation.on_load_handlers {
        let api = api.clone();
        let ctx = ctx.clone();
        let module = module.clone();
        let name = name.clone();
        tokio::spawn(async move {
            if let Err(e) = module.on_load(api, ctx).await {
                error!("on-load handler \"{name}\" failed: {e:#}");
            }
        });
    }
}

/// User-visible failures are always replies quoting the triggering message.
async fn send_notice(api: &Arc<dyn ChatApi>, msg: &MessageEvent, text: String) {
    let message = OutgoingMessage::quoting(text, msg.data.clone());
    if let Err(e) = api
        .send_message(message, &msg.thread_id, msg.thread_type)
        .await
    {
        warn!("failed to send notice: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::cache::CacheRegistry;
    use crate::config::StaticSettings;
    use crate::continuations::{Continuation, Continuations, Payload};
    use crate::modules::{Capabilities, ModuleConfig, ModuleFactory, ModuleRegistry};
    use crate::permissions::{AccountProfile, BotRole, StaticAccounts};
    use crate::platform::mock::MockApi;
    use crate::platform::{
        Content, GroupEventKind, MessageData, MessageRef, Quote, ReactionData, ThreadType,
        UndoData,
    };

    /// Shared call log for recording modules.
    type Calls = Arc<Mutex<Vec<String>>>;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kairo=debug")
            .with_test_writer()
            .try_init();
    }

    /// Module recording every callback it receives.
    struct Recorder {
        config: ModuleConfig,
        caps: Capabilities,
        calls: Calls,
    }

    #[async_trait::async_trait]
    impl crate::modules::BotModule for Recorder {
        fn config(&self) -> &ModuleConfig {
            &self.config
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        async fn run(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            _event: MessageEvent,
            args: Vec<String>,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .push(format!("run:{}:{}", self.config.name, args.join(",")));
            Ok(())
        }

        async fn no_prefix(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            _event: MessageEvent,
            args: Vec<String>,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .push(format!("no_prefix:{}:{}", self.config.name, args.join(",")));
            Ok(())
        }

        async fn on_load(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
        ) -> anyhow::Result<()> {
            self.calls.lock().push(format!("on_load:{}", self.config.name));
            Ok(())
        }

        async fn handler_reply(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            event: MessageEvent,
            _args: Vec<String>,
            continuation: Continuation<Payload>,
        ) -> anyhow::Result<()> {
            self.calls.lock().push(format!(
                "reply:{}:{}:{}",
                self.config.name, event.thread_id, continuation.data
            ));
            Ok(())
        }

        async fn handler_reaction(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            event: crate::platform::ReactionEvent,
            _continuation: Continuation<Payload>,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .push(format!("reaction:{}:{}", self.config.name, event.data.icon));
            Ok(())
        }

        async fn handler_undo(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            event: crate::platform::UndoEvent,
            _continuation: Continuation<Payload>,
        ) -> anyhow::Result<()> {
            self.calls.lock().push(format!(
                "undo:{}:{}",
                self.config.name, event.data.global_msg_id
            ));
            Ok(())
        }

        async fn handler_event(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            _event: GroupEvent,
        ) -> anyhow::Result<()> {
            self.calls.lock().push(format!("event:{}", self.config.name));
            Ok(())
        }

        async fn any_handler(
            &self,
            _api: Arc<dyn ChatApi>,
            _ctx: BotContext,
            event: Event,
        ) -> anyhow::Result<()> {
            self.calls
                .lock()
                .push(format!("any:{}:{}", self.config.name, event.kind()));
            Ok(())
        }
    }

    fn recorder(config: ModuleConfig, caps: Capabilities, calls: Calls) -> ModuleFactory {
        Box::new(move || {
            Ok(Arc::new(Recorder {
                config: config.clone(),
                caps,
                calls: calls.clone(),
            }) as Arc<dyn crate::modules::BotModule>)
        })
    }

    fn test_router(
        commands: Vec<ModuleFactory>,
        events: Vec<ModuleFactory>,
        api: Arc<MockApi>,
    ) -> Router {
        init_tracing();
        let cache = Arc::new(CacheRegistry::new());
        let registry = Arc::new(ModuleRegistry::new(commands, events));
        registry.load();
        let ctx = BotContext {
            settings: Arc::new(StaticSettings::new("!", vec![])),
            accounts: Arc::new(StaticAccounts(AccountProfile {
                role: BotRole::Admin,
                expires_at: None,
            })),
            users: None,
            registry,
            continuations: Arc::new(Continuations::new(&cache)),
            cache,
        };
        Router::new(api, ctx)
    }

    fn message(thread: &str, msg_id: &str, sender: &str, text: &str) -> MessageEvent {
        MessageEvent {
            thread_id: thread.to_string(),
            thread_type: ThreadType::Group,
            is_self: false,
            data: MessageData {
                msg_id: msg_id.to_string(),
                uid_from: sender.to_string(),
                content: Content::from(text),
                quote: None,
            },
        }
    }

    fn quoting(thread: &str, text: &str, quoted_id: &str) -> MessageEvent {
        let mut msg = message(thread, "m-quote", "u1", text);
        msg.data.quote = Some(Quote {
            global_msg_id: quoted_id.to_string(),
            content: None,
        });
        msg
    }

    /// Let spawned handler tasks run to completion.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    const CMD: Capabilities = Capabilities {
        run: true,
        no_prefix: false,
        on_load: false,
        handler_reply: false,
        handler_reaction: false,
        handler_undo: false,
        handler_event: false,
        any_handler: false,
    };

    #[tokio::test]
    async fn bare_prefix_emits_exactly_one_usage_notice() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let router = test_router(
            vec![recorder(ModuleConfig::new("ping", "t"), CMD, calls.clone())],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "!")))
            .await;
        settle().await;

        assert_eq!(api.sent_count(), 1);
        assert!(api.texts()[0].contains("No command name"));
        // The notice quotes the triggering message.
        assert_eq!(api.sent.lock()[0].quoted_msg_id.as_deref(), Some("m1"));
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn prefixed_command_runs_with_remaining_tokens_as_args() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let router = test_router(
            vec![recorder(ModuleConfig::new("ping", "t"), CMD, calls.clone())],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "!ping now please")))
            .await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["run:ping:now,please"]);
    }

    #[tokio::test]
    async fn prefixed_lookup_never_falls_back_to_no_prefix_map() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let no_prefix_only = Capabilities {
            no_prefix: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(
                ModuleConfig::new("ping", "t"),
                no_prefix_only,
                calls.clone(),
            )],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "!ping")))
            .await;
        settle().await;

        assert!(calls.lock().is_empty());
        assert_eq!(api.sent_count(), 0);
    }

    #[tokio::test]
    async fn no_prefix_command_dispatches_on_bare_token() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let no_prefix_only = Capabilities {
            no_prefix: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(
                ModuleConfig::new("ping", "t"),
                no_prefix_only,
                calls.clone(),
            )],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "ping fast")))
            .await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["no_prefix:ping:fast"]);
    }

    #[tokio::test]
    async fn unmatched_content_is_a_silent_routing_miss() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let router = test_router(
            vec![recorder(ModuleConfig::new("ping", "t"), CMD, calls.clone())],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "hello there")))
            .await;
        settle().await;

        assert!(calls.lock().is_empty());
        assert_eq!(api.sent_count(), 0);
    }

    #[tokio::test]
    async fn reply_continuation_round_trip_preserves_payload() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let caps = Capabilities {
            handler_reply: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(ModuleConfig::new("chat", "t"), caps, calls.clone())],
            vec![],
            api.clone(),
        );

        router.context().continuations.reply().put(Continuation::new(
            "chat",
            "t1",
            ThreadType::Group,
            "bot-9",
            None,
            json!({"history": ["hi"]}),
        ));

        router
            .dispatch(Event::Message(quoting("t1", "and then?", "bot-9")))
            .await;
        settle().await;

        assert_eq!(
            *calls.lock(),
            vec![format!("reply:chat:t1:{}", json!({"history": ["hi"]}))]
        );
    }

    #[tokio::test]
    async fn continuation_never_matches_another_thread() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let caps = Capabilities {
            handler_reply: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(ModuleConfig::new("chat", "t"), caps, calls.clone())],
            vec![],
            api.clone(),
        );

        router.context().continuations.reply().put(Continuation::new(
            "chat",
            "t1",
            ThreadType::Group,
            "bot-9",
            None,
            json!(null),
        ));

        // Same quoted message id, different thread.
        router
            .dispatch(Event::Message(quoting("t2", "and then?", "bot-9")))
            .await;
        settle().await;

        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn continuation_and_command_dispatch_both_fire() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let reply_caps = Capabilities {
            handler_reply: true,
            ..Default::default()
        };
        let no_prefix_caps = Capabilities {
            no_prefix: true,
            ..Default::default()
        };
        let router = test_router(
            vec![
                recorder(ModuleConfig::new("chat", "t"), reply_caps, calls.clone()),
                recorder(ModuleConfig::new("ping", "t"), no_prefix_caps, calls.clone()),
            ],
            vec![],
            api.clone(),
        );

        router.context().continuations.reply().put(Continuation::new(
            "chat",
            "t1",
            ThreadType::Group,
            "bot-9",
            None,
            json!(1),
        ));

        // Unprefixed content that is both a quote follow-up and a
        // no-prefix command.
        router
            .dispatch(Event::Message(quoting("t1", "ping hard", "bot-9")))
            .await;
        settle().await;

        let calls = calls.lock();
        assert!(calls.iter().any(|c| c.starts_with("reply:chat")));
        assert!(calls.contains(&"no_prefix:ping:hard".to_string()));
    }

    #[tokio::test]
    async fn prefixed_content_suppresses_continuation_dispatch() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let reply_caps = Capabilities {
            handler_reply: true,
            ..Default::default()
        };
        let router = test_router(
            vec![
                recorder(ModuleConfig::new("chat", "t"), reply_caps, calls.clone()),
                recorder(ModuleConfig::new("ping", "t"), CMD, calls.clone()),
            ],
            vec![],
            api.clone(),
        );

        router.context().continuations.reply().put(Continuation::new(
            "chat",
            "t1",
            ThreadType::Group,
            "bot-9",
            None,
            json!(1),
        ));

        router
            .dispatch(Event::Message(quoting("t1", "!ping", "bot-9")))
            .await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["run:ping:"]);
    }

    #[tokio::test]
    async fn reaction_routes_through_its_continuation() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let caps = Capabilities {
            handler_reaction: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(ModuleConfig::new("poll", "t"), caps, calls.clone())],
            vec![],
            api.clone(),
        );

        router
            .context()
            .continuations
            .reaction()
            .put(Continuation::new(
                "poll",
                "t1",
                ThreadType::Group,
                "bot-5",
                None,
                json!({}),
            ));

        let hit = ReactionEvent {
            thread_id: "t1".to_string(),
            thread_type: ThreadType::Group,
            is_self: false,
            data: ReactionData {
                uid_from: "u1".to_string(),
                icon: "👍".to_string(),
                targets: vec![MessageRef {
                    global_msg_id: "bot-5".to_string(),
                }],
            },
        };
        let mut miss = hit.clone();
        miss.data.targets[0].global_msg_id = "bot-6".to_string();

        router.dispatch(Event::Reaction(hit)).await;
        router.dispatch(Event::Reaction(miss)).await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["reaction:poll:👍"]);
    }

    #[tokio::test]
    async fn undo_routes_through_its_continuation() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let caps = Capabilities {
            handler_undo: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(ModuleConfig::new("poll", "t"), caps, calls.clone())],
            vec![],
            api.clone(),
        );

        router.context().continuations.undo().put(Continuation::new(
            "poll",
            "t1",
            ThreadType::Group,
            "bot-5",
            None,
            json!({}),
        ));

        router
            .dispatch(Event::Undo(UndoEvent {
                thread_id: "t1".to_string(),
                thread_type: ThreadType::Group,
                is_self: false,
                data: UndoData {
                    uid_from: "u1".to_string(),
                    global_msg_id: "bot-5".to_string(),
                },
            }))
            .await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["undo:poll:bot-5"]);
    }

    #[tokio::test]
    async fn group_events_fan_out_and_any_handlers_see_everything() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let event_caps = Capabilities {
            handler_event: true,
            ..Default::default()
        };
        let any_caps = Capabilities {
            handler_event: true,
            any_handler: true,
            ..Default::default()
        };
        let router = test_router(
            vec![],
            vec![
                recorder(ModuleConfig::new("welcome", "t"), event_caps, calls.clone()),
                recorder(ModuleConfig::new("observer", "t"), any_caps, calls.clone()),
            ],
            api.clone(),
        );

        router
            .dispatch(Event::GroupEvent(GroupEvent {
                thread_id: "t1".to_string(),
                kind: GroupEventKind::MemberJoin,
                member_ids: vec!["u9".to_string()],
                actor_id: None,
            }))
            .await;
        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "hello")))
            .await;
        settle().await;

        let calls = calls.lock();
        assert!(calls.contains(&"event:welcome".to_string()));
        assert!(calls.contains(&"event:observer".to_string()));
        // The any-handler saw both the group event and the unrouted message.
        assert!(calls.contains(&"any:observer:group_event".to_string()));
        assert!(calls.contains(&"any:observer:message".to_string()));
    }

    #[tokio::test]
    async fn cooldown_rejection_notifies_and_suppresses_handler() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let config = ModuleConfig::new("slow", "t").count_down(60);
        let router = test_router(
            vec![recorder(config, CMD, calls.clone())],
            vec![],
            api.clone(),
        );

        router
            .dispatch(Event::Message(message("t1", "m1", "u1", "!slow")))
            .await;
        settle().await;
        // Second invocation from another thread: the window is global.
        router
            .dispatch(Event::Message(message("t2", "m2", "u2", "!slow")))
            .await;
        settle().await;

        assert_eq!(*calls.lock(), vec!["run:slow:"]);
        assert_eq!(api.sent_count(), 1);
        assert!(api.texts()[0].contains("Please wait"));
        assert_eq!(api.sent.lock()[0].quoted_msg_id.as_deref(), Some("m2"));
    }

    #[tokio::test]
    async fn self_messages_are_suppressed_without_notice() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let config = ModuleConfig::new("ping", "t").skip_self_messages();
        let router = test_router(
            vec![recorder(config, CMD, calls.clone())],
            vec![],
            api.clone(),
        );

        let mut msg = message("t1", "m1", "bot", "!ping");
        msg.is_self = true;
        router.dispatch(Event::Message(msg)).await;
        settle().await;

        assert!(calls.lock().is_empty());
        assert_eq!(api.sent_count(), 0);
    }

    #[tokio::test]
    async fn on_load_handlers_fire_after_load() {
        let api = Arc::new(MockApi::new("bot"));
        let calls: Calls = Default::default();
        let caps = Capabilities {
            run: true,
            on_load: true,
            ..Default::default()
        };
        let router = test_router(
            vec![recorder(ModuleConfig::new("ping", "t"), caps, calls.clone())],
            vec![],
            api.clone(),
        );

        router.run_on_load();
        settle().await;

        assert_eq!(*calls.lock(), vec!["on_load:ping"]);
    }
}
