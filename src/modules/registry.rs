//! Module registry - capability-keyed handler mappings.
//!
//! `load` runs every registered module factory, classifies the produced
//! modules by declared capability and publishes the result as one immutable
//! generation. `reload` builds a complete new generation and swaps it in
//! atomically: an event routed concurrently sees the old generation or the
//! new one, never a half-populated mix.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use super::BotModule;

/// A name-keyed handler mapping.
pub type ModuleMap = HashMap<String, Arc<dyn BotModule>>;

/// Fallible module constructor. A factory that errors is skipped with a
/// warning; the scan continues.
pub type ModuleFactory = Box<dyn Fn() -> anyhow::Result<Arc<dyn BotModule>> + Send + Sync>;

/// One fully-built registry generation.
#[derive(Default, Clone)]
pub struct Generation {
    pub commands: ModuleMap,
    pub no_prefix_commands: ModuleMap,
    pub reply_handlers: ModuleMap,
    pub reaction_handlers: ModuleMap,
    pub undo_handlers: ModuleMap,
    pub on_load_handlers: ModuleMap,
    pub event_handlers: ModuleMap,
    pub any_handlers: ModuleMap,
}

impl Generation {
    fn register(map: &mut ModuleMap, kind: &str, name: &str, module: Arc<dyn BotModule>) {
        if map.contains_key(name) {
            warn!("{kind} \"{name}\" already registered, overwriting");
        }
        map.insert(name.to_string(), module);
        debug!("registered {kind}: {name}");
    }

    /// Register a module from the command source into every mapping its
    /// capabilities name.
    fn add_command_module(&mut self, module: Arc<dyn BotModule>) {
        let name = module.config().name.clone();
        let caps = module.capabilities();

        if caps.run {
            Self::register(&mut self.commands, "command", &name, module.clone());
        }
        if caps.no_prefix {
            Self::register(
                &mut self.no_prefix_commands,
                "no-prefix command",
                &name,
                module.clone(),
            );
        }
        if caps.handler_reply {
            Self::register(&mut self.reply_handlers, "reply handler", &name, module.clone());
        }
        if caps.handler_reaction {
            Self::register(
                &mut self.reaction_handlers,
                "reaction handler",
                &name,
                module.clone(),
            );
        }
        if caps.handler_undo {
            Self::register(&mut self.undo_handlers, "undo handler", &name, module.clone());
        }
        if caps.on_load {
            Self::register(
                &mut self.on_load_handlers,
                "on-load handler",
                &name,
                module.clone(),
            );
        }
        if caps.any_handler {
            Self::register(&mut self.any_handlers, "any handler", &name, module);
        }
    }

    /// Register a module from the event source. Only the group-event,
    /// on-load and any-handler capabilities apply there; a module without a
    /// group-event handler is skipped entirely.
    fn add_event_module(&mut self, module: Arc<dyn BotModule>) {
        let name = module.config().name.clone();
        let caps = module.capabilities();

        if !caps.handler_event {
            debug!("event module \"{name}\" has no group-event handler, skipping");
            return;
        }

        Self::register(&mut self.event_handlers, "event handler", &name, module.clone());
        if caps.on_load {
            Self::register(
                &mut self.on_load_handlers,
                "on-load handler",
                &name,
                module.clone(),
            );
        }
        if caps.any_handler {
            Self::register(&mut self.any_handlers, "any handler", &name, module);
        }
    }
}

/// Holds the module sources and the currently published generation.
pub struct ModuleRegistry {
    command_source: Vec<ModuleFactory>,
    event_source: Vec<ModuleFactory>,
    generation: RwLock<Arc<Generation>>,
}

impl ModuleRegistry {
    /// Create a registry over the given sources. Call [`ModuleRegistry::load`]
    /// before routing events.
    pub fn new(command_source: Vec<ModuleFactory>, event_source: Vec<ModuleFactory>) -> Self {
        Self {
            command_source,
            event_source,
            generation: RwLock::new(Arc::new(Generation::default())),
        }
    }

    /// Scan both sources and publish a fresh generation.
    pub fn load(&self) {
        let mut generation = Generation::default();

        for factory in &self.command_source {
            match factory() {
                Ok(module) => {
                    if module.config().name.is_empty() {
                        debug!("skipping command module with empty name");
                        continue;
                    }
                    if module.capabilities().is_empty() {
                        warn!(
                            "module \"{}\" declares no capabilities, skipping",
                            module.config().name
                        );
                        continue;
                    }
                    generation.add_command_module(module);
                }
                Err(e) => warn!("skipping command module: {e:#}"),
            }
        }

        for factory in &self.event_source {
            match factory() {
                Ok(module) => {
                    if module.config().name.is_empty() {
                        debug!("skipping event module with empty name");
                        continue;
                    }
                    generation.add_event_module(module);
                }
                Err(e) => warn!("skipping event module: {e:#}"),
            }
        }

        info!(
            commands = generation.commands.len(),
            no_prefix = generation.no_prefix_commands.len(),
            reply = generation.reply_handlers.len(),
            reaction = generation.reaction_handlers.len(),
            undo = generation.undo_handlers.len(),
            on_load = generation.on_load_handlers.len(),
            events = generation.event_handlers.len(),
            any = generation.any_handlers.len(),
            "module registry loaded"
        );

        *self.generation.write() = Arc::new(generation);
    }

    /// Rebuild every mapping from the sources. Alias of [`ModuleRegistry::load`];
    /// in-flight handler invocations are unaffected.
    pub fn reload(&self) {
        self.load();
    }

    /// The currently published generation. Routing one event against a
    /// single snapshot keeps its lookups mutually consistent across a
    /// concurrent reload.
    pub fn snapshot(&self) -> Arc<Generation> {
        self.generation.read().clone()
    }

    pub fn commands(&self) -> ModuleMap {
        self.snapshot().commands.clone()
    }

    pub fn no_prefix_commands(&self) -> ModuleMap {
        self.snapshot().no_prefix_commands.clone()
    }

    pub fn reply_handlers(&self) -> ModuleMap {
        self.snapshot().reply_handlers.clone()
    }

    pub fn reaction_handlers(&self) -> ModuleMap {
        self.snapshot().reaction_handlers.clone()
    }

    pub fn undo_handlers(&self) -> ModuleMap {
        self.snapshot().undo_handlers.clone()
    }

    pub fn on_load_handlers(&self) -> ModuleMap {
        self.snapshot().on_load_handlers.clone()
    }

    pub fn event_handlers(&self) -> ModuleMap {
        self.snapshot().event_handlers.clone()
    }

    pub fn any_handlers(&self) -> ModuleMap {
        self.snapshot().any_handlers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{Capabilities, ModuleConfig};

    struct TestModule {
        config: ModuleConfig,
        caps: Capabilities,
    }

    #[async_trait::async_trait]
    impl BotModule for TestModule {
        fn config(&self) -> &ModuleConfig {
            &self.config
        }

        fn capabilities(&self) -> Capabilities {
            self.caps
        }
    }

    // The marker rides in the usage field so tests can tell same-named
    // modules apart.
    fn factory(name: &'static str, caps: Capabilities, marker: &'static str) -> ModuleFactory {
        Box::new(move || {
            Ok(Arc::new(TestModule {
                config: ModuleConfig::new(name, "test").usage(marker),
                caps,
            }) as Arc<dyn BotModule>)
        })
    }

    fn marker_of(map: &ModuleMap, name: &str) -> String {
        map.get(name).expect("module registered").config().usage.clone()
    }

    const RUN: Capabilities = Capabilities {
        run: true,
        no_prefix: false,
        on_load: false,
        handler_reply: false,
        handler_reaction: false,
        handler_undo: false,
        handler_event: false,
        any_handler: false,
    };

    #[test]
    fn classifies_by_capability() {
        let caps = Capabilities {
            run: true,
            handler_reply: true,
            any_handler: true,
            ..Default::default()
        };
        let registry = ModuleRegistry::new(vec![factory("chat", caps, "a")], vec![]);
        registry.load();

        let generation = registry.snapshot();
        assert!(generation.commands.contains_key("chat"));
        assert!(generation.reply_handlers.contains_key("chat"));
        assert!(generation.any_handlers.contains_key("chat"));
        assert!(generation.no_prefix_commands.is_empty());
        assert!(generation.event_handlers.is_empty());
    }

    #[test]
    fn later_module_overwrites_same_name() {
        let registry = ModuleRegistry::new(
            vec![factory("ping", RUN, "first"), factory("ping", RUN, "second")],
            vec![],
        );
        registry.load();

        let commands = registry.commands();
        assert_eq!(commands.len(), 1);
        assert_eq!(marker_of(&commands, "ping"), "second");
    }

    #[test]
    fn failing_factory_does_not_abort_scan() {
        let failing: ModuleFactory = Box::new(|| anyhow::bail!("corrupt module"));
        let registry =
            ModuleRegistry::new(vec![failing, factory("ping", RUN, "ok")], vec![]);
        registry.load();

        assert!(registry.commands().contains_key("ping"));
    }

    #[test]
    fn module_without_capabilities_is_skipped() {
        let registry = ModuleRegistry::new(
            vec![factory("idle", Capabilities::default(), "x")],
            vec![],
        );
        registry.load();

        let generation = registry.snapshot();
        assert!(generation.commands.is_empty());
        assert!(generation.any_handlers.is_empty());
    }

    #[test]
    fn event_source_ignores_command_capabilities() {
        let caps = Capabilities {
            run: true,
            handler_event: true,
            ..Default::default()
        };
        let registry = ModuleRegistry::new(vec![], vec![factory("welcome", caps, "w")]);
        registry.load();

        let generation = registry.snapshot();
        assert!(generation.event_handlers.contains_key("welcome"));
        assert!(generation.commands.is_empty());
    }

    #[test]
    fn reload_swaps_generations_atomically() {
        let registry = ModuleRegistry::new(vec![factory("ping", RUN, "gen")], vec![]);
        registry.load();

        let before = registry.snapshot();
        registry.reload();
        let after = registry.snapshot();

        // The pre-reload snapshot still routes against the old generation.
        assert!(before.commands.contains_key("ping"));
        assert!(after.commands.contains_key("ping"));
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
