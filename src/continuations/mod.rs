//! Correlation stores for conversational continuations.
//!
//! When a handler sends a reply it wants to keep alive, it writes a
//! [`Continuation`] anchored to the id the connector assigned to that reply.
//! A later event referencing the same message (a quote, a reaction, a recall)
//! is correlated back to the module that wrote the continuation.
//!
//! Three independent stores exist - reply, reaction and undo - because a
//! single bot message can receive every kind of follow-up. Each store is a
//! bounded Moka cache with a fixed time-to-live from the write; reading an
//! entry does not extend its life. Expiry, capacity eviction and overwrite
//! are the only removal paths.

use serde::{Deserialize, Serialize};

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::platform::{MessageData, ThreadType};

/// Opaque payload a handler attaches to its continuation
/// (running conversation history, vote tallies, ...).
pub type Payload = serde_json::Value;

/// Composite lookup key: the thread an exchange lives in plus the bot-sent
/// message id the follow-up references.
///
/// Including the thread id guarantees a continuation is never matched
/// against an event from another thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationKey {
    pub thread_id: String,
    pub message_id: String,
}

impl ContinuationKey {
    pub fn new(thread_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            message_id: message_id.into(),
        }
    }
}

/// A prior bot reply awaiting a correlated follow-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Continuation<D = Payload> {
    /// Module whose continuation callback handles the follow-up.
    pub handler_name: String,
    pub thread_id: String,
    pub thread_type: ThreadType,
    /// Id of the bot-sent message the follow-up will reference.
    pub message_id: String,
    /// The user message the bot was replying to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<MessageData>,
    /// Handler-owned payload, carried back verbatim on a hit.
    pub data: D,
}

impl<D> Continuation<D> {
    pub fn new(
        handler_name: impl Into<String>,
        thread_id: impl Into<String>,
        thread_type: ThreadType,
        message_id: impl Into<String>,
        quote: Option<MessageData>,
        data: D,
    ) -> Self {
        Self {
            handler_name: handler_name.into(),
            thread_id: thread_id.into(),
            thread_type,
            message_id: message_id.into(),
            quote,
            data,
        }
    }

    fn key(&self) -> ContinuationKey {
        ContinuationKey::new(self.thread_id.clone(), self.message_id.clone())
    }
}

/// One bounded, time-expiring key-to-continuation map.
///
/// Generic over the payload so the store owns the data exclusively; the
/// engine instantiates it with [`Payload`].
pub struct ContinuationStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    cache: TypedCache<ContinuationKey, Continuation<D>>,
}

impl<D> ContinuationStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Create a store backed by a named cache in the registry.
    pub fn new(registry: &CacheRegistry, name: &str, config: CacheConfig) -> Self {
        Self {
            cache: registry.get_or_create(name, config),
        }
    }

    /// Insert or replace the continuation at its own key, resetting the TTL.
    ///
    /// Exactly one continuation exists per key; a second write for the same
    /// key replaces the first.
    pub fn put(&self, continuation: Continuation<D>) {
        tracing::debug!(
            store = self.cache.name(),
            handler = %continuation.handler_name,
            thread = %continuation.thread_id,
            msg = %continuation.message_id,
            "continuation stored"
        );
        self.cache.insert(continuation.key(), continuation);
    }

    /// Look up a live continuation. Does not extend its TTL.
    pub fn get(&self, key: &ContinuationKey) -> Option<Continuation<D>> {
        self.cache.get(key)
    }

    /// Exact live entry count (flushes pending evictions first).
    pub fn len(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<D> Clone for ContinuationStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

/// The three correlation stores, one per follow-up kind.
pub struct Continuations {
    reply: ContinuationStore<Payload>,
    reaction: ContinuationStore<Payload>,
    undo: ContinuationStore<Payload>,
}

impl Continuations {
    pub fn new(cache: &CacheRegistry) -> Self {
        Self {
            reply: ContinuationStore::new(cache, "continuations_reply", CacheConfig::continuation()),
            reaction: ContinuationStore::new(
                cache,
                "continuations_reaction",
                CacheConfig::continuation(),
            ),
            undo: ContinuationStore::new(cache, "continuations_undo", CacheConfig::continuation()),
        }
    }

    /// Store consulted when a message quotes a bot reply.
    pub fn reply(&self) -> &ContinuationStore<Payload> {
        &self.reply
    }

    /// Store consulted when a reaction references a bot message.
    pub fn reaction(&self) -> &ContinuationStore<Payload> {
        &self.reaction
    }

    /// Store consulted when a bot message is recalled.
    pub fn undo(&self) -> &ContinuationStore<Payload> {
        &self.undo
    }
}
