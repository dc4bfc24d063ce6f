//! Recording connector used by engine tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::api::{ChatApi, OutgoingMessage, SentMessage};
use super::error::Error;
use super::event::ThreadType;

/// A message captured by [`MockApi`].
#[derive(Debug, Clone)]
pub struct SentRecord {
    pub text: String,
    pub thread_id: String,
    pub thread_type: ThreadType,
    /// Id of the message the reply quoted, if any.
    pub quoted_msg_id: Option<String>,
}

/// In-memory connector that records every action and hands out
/// deterministic message ids ("bot-1", "bot-2", ...).
pub struct MockApi {
    own_id: String,
    next_id: AtomicU64,
    pub sent: Mutex<Vec<SentRecord>>,
    pub reactions: Mutex<Vec<(String, String, String)>>,
}

impl MockApi {
    pub fn new(own_id: impl Into<String>) -> Self {
        Self {
            own_id: own_id.into(),
            next_id: AtomicU64::new(1),
            sent: Mutex::new(Vec::new()),
            reactions: Mutex::new(Vec::new()),
        }
    }

    /// Texts of every sent message, in order.
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|r| r.text.clone()).collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

#[async_trait]
impl ChatApi for MockApi {
    fn own_id(&self) -> String {
        self.own_id.clone()
    }

    async fn send_message(
        &self,
        message: OutgoingMessage,
        thread_id: &str,
        thread_type: ThreadType,
    ) -> Result<SentMessage, Error> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().push(SentRecord {
            text: message.text,
            thread_id: thread_id.to_string(),
            thread_type,
            quoted_msg_id: message.quote.map(|q| q.msg_id),
        });
        Ok(SentMessage {
            msg_id: format!("bot-{n}"),
        })
    }

    async fn add_reaction(
        &self,
        icon: &str,
        thread_id: &str,
        msg_id: &str,
    ) -> Result<(), Error> {
        self.reactions.lock().push((
            icon.to_string(),
            thread_id.to_string(),
            msg_id.to_string(),
        ));
        Ok(())
    }
}
