//! Action surface of the messaging-platform connector.
//!
//! The engine and handler modules consume this narrow contract; the wire
//! protocol, login and session handling all live behind it.

use async_trait::async_trait;

use super::error::Error;
use super::event::{MessageData, ThreadType};

/// An outbound message.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub text: String,
    /// Message this reply quotes, preserving multi-turn context.
    pub quote: Option<MessageData>,
}

impl OutgoingMessage {
    /// A bare message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quote: None,
        }
    }

    /// A reply quoting the given message.
    pub fn quoting(text: impl Into<String>, quote: MessageData) -> Self {
        Self {
            text: text.into(),
            quote: Some(quote),
        }
    }
}

/// Receipt for a sent message.
///
/// The id is what anchors a newly written continuation.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub msg_id: String,
}

/// The connector's request/response surface, one instance per bot account.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Id of the bot account this connector is logged in as.
    fn own_id(&self) -> String;

    /// Send a message into a thread, returning the platform-assigned id.
    async fn send_message(
        &self,
        message: OutgoingMessage,
        thread_id: &str,
        thread_type: ThreadType,
    ) -> Result<SentMessage, Error>;

    /// React to a message in a thread.
    async fn add_reaction(
        &self,
        icon: &str,
        thread_id: &str,
        msg_id: &str,
    ) -> Result<(), Error>;
}
