//! Inbound event model for the messaging-platform connector.
//!
//! These are the shapes the connector delivers to the engine. The engine
//! never talks to the wire itself; a connector implementation translates
//! whatever the platform emits into these events and pushes them into the
//! runtime channel.

use serde::{Deserialize, Serialize};

/// Kind of conversation a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadType {
    /// One-to-one conversation.
    User,
    /// Group conversation.
    Group,
}

/// Message content payload.
///
/// The platform delivers either a plain string or a structured object whose
/// `title` carries the visible text (stickers, cards, forwarded media).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Structured {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<serde_json::Value>,
    },
}

impl Content {
    /// The routable text of this content, if any.
    pub fn text(&self) -> &str {
        match self {
            Content::Text(text) => text,
            Content::Structured { title, .. } => title,
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

/// The earlier message a new message is replying to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Global id of the quoted message.
    pub global_msg_id: String,
    /// Text of the quoted message, when the platform includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Payload of a message event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    /// Platform-assigned message id.
    pub msg_id: String,
    /// Sender id.
    pub uid_from: String,
    pub content: Content,
    /// Present when this message is itself a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

/// A new message in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub thread_id: String,
    pub thread_type: ThreadType,
    /// True when the bot account itself sent the message.
    pub is_self: bool,
    pub data: MessageData,
}

/// Reference to an earlier message carried inside a reaction payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRef {
    pub global_msg_id: String,
}

/// Payload of a reaction event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionData {
    pub uid_from: String,
    /// Reaction icon, e.g. "👍".
    pub icon: String,
    /// Messages the reaction targets. Platforms report at least one.
    pub targets: Vec<MessageRef>,
}

/// A reaction added to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub is_self: bool,
    pub data: ReactionData,
}

/// Payload of an undo (message recall) event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoData {
    pub uid_from: String,
    /// Global id of the recalled message.
    pub global_msg_id: String,
}

/// A message was recalled in a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoEvent {
    pub thread_id: String,
    pub thread_type: ThreadType,
    pub is_self: bool,
    pub data: UndoData,
}

/// What happened to the group's membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupEventKind {
    MemberJoin,
    MemberLeave,
    MemberRemoved,
    NameChanged,
}

/// A group-membership change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEvent {
    pub thread_id: String,
    pub kind: GroupEventKind,
    /// Members the event concerns.
    pub member_ids: Vec<String>,
    /// Who triggered the change, when the platform reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
}

/// Any inbound event the connector can deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Message(MessageEvent),
    Reaction(ReactionEvent),
    GroupEvent(GroupEvent),
    Undo(UndoEvent),
}

impl Event {
    /// The thread the event belongs to.
    pub fn thread_id(&self) -> &str {
        match self {
            Event::Message(e) => &e.thread_id,
            Event::Reaction(e) => &e.thread_id,
            Event::GroupEvent(e) => &e.thread_id,
            Event::Undo(e) => &e.thread_id,
        }
    }

    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message(_) => "message",
            Event::Reaction(_) => "reaction",
            Event::GroupEvent(_) => "group_event",
            Event::Undo(_) => "undo",
        }
    }
}
