//! Messaging-platform connector contract.
//!
//! Login, session management and wire transport are delegated to an external
//! connector. This module defines the two halves of that boundary:
//!
//! - [`event`] - the inbound event stream the connector feeds the engine
//! - [`api`] - the outbound action surface ([`ChatApi`]) handlers call
//!
//! A connector implementation lives outside this crate; tests use the
//! recording mock in [`mock`].

mod api;
mod error;
mod event;

#[cfg(test)]
pub(crate) mod mock;

pub use api::{ChatApi, OutgoingMessage, SentMessage};
pub use error::Error;
pub use event::{
    Content, Event, GroupEvent, GroupEventKind, MessageData, MessageEvent, MessageRef, Quote,
    ReactionData, ReactionEvent, ThreadType, UndoData, UndoEvent,
};
