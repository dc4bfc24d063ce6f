//! Connector error type.

/// Errors surfaced by a messaging-platform connector.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying transport failed (socket closed, timeout, ...).
    #[error("connector transport error: {0}")]
    Transport(String),

    /// The platform rejected the request.
    #[error("request rejected by platform: {0}")]
    Rejected(String),

    /// The connector has no live session.
    #[error("connector is not logged in")]
    NotLoggedIn,
}
