//! Utility functions.

use crate::platform::Content;

/// Split message content into routing tokens.
///
/// Works off the plain string or a structured payload's `title`; runs of
/// whitespace collapse and empty tokens are discarded.
pub fn tokenize(content: &Content) -> Vec<String> {
    content
        .text()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
