//! Error types for the client mock.

use std::fmt;

/// Failure signalled by a rule's action.
///
/// Returned unchanged from [`ClientMock::execute`](crate::ClientMock::execute);
/// the engine never inspects or rewrites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFault {
    message: String,
}

impl ActionFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ActionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ActionFault {}

/// Error types for rule registration and request execution
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("No rule matches request {method} {uri}")]
    NoMatchingRule { method: String, uri: String },
    #[error("Action failed: {0}")]
    Action(#[from] ActionFault),
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
