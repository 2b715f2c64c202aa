//! Error types for the boundary layers.
//!
//! The generation core never fails; these errors only exist where input is
//! validated (HTTP/CLI) and where remote services are called.

use thiserror::Error;

/// A request that fails boundary validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Question count outside the accepted range.
    #[error("questionCount must be between {min} and {max}, got {got}")]
    QuestionCount { got: usize, min: usize, max: usize },

    /// A diagnostic was requested with no topics.
    #[error("at least one topic is required")]
    EmptyTopics,

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

/// Failure talking to a remote generation or vector service.
///
/// Callers resolve every variant to fallback content; none reaches end users.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Credentials were not configured.
    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),

    /// Network-level failure (connect, timeout, body read).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// The response did not contain what we expected.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        RemoteError::Malformed(msg.into())
    }
}
