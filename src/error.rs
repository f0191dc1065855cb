//! Error Types
//!
//! Failures surfaced by the API client, the intent planner and the chat
//! channel.

use thiserror::Error;

use crate::authz::DenyReason;

/// HTTP-level failures. The caller decides whether to log, show or ignore.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("request could not be built: {0}")]
    Request(String),
}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

/// Client-side refusal; no request is issued
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("text must not be empty")]
    EmptyText,
    #[error("no board is loaded")]
    NoBoard,
    #[error("not signed in")]
    Anonymous,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("nothing to change")]
    NoChange,
    #[error("not allowed: {0}")]
    Denied(DenyReason),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    #[error("message must not be empty")]
    Empty,
    #[error("message is too long ({0} characters, max 2000)")]
    TooLong(usize),
    #[error("socket send failed: {0}")]
    Send(String),
    #[error("could not decode frame: {0}")]
    Frame(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}
