//! Error types for request dispatch.
//!
//! # Design
//! Non-2xx statuses and unparseable bodies are not errors: they come back as
//! a `FetchResult` with `ok == false`. Only two things fail a call: a payload
//! that cannot be serialized, and a transport that never produced a response.
//! The transport error is handed back as-is rather than folded into a
//! `FetchResult`.

use thiserror::Error;

/// The transport could not produce a response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// TCP/TLS connection could not be established or was dropped.
    #[error("connection error: {0}")]
    Connection(String),

    /// DNS lookup failed.
    #[error("host not found: {0}")]
    HostNotFound(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The transport refused to send the request as described.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Reading or writing the wire failed, including malformed responses.
    #[error("I/O error: {0}")]
    Io(String),

    /// The blocking task running the request panicked or was cancelled.
    #[error("transport task failed: {0}")]
    Join(String),
}

/// Errors returned by `RequestFn` calls.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl FetchError {
    /// The raw transport error, if that is what failed the call.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::Serialize(_) => None,
        }
    }
}
