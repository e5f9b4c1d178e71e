//! Domain error types.

use std::time::Duration;

use thiserror::Error;

use super::session::SessionState;

/// Message log errors
///
/// Always recoverable: callers log and carry on rather than abort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// The backing store could not be reached or rejected the command
    #[error("message log unavailable: {0}")]
    Unavailable(String),

    /// The message could not be serialized into a log record
    #[error("failed to encode log record: {0}")]
    Encode(String),
}

/// Why a frame could not be placed in a session's outbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OfferError {
    /// The session is gone (its inbox was dropped)
    #[error("session outbox is closed")]
    Closed,

    /// The session is not draining its outbox fast enough
    #[error("session outbox is full")]
    Full,
}

/// The dispatcher has stopped consuming the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message pipeline is closed")]
pub struct PipelineClosed;

/// Why the registry refused a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A session with this id is already registered
    #[error("session is already registered")]
    AlreadyRegistered,

    /// The registry has been closed for shutdown
    #[error("registry is closed")]
    Closed,
}

/// Session state transition that the lifecycle does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid session transition: {from:?} -> {to:?}")]
pub struct LifecycleError {
    pub from: SessionState,
    pub to: SessionState,
}

/// Failure while writing to a session's transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer went away normally (close handshake, reset, end of stream)
    #[error("peer closed the connection")]
    PeerClosed,

    /// A single write did not complete in time
    #[error("write timed out after {0:?}")]
    TimedOut(Duration),

    /// Anything else
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Expected failures end the session without being reported as errors
    pub fn is_expected(&self) -> bool {
        matches!(self, TransportError::PeerClosed)
    }
}
