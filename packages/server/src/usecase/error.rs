//! UseCase error types.

use thiserror::Error;

use crate::domain::SessionId;

/// Session admission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    /// A session with the same id is already registered
    #[error("session '{0}' is already registered")]
    DuplicateSession(SessionId),

    /// The server is shutting down and no longer admits sessions
    #[error("server is shutting down")]
    ShuttingDown,
}

/// Message submission errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The dispatcher is no longer consuming the pipeline
    #[error("message pipeline is closed")]
    PipelineClosed,
}
