//! Errors from composing and invoking methods

use crate::emitter::EmitterError;
use thiserror::Error;

/// A contract violation by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    #[error("type must be a string")]
    TypeNotString,
    #[error("type must not be empty")]
    EmptyType,
    #[error("missing emitter: configure `emitter` before invoking a composed method")]
    MissingEmitter,
    #[error("invalid emitter: {0}")]
    InvalidEmitter(String),
    #[error("missing event name")]
    MissingEventName,
    #[error("event name must be a string")]
    EventNameNotString,
    #[error("missing listener")]
    MissingListener,
    #[error("context must be an object")]
    ContextNotObject,
}

/// Errors that can occur composing or invoking methods
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    #[error("emitter error: {0}")]
    Emitter(#[from] EmitterError),
}

/// Result type for compose operations
pub type ComposeResult<T> = Result<T, ComposeError>;
