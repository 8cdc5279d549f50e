//! # Error Types
//!
//! Error handling for the hub protocol codec.
//!
//! Every fallible codec operation returns [`Result`]. Running out of buffered
//! bytes at the frame level is *not* an error: the frame codec reports it as
//! [`DecodeOutcome::NotEnoughData`](crate::core::codec::DecodeOutcome) so the
//! caller can keep reading from the transport. Everything in this module is
//! terminal for the connection that produced it.
//!
//! ## Error Categories
//! - **Protocol**: unknown message tag, oversized or malformed frame header
//! - **Decode**: truncated fields, negative lengths, invalid UTF-8, nulls where
//!   a value is required
//! - **Payload**: failures reported by the payload serializer, passed through
//!   as-is
//! - **Binding**: the binder could not resolve a target or an invocation
//! - **I/O** and **Config**
//!
//! ## Example Usage
//! ```rust
//! use radar_hub_protocol::error::{ErrorKind, ProtocolError};
//!
//! let err = ProtocolError::UnknownMessageType(42);
//! assert_eq!(err.kind(), ErrorKind::Protocol);
//! assert!(err.to_string().contains("42"));
//! ```

use std::io;
use thiserror::Error;

/// Error message constants shared by lock-guarded components.
pub mod constants {
    pub const ERR_REGISTRY_WRITE_LOCK: &str = "Failed to acquire write lock on payload registry";
    pub const ERR_REGISTRY_READ_LOCK: &str = "Failed to acquire read lock on payload registry";
    pub const ERR_BINDER_WRITE_LOCK: &str = "Failed to acquire write lock on binder";
    pub const ERR_BINDER_READ_LOCK: &str = "Failed to acquire read lock on binder";
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Payload serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Unknown message type: {0}")]
    UnknownMessageType(i32),

    #[error("Invalid frame length: {0}")]
    InvalidFrameLength(i32),

    #[error("Frame too large: {0} bytes")]
    OversizedFrame(usize),

    #[error("Truncated field: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Invalid length prefix: {0}")]
    InvalidLength(i32),

    #[error("Invalid UTF-8 in string field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Unexpected null in required field `{0}`")]
    UnexpectedNull(&'static str),

    #[error("Payload type is not registered: {0}")]
    UnregisteredType(&'static str),

    #[error("Fixed-layout payload {type_name} expects {expected} bytes, got {actual}")]
    FixedLayoutSize {
        type_name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown hub method target: {0}")]
    UnknownTarget(String),

    #[error("Unknown invocation id: {0}")]
    UnknownInvocation(String),

    #[error("Target `{target}` takes {expected} arguments, frame carries {actual}")]
    ArgumentCountMismatch {
        target: String,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Synchronization error: {0}")]
    LockPoisoned(&'static str),
}

/// Coarse classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The peer violated the frame protocol (unknown tag, bad header).
    Protocol,
    /// A field inside an otherwise well-framed message is inconsistent.
    Decode,
    /// The payload serializer rejected a value or its bytes.
    Payload,
    /// The binder could not supply the types needed for a payload.
    Binding,
    Io,
    Config,
    /// A shared component was left unusable by a panicking thread.
    Internal,
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::UnknownMessageType(_)
            | ProtocolError::InvalidFrameLength(_)
            | ProtocolError::OversizedFrame(_) => ErrorKind::Protocol,
            ProtocolError::Truncated { .. }
            | ProtocolError::InvalidLength(_)
            | ProtocolError::InvalidUtf8(_)
            | ProtocolError::UnexpectedNull(_) => ErrorKind::Decode,
            ProtocolError::Serialization(_)
            | ProtocolError::UnregisteredType(_)
            | ProtocolError::FixedLayoutSize { .. } => ErrorKind::Payload,
            ProtocolError::UnknownTarget(_)
            | ProtocolError::UnknownInvocation(_)
            | ProtocolError::ArgumentCountMismatch { .. } => ErrorKind::Binding,
            ProtocolError::Io(_) => ErrorKind::Io,
            ProtocolError::ConfigError(_) => ErrorKind::Config,
            ProtocolError::LockPoisoned(_) => ErrorKind::Internal,
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
