//! Error types for TLV encoding and decoding.

use thiserror::Error;

/// Errors raised while decoding NDN TLV structures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("Buffer too short: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Unexpected TLV type: expected {expected}, got {actual}")]
    UnexpectedType { expected: u64, actual: u64 },

    #[error("Invalid NonNegativeInteger length: {0}")]
    InvalidNonNegativeInteger(usize),

    #[error("Invalid length {len} for {field}")]
    InvalidLength { field: &'static str, len: usize },

    #[error("Missing required element: {0}")]
    MissingElement(&'static str),

    #[error("Unrecognized critical element: type {0}")]
    UnrecognizedCritical(u64),

    #[error("Unknown network packet type {0}")]
    UnknownPacketType(u64),

    #[error("{0} trailing bytes after TLV element")]
    TrailingBytes(usize),

    #[error("Element of {0} bytes exceeds the maximum NDN packet size")]
    TooLarge(usize),

    #[error("Invalid NDN URI {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Unsupported: {0}")]
    Unsupported(&'static str),
}

impl TlvError {
    /// Returns true if more input could turn this error into a successful decode.
    ///
    /// Stream framing uses this to tell "wait for more bytes" apart from a
    /// corrupted stream.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Result type alias for TLV operations.
pub type TlvResult<T> = Result<T, TlvError>;
