//! Error types for traceroute operations.

use crate::ProbeKey;
use ndn_traceroute_tlv::TlvError;
use thiserror::Error;

/// Main error type for traceroute operations.
#[derive(Error, Debug)]
pub enum TracerouteError {
    // Configuration errors
    #[error("Invalid maximum HopLimit: {0} (must be between 1 and 255)")]
    InvalidHopLimit(String),

    #[error("Target name must have at least one component")]
    EmptyTarget,

    #[error("Invalid face URI {uri}: {reason}")]
    InvalidFaceUri { uri: String, reason: String },

    // Transport setup errors
    #[error("Failed to connect to forwarder at {uri}: {source}")]
    Connect {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register prefix {prefix}: {code} {text}")]
    RegistrationFailed {
        prefix: String,
        code: u64,
        text: String,
    },

    // Per-probe errors, absorbed by the scheduler
    #[error("Malformed reply payload: {0}")]
    MalformedPayload(String),

    #[error("No probe in flight for {0}")]
    UnknownCorrelation(ProbeKey),

    // Session errors
    #[error("A probe is already in flight")]
    ProbeInFlight,

    #[error("Session already terminated")]
    SessionTerminated,

    // Transport errors
    #[error("Face closed by the forwarder")]
    FaceClosed,

    #[error("I/O error: {0}")]
    Io(#[source] std::io::Error),

    #[error("Malformed packet: {0}")]
    Tlv(#[from] TlvError),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl TracerouteError {
    /// Returns true if this error only concerns a single probe.
    ///
    /// Per-probe errors are reported and the session moves on to the next hop;
    /// everything else ends the session.
    pub fn is_per_probe(&self) -> bool {
        matches!(self, Self::MalformedPayload(_) | Self::UnknownCorrelation(_))
    }

    /// Returns true if this error happened while setting up the transport.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::RegistrationFailed { .. } | Self::InvalidFaceUri { .. }
        )
    }
}

impl From<std::io::Error> for TracerouteError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::BrokenPipe => TracerouteError::FaceClosed,
            _ => TracerouteError::Io(err),
        }
    }
}
