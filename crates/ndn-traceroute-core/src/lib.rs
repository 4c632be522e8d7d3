//! Core types, traits, and the probing engine for ndn-traceroute.
//!
//! This crate provides the client-side traceroute logic, independent of how
//! Interests reach the network:
//!
//! - [`Scheduler`], the per-hop state machine and termination policy
//! - [`ReplyPayload`] for the responder's reply content
//! - [`ProbeTransport`] trait for the named-data transport
//! - [`run_traceroute`] to drive a session over a transport
//! - [`TracerouteError`] for error handling
//! - [`TracerouteReport`] for serializable output

pub mod error;
pub mod execution;
pub mod reply;
pub mod result;
pub mod session;
pub mod status;
pub mod traits;
pub mod types;

pub use error::TracerouteError;
pub use execution::{run_session, run_traceroute, SessionEvent, SessionSummary};
pub use reply::{ReplyPayload, REPLY_STATUS_TLV_TYPE};
pub use result::{HopOutcome, TracerouteHop, TracerouteReport};
pub use session::{
    HopResult, HopStatus, InFlight, Scheduler, SessionState, Step, Termination, Transition,
};
pub use status::StatusCode;
pub use traits::{ProbeTransport, TransportEvent, TransportOutcome};
pub use types::{
    ProbeKey, ProbeRequest, TracerouteConfig, TracerouteParams, DEFAULT_FACE_URI,
    DEFAULT_INTEREST_LIFETIME_MS, DEFAULT_MAX_HOP_LIMIT, DISCOVERY_MARKER,
};

pub use ndn_traceroute_tlv as tlv;
