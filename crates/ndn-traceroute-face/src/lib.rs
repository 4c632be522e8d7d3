//! Face to a local NDN forwarder.
//!
//! Connects to NFD over a Unix or TCP stream and speaks TLV frames:
//!
//! - [`FaceUri`] to parse and connect `unix://` and `tcp://` face URIs
//! - [`FrameSource`] and [`FrameSink`] for framed stream I/O
//! - [`Face`], which implements [`ProbeTransport`](ndn_traceroute_core::ProbeTransport)
//!   for the client and offers prefix registration for the responder
//! - [`control`] for NFD management commands

pub mod control;
pub mod face;
pub mod sink;
pub mod source;
pub mod uri;

pub use control::{ControlParameters, ControlResponse};
pub use face::Face;
pub use sink::FrameSink;
pub use source::FrameSource;
pub use uri::{AddressFamily, FaceUri, DEFAULT_TCP_PORT};
