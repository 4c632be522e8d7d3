//! Execution of a traceroute session over a transport.
//!
//! Probing is strictly sequential: one Interest in flight, outcomes handled in
//! hop order.

pub mod serial;

pub use serial::{run_session, run_traceroute, SessionEvent, SessionSummary};
