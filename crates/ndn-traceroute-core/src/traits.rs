//! Core trait for the named-data transport.

use crate::{ProbeKey, ProbeRequest, TracerouteError};
use async_trait::async_trait;
use ndn_traceroute_tlv::{Data, NackReason};
use std::time::Duration;

/// Terminal outcome of one expressed probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// A Data packet satisfied the Interest.
    Data(Data),
    /// The Interest lifetime expired without an answer.
    Timeout,
    /// The network returned a Nack.
    Nack(NackReason),
}

/// An outcome together with the key of the probe it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub key: ProbeKey,
    pub outcome: TransportOutcome,
}

impl TransportEvent {
    pub fn new(key: ProbeKey, outcome: TransportOutcome) -> Self {
        Self { key, outcome }
    }
}

/// Request/reply facility used by the session runner.
///
/// Implementations own the connection to the network and enforce Interest
/// lifetimes. Every expressed probe must eventually produce exactly one
/// [`TransportEvent`] carrying its key, unless the transport fails first.
#[async_trait]
pub trait ProbeTransport: Send {
    /// Expresses the probe as an Interest that expires after `lifetime`.
    async fn express(
        &mut self,
        probe: &ProbeRequest,
        lifetime: Duration,
    ) -> Result<(), TracerouteError>;

    /// Waits for the next outcome of any expressed probe.
    ///
    /// Returns `Err` for fatal transport errors that should stop the traceroute.
    async fn next_event(&mut self) -> Result<TransportEvent, TracerouteError>;

    /// Closes the transport, releasing resources.
    async fn close(&mut self) -> Result<(), TracerouteError>;
}
