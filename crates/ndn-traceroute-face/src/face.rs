//! Stream face to the local forwarder.

use crate::control::{self, ControlResponse};
use crate::{FrameSink, FrameSource};
use async_trait::async_trait;
use ndn_traceroute_core::{
    ProbeKey, ProbeRequest, ProbeTransport, TracerouteError, TransportEvent, TransportOutcome,
};
use ndn_traceroute_tlv::{Data, Interest, Name, NetPacket};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, trace, warn};

/// An expressed Interest waiting for Data, a Nack or its deadline.
#[derive(Debug)]
struct PendingInterest {
    key: ProbeKey,
    interest: Interest,
    deadline: Instant,
}

/// A face to the forwarder.
///
/// As a consumer it expresses probes and reports one outcome per probe,
/// enforcing Interest lifetimes locally. As a producer it registers prefixes
/// and answers incoming Interests.
pub struct Face {
    remote: String,
    source: FrameSource,
    sink: FrameSink,
    pending: Vec<PendingInterest>,
    registered: Vec<Name>,
    /// Interests received while waiting for something else.
    backlog: VecDeque<Interest>,
    closed: bool,
}

impl Face {
    /// Wraps an established stream. `remote` is only used for logging.
    pub fn from_stream<S>(stream: S, remote: impl Into<String>) -> Self
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            remote: remote.into(),
            source: FrameSource::new(Box::new(reader)),
            sink: FrameSink::new(Box::new(writer)),
            pending: Vec::new(),
            registered: Vec::new(),
            backlog: VecDeque::new(),
            closed: false,
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Number of Interests still waiting for an outcome.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn ensure_open(&self) -> Result<(), TracerouteError> {
        if self.closed {
            return Err(TracerouteError::FaceClosed);
        }
        Ok(())
    }

    /// Receives the next network-layer packet, skipping idle link-layer frames
    /// and packets that fail to decode.
    async fn recv_packet(&mut self) -> Result<NetPacket, TracerouteError> {
        loop {
            let frame = self.source.read_frame().await?;
            match NetPacket::from_frame(&frame) {
                Ok(Some(packet)) => return Ok(packet),
                Ok(None) => trace!("Skipping LpPacket without fragment"),
                Err(e) => warn!(error = %e, "Dropping undecodable packet"),
            }
        }
    }

    /// Expresses `interest`, reporting its outcome under `key`.
    pub async fn express_interest(
        &mut self,
        key: ProbeKey,
        interest: Interest,
    ) -> Result<(), TracerouteError> {
        self.ensure_open()?;
        let deadline = Instant::now() + interest.lifetime_or_default();
        self.sink.write_block(&interest.to_block()).await?;
        debug!(key = %key, name = %interest.name, "Expressed Interest");
        self.pending.push(PendingInterest {
            key,
            interest,
            deadline,
        });
        Ok(())
    }

    /// Removes the earliest expired pending Interest.
    fn take_expired(&mut self, now: Instant) -> Option<TransportEvent> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= now)
            .min_by_key(|(_, p)| p.deadline)
            .map(|(i, _)| i)?;
        let expired = self.pending.remove(index);
        debug!(key = %expired.key, name = %expired.interest.name, "Interest timed out");
        Some(TransportEvent::new(expired.key, TransportOutcome::Timeout))
    }

    /// Matches an incoming packet against the pending table.
    fn dispatch(&mut self, packet: NetPacket) -> Option<TransportEvent> {
        match packet {
            NetPacket::Data(data) => {
                let Some(index) = self.pending.iter().position(|p| p.interest.matches_data(&data))
                else {
                    debug!(name = %data.name, "Dropping unsolicited Data");
                    return None;
                };
                let pending = self.pending.remove(index);
                trace!(key = %pending.key, "Data satisfied pending Interest");
                Some(TransportEvent::new(pending.key, TransportOutcome::Data(data)))
            }
            NetPacket::Nack { interest, reason } => {
                let Some(index) = self.pending.iter().position(|p| {
                    p.interest.name == interest.name && p.interest.nonce == interest.nonce
                }) else {
                    debug!(name = %interest.name, "Dropping Nack for unknown Interest");
                    return None;
                };
                let pending = self.pending.remove(index);
                Some(TransportEvent::new(pending.key, TransportOutcome::Nack(reason)))
            }
            NetPacket::Interest(interest) => {
                if self.registered.iter().any(|p| p.is_prefix_of(&interest.name)) {
                    self.backlog.push_back(interest);
                } else {
                    debug!(name = %interest.name, "Dropping Interest outside registered prefixes");
                }
                None
            }
        }
    }

    /// Waits for the outcome of any pending Interest.
    pub async fn next_outcome(&mut self) -> Result<TransportEvent, TracerouteError> {
        loop {
            self.ensure_open()?;
            if let Some(event) = self.take_expired(Instant::now()) {
                return Ok(event);
            }
            let deadline = self
                .pending
                .iter()
                .map(|p| p.deadline)
                .min()
                .ok_or_else(|| TracerouteError::Internal("no Interest is pending".to_string()))?;

            match timeout_at(deadline, self.recv_packet()).await {
                Ok(packet) => {
                    if let Some(event) = self.dispatch(packet?) {
                        return Ok(event);
                    }
                }
                Err(_) => continue,
            }
        }
    }

    /// Registers `prefix` with the forwarder's RIB.
    ///
    /// Interests under already registered prefixes that arrive meanwhile are
    /// kept for [`next_interest`](Self::next_interest).
    pub async fn register_prefix(&mut self, prefix: &Name) -> Result<(), TracerouteError> {
        self.ensure_open()?;
        let command = control::rib_register_command(prefix)?;
        let deadline = Instant::now() + command.lifetime_or_default();
        let failed = |code: u64, text: String| TracerouteError::RegistrationFailed {
            prefix: prefix.to_string(),
            code,
            text,
        };

        self.sink.write_block(&command.to_block()).await?;
        debug!(prefix = %prefix, "Sent prefix registration command");

        loop {
            let packet = match timeout_at(deadline, self.recv_packet()).await {
                Ok(packet) => packet?,
                Err(_) => return Err(failed(0, "command timed out".to_string())),
            };
            match packet {
                NetPacket::Data(data) if command.matches_data(&data) => {
                    let response = ControlResponse::from_content(&data.content)?;
                    if !response.is_success() {
                        return Err(failed(response.status_code, response.status_text));
                    }
                    info!(prefix = %prefix, face = %self.remote, "Registered prefix");
                    self.registered.push(prefix.clone());
                    return Ok(());
                }
                NetPacket::Nack { interest, reason } if interest.name == command.name => {
                    return Err(failed(reason.code(), format!("Nack: {}", reason)));
                }
                other => {
                    self.dispatch(other);
                }
            }
        }
    }

    /// Waits for the next Interest under a registered prefix.
    pub async fn next_interest(&mut self) -> Result<Interest, TracerouteError> {
        loop {
            self.ensure_open()?;
            if let Some(interest) = self.backlog.pop_front() {
                return Ok(interest);
            }
            let packet = self.recv_packet().await?;
            if let Some(event) = self.dispatch(packet) {
                warn!(key = %event.key, "Dropping outcome nobody is waiting for");
            }
        }
    }

    /// Sends a Data packet.
    pub async fn put_data(&mut self, data: &Data) -> Result<(), TracerouteError> {
        self.ensure_open()?;
        trace!(name = %data.name, "Sending Data");
        self.sink.write_block(&data.to_block()).await
    }

    /// Closes the face. Pending Interests are abandoned; closing twice is a no-op.
    pub async fn shutdown(&mut self) -> Result<(), TracerouteError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.pending.is_empty() {
            debug!(count = self.pending.len(), "Abandoning pending Interests");
            self.pending.clear();
        }
        if let Err(e) = self.sink.close().await {
            debug!(error = %e, "Error shutting down face stream");
        }
        Ok(())
    }
}

fn probe_interest(probe: &ProbeRequest, lifetime: Duration) -> Interest {
    let mut interest = Interest::new(probe.name.clone());
    interest.must_be_fresh = probe.must_be_fresh;
    interest.nonce = Some(probe.wire_nonce());
    interest.lifetime = Some(lifetime);
    interest.hop_limit = Some(probe.hop_limit);
    interest
}

#[async_trait]
impl ProbeTransport for Face {
    async fn express(
        &mut self,
        probe: &ProbeRequest,
        lifetime: Duration,
    ) -> Result<(), TracerouteError> {
        self.express_interest(probe.key, probe_interest(probe, lifetime))
            .await
    }

    async fn next_event(&mut self) -> Result<TransportEvent, TracerouteError> {
        self.next_outcome().await
    }

    async fn close(&mut self) -> Result<(), TracerouteError> {
        self.shutdown().await
    }
}
