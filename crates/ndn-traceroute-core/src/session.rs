//! Probe scheduler: the per-hop state machine and termination policy.
//!
//! The scheduler never touches the network. It hands out [`ProbeRequest`]s and
//! consumes outcomes keyed by [`ProbeKey`]; the session runner in
//! [`crate::execution`] moves both between it and a transport.

use crate::{
    ProbeKey, ProbeRequest, ReplyPayload, StatusCode, TracerouteError, TransportEvent,
    TransportOutcome, DISCOVERY_MARKER,
};
use ndn_traceroute_tlv::{Component, Data, NackReason, Name};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The single outstanding probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub key: ProbeKey,
    pub hop_limit: u8,
    pub name: Name,
    pub sent_at: Instant,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Termination {
    /// A reply carried a destination-reached status code.
    DestinationReached { hop_limit: u8 },
    /// Every HopLimit up to the maximum was probed.
    MaxHopLimitReached,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::DestinationReached { hop_limit } => {
                write!(f, "destination reached at HopLimit {}", hop_limit)
            }
            Termination::MaxHopLimitReached => {
                write!(f, "maximum hop-limit reached, probe incomplete")
            }
        }
    }
}

/// Scheduler state. At most one probe is in flight, by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingReply(InFlight),
    Terminated(Termination),
}

/// What became of one hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopStatus {
    Reply {
        responder: Name,
        status: StatusCode,
        rtt: Duration,
        /// Whether the reply carried an intact DigestSha256 signature.
        /// Recorded only; it does not affect the session.
        digest_verified: bool,
    },
    Timeout,
    Nack {
        reason: NackReason,
    },
    /// A reply arrived but its content could not be decoded.
    Malformed {
        reason: String,
    },
}

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopResult {
    /// HopLimit that was placed on the probe.
    pub hop_limit: u8,
    /// Name the probe was expressed under.
    pub probe_name: Name,
    pub status: HopStatus,
}

/// What the caller has to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Express this probe.
    Probe(ProbeRequest),
    /// The session is over.
    Finished(Termination),
}

/// A processed outcome: the hop it completed and the next step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub hop: HopResult,
    pub next: Step,
}

/// Sequential probe scheduler for one traceroute session.
#[derive(Debug)]
pub struct Scheduler {
    target: Name,
    max_hop_limit: u8,
    /// Wider than the wire field so it can step past 255.
    current_hop_limit: u16,
    next_key: u64,
    probes_sent: u32,
    state: SessionState,
}

impl Scheduler {
    /// Creates a scheduler for `target`, probing HopLimits 1 through `max_hop_limit`.
    pub fn new(target: Name, max_hop_limit: u8) -> Result<Self, TracerouteError> {
        if target.is_empty() {
            return Err(TracerouteError::EmptyTarget);
        }
        if max_hop_limit == 0 {
            return Err(TracerouteError::InvalidHopLimit(max_hop_limit.to_string()));
        }
        Ok(Self {
            target,
            max_hop_limit,
            current_hop_limit: 1,
            next_key: 0,
            probes_sent: 0,
            state: SessionState::Idle,
        })
    }

    pub fn target(&self) -> &Name {
        &self.target
    }

    pub fn max_hop_limit(&self) -> u8 {
        self.max_hop_limit
    }

    /// HopLimit the next probe will carry.
    pub fn current_hop_limit(&self) -> u16 {
        self.current_hop_limit
    }

    pub fn probes_sent(&self) -> u32 {
        self.probes_sent
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        match &self.state {
            SessionState::AwaitingReply(in_flight) => Some(in_flight),
            _ => None,
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.state {
            SessionState::Terminated(termination) => Some(termination),
            _ => None,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.termination().is_some()
    }

    /// Starts the session by emitting the first probe.
    pub fn start(&mut self) -> Result<Step, TracerouteError> {
        if self.probes_sent > 0 {
            return Err(TracerouteError::Internal(
                "session already started".to_string(),
            ));
        }
        self.emit_probe()
    }

    /// Emits the probe for the current HopLimit, or terminates past the maximum.
    pub fn emit_probe(&mut self) -> Result<Step, TracerouteError> {
        match &self.state {
            SessionState::Idle => {}
            SessionState::AwaitingReply(_) => return Err(TracerouteError::ProbeInFlight),
            SessionState::Terminated(_) => return Err(TracerouteError::SessionTerminated),
        }

        if self.current_hop_limit > self.max_hop_limit as u16 {
            debug!(
                max_hop_limit = self.max_hop_limit,
                "Reached maximum HopLimit, stopping"
            );
            return Ok(self.terminate(Termination::MaxHopLimitReached));
        }

        // Capture the HopLimit for this probe before advancing to the next one.
        let hop_limit = self.current_hop_limit as u8;
        self.current_hop_limit += 1;

        let nonce: u64 = rand::random();
        let key = ProbeKey::new(self.next_key);
        self.next_key += 1;
        self.probes_sent += 1;

        let name = self
            .target
            .clone()
            .append(DISCOVERY_MARKER)
            .append(Component::number(nonce));
        let sent_at = Instant::now();

        debug!(hop_limit = hop_limit, key = %key, name = %name, "Emitting probe");

        self.state = SessionState::AwaitingReply(InFlight {
            key,
            hop_limit,
            name: name.clone(),
            sent_at,
        });

        Ok(Step::Probe(ProbeRequest {
            key,
            target: self.target.clone(),
            name,
            hop_limit,
            nonce,
            must_be_fresh: true,
            sent_at,
        }))
    }

    /// Handles any transport outcome.
    pub fn on_event(&mut self, event: TransportEvent) -> Result<Transition, TracerouteError> {
        match event.outcome {
            TransportOutcome::Data(data) => self.on_reply(event.key, &data),
            TransportOutcome::Timeout => self.on_timeout(event.key),
            TransportOutcome::Nack(reason) => self.on_nack(event.key, reason),
        }
    }

    /// Handles a Data reply.
    ///
    /// A destination-reached status code ends the session; any other code, or
    /// an undecodable payload, moves on to the next HopLimit.
    pub fn on_reply(&mut self, key: ProbeKey, data: &Data) -> Result<Transition, TracerouteError> {
        let in_flight = self.take_in_flight(key)?;
        let rtt = in_flight.sent_at.elapsed();
        debug!(
            hop_limit = in_flight.hop_limit,
            key = %key,
            rtt_ms = rtt.as_secs_f64() * 1000.0,
            "Received reply"
        );

        let status = match ReplyPayload::decode(&data.content) {
            Ok(reply) => HopStatus::Reply {
                responder: reply.responder,
                status: reply.status,
                rtt,
                digest_verified: data.verify_digest_sha256(),
            },
            Err(e) => {
                warn!(hop_limit = in_flight.hop_limit, error = %e, "Malformed reply");
                HopStatus::Malformed {
                    reason: e.to_string(),
                }
            }
        };

        let reached = matches!(
            &status,
            HopStatus::Reply { status, .. } if status.is_destination_reached()
        );
        let next = if reached {
            debug!(hop_limit = in_flight.hop_limit, "Reached destination, stopping");
            self.terminate(Termination::DestinationReached {
                hop_limit: in_flight.hop_limit,
            })
        } else {
            self.emit_probe()?
        };

        Ok(Transition {
            hop: HopResult {
                hop_limit: in_flight.hop_limit,
                probe_name: in_flight.name,
                status,
            },
            next,
        })
    }

    /// Handles an expired Interest. Timeouts are never retried.
    pub fn on_timeout(&mut self, key: ProbeKey) -> Result<Transition, TracerouteError> {
        let in_flight = self.take_in_flight(key)?;
        debug!(hop_limit = in_flight.hop_limit, "Timeout waiting for reply");
        self.advance(in_flight, HopStatus::Timeout)
    }

    /// Handles a Nack. Treated like a timeout: report and move on.
    pub fn on_nack(
        &mut self,
        key: ProbeKey,
        reason: NackReason,
    ) -> Result<Transition, TracerouteError> {
        let in_flight = self.take_in_flight(key)?;
        debug!(hop_limit = in_flight.hop_limit, reason = %reason, "Received Nack");
        self.advance(in_flight, HopStatus::Nack { reason })
    }

    fn advance(
        &mut self,
        in_flight: InFlight,
        status: HopStatus,
    ) -> Result<Transition, TracerouteError> {
        let next = self.emit_probe()?;
        Ok(Transition {
            hop: HopResult {
                hop_limit: in_flight.hop_limit,
                probe_name: in_flight.name,
                status,
            },
            next,
        })
    }

    /// Clears the in-flight slot if it holds `key`; otherwise leaves all state untouched.
    fn take_in_flight(&mut self, key: ProbeKey) -> Result<InFlight, TracerouteError> {
        match std::mem::replace(&mut self.state, SessionState::Idle) {
            SessionState::AwaitingReply(in_flight) if in_flight.key == key => Ok(in_flight),
            other => {
                if matches!(other, SessionState::Terminated(_)) {
                    debug!(key = %key, "Outcome arrived after the session terminated");
                } else {
                    debug!(key = %key, "Outcome for a probe that is not in flight");
                }
                self.state = other;
                Err(TracerouteError::UnknownCorrelation(key))
            }
        }
    }

    fn terminate(&mut self, termination: Termination) -> Step {
        self.state = SessionState::Terminated(termination);
        Step::Finished(termination)
    }
}
