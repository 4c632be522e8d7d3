//! Result types for traceroute output.

use crate::{HopResult, HopStatus, SessionSummary, Termination};
use ndn_traceroute_tlv::Name;
use serde::{Deserialize, Serialize};

/// How a single hop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HopOutcome {
    Reply,
    Timeout,
    Nack,
    Malformed,
}

/// A single hop in a traceroute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteHop {
    /// HopLimit carried by the probe.
    pub hop_limit: u8,
    /// Name the probe was expressed under.
    pub probe_name: String,
    pub outcome: HopOutcome,
    /// Forwarder that answered (None unless the outcome is a reply).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u64>,
    /// Round-trip time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rtt_ms: Option<f64>,
    /// Whether the reply's DigestSha256 signature checked out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nack_reason: Option<String>,
    /// Decode error for a malformed reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&HopResult> for TracerouteHop {
    fn from(hop: &HopResult) -> Self {
        let mut out = TracerouteHop {
            hop_limit: hop.hop_limit,
            probe_name: hop.probe_name.to_string(),
            outcome: HopOutcome::Timeout,
            responder: None,
            status_code: None,
            rtt_ms: None,
            digest_verified: None,
            nack_reason: None,
            error: None,
        };
        match &hop.status {
            HopStatus::Reply {
                responder,
                status,
                rtt,
                digest_verified,
            } => {
                out.outcome = HopOutcome::Reply;
                out.responder = Some(responder.to_string());
                out.status_code = Some(status.0);
                out.rtt_ms = Some(rtt.as_micros() as f64 / 1000.0);
                out.digest_verified = Some(*digest_verified);
            }
            HopStatus::Timeout => {}
            HopStatus::Nack { reason } => {
                out.outcome = HopOutcome::Nack;
                out.nack_reason = Some(reason.to_string());
            }
            HopStatus::Malformed { reason } => {
                out.outcome = HopOutcome::Malformed;
                out.error = Some(reason.clone());
            }
        }
        out
    }
}

/// A complete traceroute run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracerouteReport {
    /// Unique identifier for this run.
    pub run_id: String,
    /// Traced name.
    pub target: String,
    pub max_hop_limit: u8,
    pub probes_sent: u32,
    pub termination: Termination,
    /// Hops in the order they were probed.
    pub hops: Vec<TracerouteHop>,
}

impl TracerouteReport {
    pub fn from_summary(target: &Name, max_hop_limit: u8, summary: &SessionSummary) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            max_hop_limit,
            probes_sent: summary.probes_sent,
            termination: summary.termination,
            hops: summary.hops.iter().map(TracerouteHop::from).collect(),
        }
    }

    /// Whether the run ended at the destination.
    pub fn destination_reached(&self) -> bool {
        matches!(self.termination, Termination::DestinationReached { .. })
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;
    use ndn_traceroute_tlv::NackReason;
    use std::time::Duration;

    fn summary() -> SessionSummary {
        let probe_name: Name = "/example/test/traceroute/%01".parse().unwrap();
        SessionSummary {
            termination: Termination::DestinationReached { hop_limit: 3 },
            probes_sent: 3,
            hops: vec![
                HopResult {
                    hop_limit: 1,
                    probe_name: probe_name.clone(),
                    status: HopStatus::Reply {
                        responder: "/router/a".parse().unwrap(),
                        status: StatusCode::NO_ERROR,
                        rtt: Duration::from_micros(12_500),
                        digest_verified: true,
                    },
                },
                HopResult {
                    hop_limit: 2,
                    probe_name: probe_name.clone(),
                    status: HopStatus::Nack {
                        reason: NackReason::NoRoute,
                    },
                },
                HopResult {
                    hop_limit: 3,
                    probe_name,
                    status: HopStatus::Timeout,
                },
            ],
        }
    }

    #[test]
    fn test_report_from_summary() {
        let report =
            TracerouteReport::from_summary(&"/example/test".parse().unwrap(), 30, &summary());
        assert_eq!(report.target, "/example/test");
        assert_eq!(report.hops.len(), 3);
        assert!(report.destination_reached());
        assert!(uuid::Uuid::parse_str(&report.run_id).is_ok());

        let first = &report.hops[0];
        assert_eq!(first.outcome, HopOutcome::Reply);
        assert_eq!(first.responder.as_deref(), Some("/router/a"));
        assert_eq!(first.status_code, Some(4));
        assert_eq!(first.rtt_ms, Some(12.5));

        assert_eq!(report.hops[1].outcome, HopOutcome::Nack);
        assert!(report.hops[1].nack_reason.is_some());
        assert_eq!(report.hops[2].outcome, HopOutcome::Timeout);
    }

    #[test]
    fn test_report_serialization() {
        let report =
            TracerouteReport::from_summary(&"/example/test".parse().unwrap(), 30, &summary());
        let json = report.to_json().unwrap();

        assert!(json.contains("\"outcome\": \"reply\""));
        assert!(json.contains("\"reason\": \"destination_reached\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let timeout_hop = &value["hops"][2];
        assert!(timeout_hop.get("responder").is_none());
        assert!(timeout_hop.get("rtt_ms").is_none());

        let parsed: TracerouteReport =
            serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
