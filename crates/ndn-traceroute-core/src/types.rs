//! Core types for traceroute operations.

use crate::TracerouteError;
use ndn_traceroute_tlv::Name;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Default maximum HopLimit.
pub const DEFAULT_MAX_HOP_LIMIT: u8 = 30;
/// Default Interest lifetime, which is also the per-probe timeout.
pub const DEFAULT_INTEREST_LIFETIME_MS: u64 = 4000;
/// Name component inserted between the target and the nonce of every probe.
pub const DISCOVERY_MARKER: &str = "traceroute";
/// Default forwarder face on Linux.
pub const DEFAULT_FACE_URI: &str = "unix:///run/nfd/nfd.sock";

/// Correlates a transport outcome with the probe it belongs to.
///
/// Keys are minted by the scheduler; transports store them alongside the
/// pending Interest and hand them back with every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeKey(u64);

impl ProbeKey {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProbeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probe#{}", self.0)
    }
}

/// A single probe, ready to be expressed as an Interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Correlation key for the outcome.
    pub key: ProbeKey,
    /// Base name being traced.
    pub target: Name,
    /// Full probe name: target, discovery marker, nonce.
    pub name: Name,
    /// HopLimit placed on the Interest.
    pub hop_limit: u8,
    /// Random per-probe nonce, also encoded in the name.
    pub nonce: u64,
    /// Whether cached Data must not satisfy the probe.
    pub must_be_fresh: bool,
    /// When the probe was emitted.
    pub sent_at: Instant,
}

impl ProbeRequest {
    /// The 4-byte Interest Nonce derived from the probe nonce.
    pub fn wire_nonce(&self) -> u32 {
        self.nonce as u32
    }
}

/// Parameters for traceroute execution.
#[derive(Debug, Clone)]
pub struct TracerouteParams {
    /// Highest HopLimit to probe.
    pub max_hop_limit: u8,
    /// Interest lifetime; an unanswered probe times out after this.
    pub interest_lifetime: Duration,
}

impl Default for TracerouteParams {
    fn default() -> Self {
        Self {
            max_hop_limit: DEFAULT_MAX_HOP_LIMIT,
            interest_lifetime: Duration::from_millis(DEFAULT_INTEREST_LIFETIME_MS),
        }
    }
}

impl TracerouteParams {
    /// Validates the parameters.
    pub fn validate(&self) -> Result<(), TracerouteError> {
        if self.max_hop_limit == 0 {
            return Err(TracerouteError::InvalidHopLimit(
                self.max_hop_limit.to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a maximum HopLimit given as text, accepting 1 to 255.
    pub fn parse_max_hop_limit(input: &str) -> Result<u8, TracerouteError> {
        input
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|value| *value >= 1)
            .ok_or_else(|| TracerouteError::InvalidHopLimit(input.to_string()))
    }

    /// Upper bound on the duration of a session where every probe times out.
    pub fn max_duration(&self) -> Duration {
        self.interest_lifetime * self.max_hop_limit as u32
    }
}

/// High-level traceroute configuration.
#[derive(Debug, Clone)]
pub struct TracerouteConfig {
    /// Name being traced.
    pub target: Name,
    /// Traceroute parameters.
    pub params: TracerouteParams,
    /// Forwarder face URI.
    pub face_uri: String,
}

impl TracerouteConfig {
    pub fn new(target: Name) -> Self {
        Self {
            target,
            params: TracerouteParams::default(),
            face_uri: DEFAULT_FACE_URI.to_string(),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TracerouteError> {
        if self.target.is_empty() {
            return Err(TracerouteError::EmptyTarget);
        }
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traceroute_params_validate() {
        assert!(TracerouteParams::default().validate().is_ok());

        let invalid = TracerouteParams {
            max_hop_limit: 0,
            ..Default::default()
        };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_parse_max_hop_limit() {
        assert_eq!(TracerouteParams::parse_max_hop_limit("1").unwrap(), 1);
        assert_eq!(TracerouteParams::parse_max_hop_limit("255").unwrap(), 255);
        assert_eq!(TracerouteParams::parse_max_hop_limit(" 30 ").unwrap(), 30);
        for bad in ["0", "256", "-1", "abc", ""] {
            assert!(
                TracerouteParams::parse_max_hop_limit(bad).is_err(),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_config_rejects_empty_target() {
        let config = TracerouteConfig::new(Name::new());
        assert!(matches!(
            config.validate(),
            Err(TracerouteError::EmptyTarget)
        ));

        let config = TracerouteConfig::new("/example/test".parse().unwrap());
        assert!(config.validate().is_ok());
        assert_eq!(config.face_uri, DEFAULT_FACE_URI);
    }

    #[test]
    fn test_wire_nonce_truncates() {
        let probe = ProbeRequest {
            key: ProbeKey::new(1),
            target: Name::new(),
            name: Name::new(),
            hop_limit: 1,
            nonce: 0x1122_3344_5566_7788,
            must_be_fresh: true,
            sent_at: Instant::now(),
        };
        assert_eq!(probe.wire_nonce(), 0x5566_7788);
    }

    #[test]
    fn test_max_duration() {
        let params = TracerouteParams {
            max_hop_limit: 3,
            interest_lifetime: Duration::from_millis(100),
        };
        assert_eq!(params.max_duration(), Duration::from_millis(300));
    }
}
