//! Reply status codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code carried in a traceroute reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u64);

impl StatusCode {
    /// Codes 1 to 3 mean the probe reached its destination.
    pub const DESTINATION_REACHED: [StatusCode; 3] = [StatusCode(1), StatusCode(2), StatusCode(3)];

    /// No error; the reply came from an intermediate hop.
    pub const NO_ERROR: StatusCode = StatusCode(4);

    /// Returns true if this code ends the session.
    pub fn is_destination_reached(&self) -> bool {
        Self::DESTINATION_REACHED.contains(self)
    }
}

impl From<u64> for StatusCode {
    fn from(code: u64) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
