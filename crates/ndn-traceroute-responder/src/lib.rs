//! Traceroute responder.
//!
//! Registers a prefix with the local forwarder and answers every Interest
//! under it with a signed reply naming this node and its status code.

use ndn_traceroute_core::tlv::{Data, Interest, Name};
use ndn_traceroute_core::{ReplyPayload, StatusCode, TracerouteError};
use ndn_traceroute_face::Face;
use std::time::Duration;
use tracing::{debug, info};

/// FreshnessPeriod of replies.
pub const DEFAULT_FRESHNESS: Duration = Duration::from_millis(1000);

/// Answers traceroute probes under one prefix.
#[derive(Debug, Clone)]
pub struct Responder {
    name: Name,
    prefix: Name,
    status: StatusCode,
    freshness: Duration,
}

impl Responder {
    /// Creates a responder identifying itself as `name` and serving `prefix`,
    /// replying with [`StatusCode::NO_ERROR`].
    pub fn new(name: Name, prefix: Name) -> Self {
        Self {
            name,
            prefix,
            status: StatusCode::NO_ERROR,
            freshness: DEFAULT_FRESHNESS,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_freshness(mut self, freshness: Duration) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn prefix(&self) -> &Name {
        &self.prefix
    }

    /// Builds the reply for `interest`, or `None` if it is outside the prefix.
    pub fn answer(&self, interest: &Interest) -> Option<Data> {
        if !self.prefix.is_prefix_of(&interest.name) {
            return None;
        }
        let payload = ReplyPayload::new(self.name.clone(), self.status);
        let mut data = Data::new(interest.name.clone(), payload.encode())
            .with_freshness_period(self.freshness);
        data.sign_digest_sha256();
        Some(data)
    }

    /// Registers the prefix on `face` and answers Interests until the face fails.
    pub async fn serve(&self, face: &mut Face) -> Result<(), TracerouteError> {
        face.register_prefix(&self.prefix).await?;
        info!(
            name = %self.name,
            prefix = %self.prefix,
            status = %self.status,
            "Responder ready"
        );

        loop {
            let interest = face.next_interest().await?;
            match self.answer(&interest) {
                Some(data) => {
                    debug!(name = %interest.name, hop_limit = ?interest.hop_limit, "Answering probe");
                    face.put_data(&data).await?;
                }
                None => debug!(name = %interest.name, "Ignoring Interest outside prefix"),
            }
        }
    }
}
