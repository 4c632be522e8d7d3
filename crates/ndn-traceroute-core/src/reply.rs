//! Reply content codec.
//!
//! A reply's Content holds, in order, the responder's Name and a
//! NonNegativeInteger status code. Later elements are ignored so responders
//! can add fields without breaking older clients.

use crate::{StatusCode, TracerouteError};
use ndn_traceroute_tlv::{parse_elements, Block, Name};

/// TLV type the responder uses for the status code element.
pub const REPLY_STATUS_TLV_TYPE: u64 = 128;

/// Decoded reply content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPayload {
    /// Identity of the node that answered.
    pub responder: Name,
    pub status: StatusCode,
}

impl ReplyPayload {
    pub fn new(responder: Name, status: StatusCode) -> Self {
        Self { responder, status }
    }

    /// Parses reply content.
    ///
    /// Only the structure is checked. The status element's TLV type is not
    /// inspected and the code is not range-checked.
    pub fn decode(content: &[u8]) -> Result<Self, TracerouteError> {
        let elements = parse_elements(content).map_err(|e| {
            TracerouteError::MalformedPayload(format!("content is not a TLV sequence: {}", e))
        })?;

        let mut elements = elements.iter();
        let name_element = elements.next().ok_or_else(|| {
            TracerouteError::MalformedPayload("content is empty".to_string())
        })?;
        let status_element = elements.next().ok_or_else(|| {
            TracerouteError::MalformedPayload("reply code is missing".to_string())
        })?;

        let responder = Name::from_block(name_element).map_err(|e| {
            TracerouteError::MalformedPayload(format!("invalid responder name: {}", e))
        })?;
        let status = status_element.as_non_negative_integer().map_err(|e| {
            TracerouteError::MalformedPayload(format!("invalid reply code: {}", e))
        })?;

        Ok(Self {
            responder,
            status: StatusCode(status),
        })
    }

    /// Encodes reply content.
    pub fn encode(&self) -> Vec<u8> {
        let mut content = Vec::new();
        self.responder.encode_into(&mut content);
        Block::from_non_negative_integer(REPLY_STATUS_TLV_TYPE, self.status.0)
            .encode_into(&mut content);
        content
    }
}
