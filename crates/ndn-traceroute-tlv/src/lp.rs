//! NDNLPv2 link-layer packets.

use crate::{types, Block, TlvError, TlvResult};
use std::fmt;

/// Reason carried by a network Nack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NackReason {
    None,
    Congestion,
    Duplicate,
    NoRoute,
    Other(u64),
}

impl NackReason {
    pub fn code(&self) -> u64 {
        match self {
            NackReason::None => 0,
            NackReason::Congestion => 50,
            NackReason::Duplicate => 100,
            NackReason::NoRoute => 150,
            NackReason::Other(code) => *code,
        }
    }
}

impl From<u64> for NackReason {
    fn from(code: u64) -> Self {
        match code {
            0 => NackReason::None,
            50 => NackReason::Congestion,
            100 => NackReason::Duplicate,
            150 => NackReason::NoRoute,
            other => NackReason::Other(other),
        }
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NackReason::None => write!(f, "None"),
            NackReason::Congestion => write!(f, "Congestion"),
            NackReason::Duplicate => write!(f, "Duplicate"),
            NackReason::NoRoute => write!(f, "NoRoute"),
            NackReason::Other(code) => write!(f, "{}", code),
        }
    }
}

/// The fields of an LpPacket this crate acts on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LpPacket {
    pub sequence: Option<u64>,
    pub nack: Option<NackReason>,
    /// Encoded network-layer packet, absent for idle packets.
    pub fragment: Option<Vec<u8>>,
}

impl LpPacket {
    /// Wraps an encoded Interest in a Nack packet.
    pub fn nack(reason: NackReason, interest_wire: Vec<u8>) -> Self {
        Self {
            sequence: None,
            nack: Some(reason),
            fragment: Some(interest_wire),
        }
    }

    pub fn to_block(&self) -> Block {
        let mut elements = Vec::new();
        if let Some(sequence) = self.sequence {
            elements.push(Block::new(types::LP_SEQUENCE, sequence.to_be_bytes().to_vec()));
        }
        if let Some(reason) = self.nack {
            let fields = match reason {
                NackReason::None => Vec::new(),
                reason => vec![Block::from_non_negative_integer(
                    types::LP_NACK_REASON,
                    reason.code(),
                )],
            };
            elements.push(Block::nested(types::LP_NACK, &fields));
        }
        if let Some(fragment) = &self.fragment {
            elements.push(Block::new(types::LP_FRAGMENT, fragment.clone()));
        }
        Block::nested(types::LP_PACKET, &elements)
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::LP_PACKET)?;
        let mut packet = LpPacket::default();
        for element in block.elements()? {
            match element.typ() {
                types::LP_SEQUENCE => {
                    packet.sequence = Some(element.as_non_negative_integer()?);
                }
                types::LP_FRAG_INDEX => {}
                types::LP_FRAG_COUNT => {
                    if element.as_non_negative_integer()? > 1 {
                        return Err(TlvError::Unsupported("fragmented LpPacket"));
                    }
                }
                types::LP_NACK => {
                    let reason = element
                        .elements()?
                        .iter()
                        .find(|b| b.typ() == types::LP_NACK_REASON)
                        .map(Block::as_non_negative_integer)
                        .transpose()?
                        .map_or(NackReason::None, NackReason::from);
                    packet.nack = Some(reason);
                }
                types::LP_FRAGMENT => packet.fragment = Some(element.into_value()),
                typ if types::is_lp_ignorable(typ) => {}
                // Known header fields (PIT token, face ids, congestion mark) carry nothing we use.
                0x62 | 0x032C | 0x0330 | 0x0334 | 0x0340 | 0x0344 | 0x0348 => {}
                typ => return Err(TlvError::UnrecognizedCritical(typ)),
            }
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nack_reason_codes() {
        assert_eq!(NackReason::from(150), NackReason::NoRoute);
        assert_eq!(NackReason::from(7), NackReason::Other(7));
        assert_eq!(NackReason::Congestion.code(), 50);
        assert_eq!(NackReason::NoRoute.to_string(), "NoRoute");
    }

    #[test]
    fn test_nack_packet_fields() {
        let packet = LpPacket::nack(NackReason::NoRoute, vec![0x05, 0x00]);
        let decoded = LpPacket::from_block(&packet.to_block()).unwrap();
        assert_eq!(decoded.nack, Some(NackReason::NoRoute));
        assert_eq!(decoded.fragment, Some(vec![0x05, 0x00]));
    }

    #[test]
    fn test_nack_without_reason_is_none() {
        let block = Block::nested(
            types::LP_PACKET,
            &[
                Block::empty(types::LP_NACK),
                Block::new(types::LP_FRAGMENT, vec![0x05, 0x00]),
            ],
        );
        let packet = LpPacket::from_block(&block).unwrap();
        assert_eq!(packet.nack, Some(NackReason::None));
    }

    #[test]
    fn test_idle_packet_and_ignored_fields() {
        let block = Block::nested(
            types::LP_PACKET,
            &[Block::from_non_negative_integer(0x0340, 1)],
        );
        let packet = LpPacket::from_block(&block).unwrap();
        assert!(packet.fragment.is_none());
        assert!(packet.nack.is_none());
    }

    #[test]
    fn test_rejects_fragmentation_and_unknown_fields() {
        let fragmented = Block::nested(
            types::LP_PACKET,
            &[Block::from_non_negative_integer(types::LP_FRAG_COUNT, 2)],
        );
        assert_eq!(
            LpPacket::from_block(&fragmented),
            Err(TlvError::Unsupported("fragmented LpPacket"))
        );

        let unknown = Block::nested(types::LP_PACKET, &[Block::empty(0x0351)]);
        assert_eq!(
            LpPacket::from_block(&unknown),
            Err(TlvError::UnrecognizedCritical(0x0351))
        );
    }
}
