//! Network-layer packets as they arrive on a face.

use crate::{types, Block, Data, Interest, LpPacket, NackReason, TlvError, TlvResult};

/// A decoded network-layer packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetPacket {
    Interest(Interest),
    Data(Data),
    Nack { interest: Interest, reason: NackReason },
}

impl NetPacket {
    /// Decodes a frame read from a face: a bare Interest or Data, or an LpPacket.
    ///
    /// Returns `Ok(None)` for LpPackets without a fragment.
    pub fn from_frame(frame: &Block) -> TlvResult<Option<Self>> {
        match frame.typ() {
            types::INTEREST => Ok(Some(NetPacket::Interest(Interest::from_block(frame)?))),
            types::DATA => Ok(Some(NetPacket::Data(Data::from_block(frame)?))),
            types::LP_PACKET => {
                let lp = LpPacket::from_block(frame)?;
                let Some(fragment) = lp.fragment else {
                    return Ok(None);
                };
                let inner = Block::from_wire(&fragment)?;
                match (lp.nack, inner.typ()) {
                    (Some(reason), types::INTEREST) => Ok(Some(NetPacket::Nack {
                        interest: Interest::from_block(&inner)?,
                        reason,
                    })),
                    (Some(_), actual) => Err(TlvError::UnexpectedType {
                        expected: types::INTEREST,
                        actual,
                    }),
                    (None, types::LP_PACKET) => Err(TlvError::Unsupported("nested LpPacket")),
                    (None, _) => Self::from_frame(&inner),
                }
            }
            other => Err(TlvError::UnknownPacketType(other)),
        }
    }

    /// Encodes for transmission; Nacks are wrapped in an LpPacket.
    pub fn to_block(&self) -> Block {
        match self {
            NetPacket::Interest(interest) => interest.to_block(),
            NetPacket::Data(data) => data.to_block(),
            NetPacket::Nack { interest, reason } => {
                LpPacket::nack(*reason, interest.encode()).to_block()
            }
        }
    }
}
