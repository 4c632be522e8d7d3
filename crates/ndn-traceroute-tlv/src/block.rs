//! Generic TLV element.

use crate::encoding::{
    decode_non_negative_integer, encode_non_negative_integer, read_var_number, var_number_len,
    write_var_number,
};
use crate::{TlvError, TlvResult};

/// Maximum size of an NDN packet on the wire.
pub const MAX_NDN_PACKET_SIZE: usize = 8800;

/// A single TLV element: a type number and an owned value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    typ: u64,
    value: Vec<u8>,
}

impl Block {
    /// Creates a block from a type and raw value bytes.
    pub fn new(typ: u64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            typ,
            value: value.into(),
        }
    }

    /// Creates a block with an empty value.
    pub fn empty(typ: u64) -> Self {
        Self::new(typ, Vec::new())
    }

    /// Creates a block whose value is a NonNegativeInteger.
    pub fn from_non_negative_integer(typ: u64, n: u64) -> Self {
        Self::new(typ, encode_non_negative_integer(n))
    }

    /// Creates a block whose value is the concatenation of `elements`.
    pub fn nested(typ: u64, elements: &[Block]) -> Self {
        let mut value = Vec::with_capacity(elements.iter().map(Block::wire_len).sum());
        for element in elements {
            element.encode_into(&mut value);
        }
        Self { typ, value }
    }

    pub fn typ(&self) -> u64 {
        self.typ
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_value(self) -> Vec<u8> {
        self.value
    }

    /// Total encoded size including the type and length headers.
    pub fn wire_len(&self) -> usize {
        var_number_len(self.typ) + var_number_len(self.value.len() as u64) + self.value.len()
    }

    /// Appends the wire encoding to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        write_var_number(self.typ, out);
        write_var_number(self.value.len() as u64, out);
        out.extend_from_slice(&self.value);
    }

    /// Returns the wire encoding.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.encode_into(&mut out);
        out
    }

    /// Decodes the first element of `buf`, returning it and the bytes consumed.
    pub fn decode(buf: &[u8]) -> TlvResult<(Block, usize)> {
        let (typ, type_len) = read_var_number(buf)?;
        let (len, len_len) = read_var_number(&buf[type_len..])?;
        let header = type_len + len_len;
        let len = usize::try_from(len).map_err(|_| TlvError::TooLarge(usize::MAX))?;
        let end = header.checked_add(len).ok_or(TlvError::TooLarge(len))?;
        if buf.len() < end {
            return Err(TlvError::Truncated {
                expected: end,
                actual: buf.len(),
            });
        }
        Ok((Block::new(typ, &buf[header..end]), end))
    }

    /// Decodes a buffer holding exactly one element.
    pub fn from_wire(buf: &[u8]) -> TlvResult<Block> {
        let (block, consumed) = Self::decode(buf)?;
        if consumed != buf.len() {
            return Err(TlvError::TrailingBytes(buf.len() - consumed));
        }
        Ok(block)
    }

    /// Decodes the first element of a stream buffer, if it is complete.
    ///
    /// Returns `Ok(None)` when more bytes are needed. Elements announcing a
    /// size above [`MAX_NDN_PACKET_SIZE`] are rejected before they are buffered.
    pub fn try_decode_frame(buf: &[u8]) -> TlvResult<Option<(Block, usize)>> {
        let (_, type_len) = match read_var_number(buf) {
            Ok(v) => v,
            Err(e) if e.is_incomplete() => return Ok(None),
            Err(e) => return Err(e),
        };
        let (len, len_len) = match read_var_number(&buf[type_len..]) {
            Ok(v) => v,
            Err(e) if e.is_incomplete() => return Ok(None),
            Err(e) => return Err(e),
        };
        let total = len
            .checked_add((type_len + len_len) as u64)
            .ok_or(TlvError::TooLarge(usize::MAX))?;
        if total > MAX_NDN_PACKET_SIZE as u64 {
            return Err(TlvError::TooLarge(usize::try_from(total).unwrap_or(usize::MAX)));
        }
        if (buf.len() as u64) < total {
            return Ok(None);
        }
        Self::decode(buf).map(Some)
    }

    /// Parses the value as a sequence of nested elements.
    pub fn elements(&self) -> TlvResult<Vec<Block>> {
        parse_elements(&self.value)
    }

    /// Interprets the value as a NonNegativeInteger.
    pub fn as_non_negative_integer(&self) -> TlvResult<u64> {
        decode_non_negative_integer(&self.value)
    }

    /// Fails unless this block has type `typ`.
    pub fn expect_type(&self, typ: u64) -> TlvResult<()> {
        if self.typ != typ {
            return Err(TlvError::UnexpectedType {
                expected: typ,
                actual: self.typ,
            });
        }
        Ok(())
    }
}

/// Parses a buffer as a sequence of TLV elements.
pub fn parse_elements(mut buf: &[u8]) -> TlvResult<Vec<Block>> {
    let mut elements = Vec::new();
    while !buf.is_empty() {
        let (block, consumed) = Block::decode(buf)?;
        elements.push(block);
        buf = &buf[consumed..];
    }
    Ok(elements)
}
