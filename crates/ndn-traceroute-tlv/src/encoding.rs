//! VarNumber and NonNegativeInteger primitives.

use crate::{TlvError, TlvResult};

/// Returns the number of bytes needed to encode `n` as a VarNumber.
pub fn var_number_len(n: u64) -> usize {
    if n < 253 {
        1
    } else if n <= 0xFFFF {
        3
    } else if n <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Appends the shortest VarNumber encoding of `n`.
pub fn write_var_number(n: u64, out: &mut Vec<u8>) {
    if n < 253 {
        out.push(n as u8);
    } else if n <= 0xFFFF {
        out.push(253);
        out.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xFFFF_FFFF {
        out.push(254);
        out.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        out.push(255);
        out.extend_from_slice(&n.to_be_bytes());
    }
}

/// Reads a VarNumber from the start of `buf`.
///
/// Returns the value and the number of bytes consumed.
pub fn read_var_number(buf: &[u8]) -> TlvResult<(u64, usize)> {
    let first = *buf.first().ok_or(TlvError::Truncated {
        expected: 1,
        actual: 0,
    })?;

    let width = match first {
        0..=252 => return Ok((first as u64, 1)),
        253 => 2,
        254 => 4,
        255 => 8,
    };

    if buf.len() < 1 + width {
        return Err(TlvError::Truncated {
            expected: 1 + width,
            actual: buf.len(),
        });
    }

    let value = buf[1..=width]
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | *b as u64);
    Ok((value, 1 + width))
}

/// Encodes `n` as a NonNegativeInteger using the shortest of 1, 2, 4 or 8 bytes.
pub fn encode_non_negative_integer(n: u64) -> Vec<u8> {
    if n <= 0xFF {
        vec![n as u8]
    } else if n <= 0xFFFF {
        (n as u16).to_be_bytes().to_vec()
    } else if n <= 0xFFFF_FFFF {
        (n as u32).to_be_bytes().to_vec()
    } else {
        n.to_be_bytes().to_vec()
    }
}

/// Decodes a NonNegativeInteger value; only 1, 2, 4 and 8 byte widths are valid.
pub fn decode_non_negative_integer(buf: &[u8]) -> TlvResult<u64> {
    match buf.len() {
        1 | 2 | 4 | 8 => Ok(buf.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64)),
        n => Err(TlvError::InvalidNonNegativeInteger(n)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_number_boundaries() {
        let cases: [(u64, &[u8]); 5] = [
            (0, &[0x00]),
            (252, &[0xFC]),
            (253, &[0xFD, 0x00, 0xFD]),
            (0x1_0000, &[0xFE, 0x00, 0x01, 0x00, 0x00]),
            (0x1_0000_0000, &[0xFF, 0, 0, 0, 0x01, 0, 0, 0, 0]),
        ];
        for (value, wire) in cases {
            let mut out = Vec::new();
            write_var_number(value, &mut out);
            assert_eq!(out, wire, "encoding {}", value);
            assert_eq!(var_number_len(value), wire.len());
            assert_eq!(read_var_number(wire).unwrap(), (value, wire.len()));
        }
    }

    #[test]
    fn test_read_var_number_truncated() {
        assert_eq!(
            read_var_number(&[]),
            Err(TlvError::Truncated {
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(
            read_var_number(&[0xFE, 0x00, 0x01]),
            Err(TlvError::Truncated {
                expected: 5,
                actual: 3
            })
        );
    }

    #[test]
    fn test_non_negative_integer_shortest_form() {
        assert_eq!(encode_non_negative_integer(4), vec![4]);
        assert_eq!(encode_non_negative_integer(300), vec![0x01, 0x2C]);
        assert_eq!(encode_non_negative_integer(70_000).len(), 4);
        assert_eq!(encode_non_negative_integer(u64::MAX).len(), 8);
    }

    #[test]
    fn test_decode_non_negative_integer() {
        assert_eq!(decode_non_negative_integer(&[0x80]).unwrap(), 128);
        assert_eq!(decode_non_negative_integer(&[0x00, 0x00, 0x0F, 0xA0]).unwrap(), 4000);
        assert_eq!(
            decode_non_negative_integer(&[0x01, 0x02, 0x03]),
            Err(TlvError::InvalidNonNegativeInteger(3))
        );
        assert_eq!(
            decode_non_negative_integer(&[]),
            Err(TlvError::InvalidNonNegativeInteger(0))
        );
    }
}
