//! TLV type numbers from the NDN packet format v0.3, NDNLPv2 and the NFD
//! management protocol.

// Packet types
pub const INTEREST: u64 = 0x05;
pub const DATA: u64 = 0x06;

// Name
pub const NAME: u64 = 0x07;
pub const IMPLICIT_SHA256_DIGEST_COMPONENT: u64 = 0x01;
pub const PARAMETERS_SHA256_DIGEST_COMPONENT: u64 = 0x02;
pub const GENERIC_NAME_COMPONENT: u64 = 0x08;

// Interest
pub const CAN_BE_PREFIX: u64 = 0x21;
pub const MUST_BE_FRESH: u64 = 0x12;
pub const FORWARDING_HINT: u64 = 0x1e;
pub const NONCE: u64 = 0x0a;
pub const INTEREST_LIFETIME: u64 = 0x0c;
pub const HOP_LIMIT: u64 = 0x22;
pub const APPLICATION_PARAMETERS: u64 = 0x24;
pub const INTEREST_SIGNATURE_INFO: u64 = 0x2c;
pub const INTEREST_SIGNATURE_VALUE: u64 = 0x2e;

// Data
pub const META_INFO: u64 = 0x14;
pub const CONTENT_TYPE: u64 = 0x18;
pub const FRESHNESS_PERIOD: u64 = 0x19;
pub const FINAL_BLOCK_ID: u64 = 0x1a;
pub const CONTENT: u64 = 0x15;
pub const SIGNATURE_INFO: u64 = 0x16;
pub const SIGNATURE_VALUE: u64 = 0x17;

// Signature
pub const SIGNATURE_TYPE: u64 = 0x1b;
pub const KEY_LOCATOR: u64 = 0x1c;
pub const KEY_DIGEST: u64 = 0x1d;
pub const SIGNATURE_NONCE: u64 = 0x26;
pub const SIGNATURE_TIME: u64 = 0x28;
pub const SIGNATURE_SEQ_NUM: u64 = 0x2a;

/// SignatureType value for DigestSha256.
pub const DIGEST_SHA256: u64 = 0;

// NDNLPv2
pub const LP_PACKET: u64 = 0x64;
pub const LP_FRAGMENT: u64 = 0x50;
pub const LP_SEQUENCE: u64 = 0x51;
pub const LP_FRAG_INDEX: u64 = 0x52;
pub const LP_FRAG_COUNT: u64 = 0x53;
pub const LP_NACK: u64 = 0x0320;
pub const LP_NACK_REASON: u64 = 0x0321;

/// First and last TLV types of the NDNLPv2 header field range.
pub const LP_HEADER_FIELD_FIRST: u64 = 800;
pub const LP_HEADER_FIELD_LAST: u64 = 959;

// NFD management
pub const CONTROL_PARAMETERS: u64 = 0x68;
pub const FACE_ID: u64 = 0x69;
pub const COST: u64 = 0x6a;
pub const FLAGS: u64 = 0x6c;
pub const EXPIRATION_PERIOD: u64 = 0x6d;
pub const ORIGIN: u64 = 0x6f;
pub const CONTROL_RESPONSE: u64 = 0x65;
pub const STATUS_CODE: u64 = 0x66;
pub const STATUS_TEXT: u64 = 0x67;

/// Returns true if an unrecognized element of this type must cause a decode failure.
///
/// Types 0 to 31 are always critical; above that, odd types are critical.
pub fn is_critical(typ: u64) -> bool {
    typ <= 31 || typ % 2 == 1
}

/// Returns true if an unrecognized NDNLPv2 header field of this type can be skipped.
pub fn is_lp_ignorable(typ: u64) -> bool {
    (LP_HEADER_FIELD_FIRST..=LP_HEADER_FIELD_LAST).contains(&typ) && typ & 0x03 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_critical() {
        assert!(is_critical(NAME));
        assert!(is_critical(INTEREST_LIFETIME));
        assert!(is_critical(33));
        assert!(!is_critical(HOP_LIMIT));
        assert!(!is_critical(128));
    }

    #[test]
    fn test_is_lp_ignorable() {
        assert!(is_lp_ignorable(0x0340));
        assert!(!is_lp_ignorable(0x0321));
        assert!(!is_lp_ignorable(LP_FRAGMENT));
    }
}
