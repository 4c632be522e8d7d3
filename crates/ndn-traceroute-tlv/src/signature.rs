//! Signature metadata and DigestSha256 helpers.

use crate::{types, Block, Name, TlvError, TlvResult};
use sha2::{Digest, Sha256};

/// SignatureInfo or InterestSignatureInfo contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub signature_type: u64,
    /// KeyLocator, when it carries a key name.
    pub key_locator: Option<Name>,
    /// SignatureNonce (Interest signatures only).
    pub nonce: Option<Vec<u8>>,
    /// SignatureTime in milliseconds since the Unix epoch (Interest signatures only).
    pub time: Option<u64>,
}

impl SignatureInfo {
    /// DigestSha256 with no KeyLocator.
    pub fn digest_sha256() -> Self {
        Self {
            signature_type: types::DIGEST_SHA256,
            key_locator: None,
            nonce: None,
            time: None,
        }
    }

    pub fn with_key_locator(mut self, key_name: Name) -> Self {
        self.key_locator = Some(key_name);
        self
    }

    /// Adds the replay-protection fields required on command Interests.
    pub fn with_nonce_and_time(mut self, nonce: Vec<u8>, time_ms: u64) -> Self {
        self.nonce = Some(nonce);
        self.time = Some(time_ms);
        self
    }

    /// Encodes as a block of type `typ` (SignatureInfo or InterestSignatureInfo).
    pub fn to_block(&self, typ: u64) -> Block {
        let mut elements = vec![Block::from_non_negative_integer(
            types::SIGNATURE_TYPE,
            self.signature_type,
        )];
        if let Some(key_name) = &self.key_locator {
            elements.push(Block::nested(types::KEY_LOCATOR, &[key_name.to_block()]));
        }
        if let Some(nonce) = &self.nonce {
            elements.push(Block::new(types::SIGNATURE_NONCE, nonce.clone()));
        }
        if let Some(time) = self.time {
            elements.push(Block::from_non_negative_integer(types::SIGNATURE_TIME, time));
        }
        Block::nested(typ, &elements)
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        let mut elements = block.elements()?.into_iter();
        let signature_type = match elements.next() {
            Some(b) if b.typ() == types::SIGNATURE_TYPE => b.as_non_negative_integer()?,
            Some(b) => {
                return Err(TlvError::UnexpectedType {
                    expected: types::SIGNATURE_TYPE,
                    actual: b.typ(),
                })
            }
            None => return Err(TlvError::MissingElement("SignatureType")),
        };

        let mut info = Self {
            signature_type,
            key_locator: None,
            nonce: None,
            time: None,
        };
        for element in elements {
            match element.typ() {
                types::KEY_LOCATOR => {
                    // A KeyDigest locator carries no name and is left unset.
                    info.key_locator = element
                        .elements()?
                        .iter()
                        .find(|b| b.typ() == types::NAME)
                        .map(Name::from_block)
                        .transpose()?;
                }
                types::SIGNATURE_NONCE => info.nonce = Some(element.value().to_vec()),
                types::SIGNATURE_TIME => info.time = Some(element.as_non_negative_integer()?),
                types::SIGNATURE_SEQ_NUM => {}
                typ if types::is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ)),
                _ => {}
            }
        }
        Ok(info)
    }

    pub fn is_digest_sha256(&self) -> bool {
        self.signature_type == types::DIGEST_SHA256
    }
}

/// SHA-256 over the concatenation of `parts`.
pub fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}
