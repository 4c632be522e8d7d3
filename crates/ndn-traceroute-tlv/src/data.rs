//! Data packet encoding, decoding and DigestSha256 signing.

use crate::signature::sha256;
use crate::{types, Block, Name, SignatureInfo, TlvError, TlvResult};
use std::time::Duration;

/// An NDN Data packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Data {
    pub name: Name,
    pub content_type: Option<u64>,
    pub freshness_period: Option<Duration>,
    /// Value of the Content element.
    pub content: Vec<u8>,
    pub signature_info: SignatureInfo,
    pub signature_value: Vec<u8>,
}

impl Data {
    /// Creates an unsigned Data; call [`Data::sign_digest_sha256`] before sending.
    pub fn new(name: Name, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name,
            content_type: None,
            freshness_period: None,
            content: content.into(),
            signature_info: SignatureInfo::digest_sha256(),
            signature_value: Vec::new(),
        }
    }

    pub fn with_freshness_period(mut self, period: Duration) -> Self {
        self.freshness_period = Some(period);
        self
    }

    fn meta_info(&self) -> Option<Block> {
        let mut elements = Vec::new();
        if let Some(content_type) = self.content_type {
            elements.push(Block::from_non_negative_integer(
                types::CONTENT_TYPE,
                content_type,
            ));
        }
        if let Some(period) = self.freshness_period {
            elements.push(Block::from_non_negative_integer(
                types::FRESHNESS_PERIOD,
                period.as_millis() as u64,
            ));
        }
        (!elements.is_empty()).then(|| Block::nested(types::META_INFO, &elements))
    }

    /// Elements covered by the signature: Name, MetaInfo, Content, SignatureInfo.
    fn signed_elements(&self) -> Vec<Block> {
        let mut elements = vec![self.name.to_block()];
        elements.extend(self.meta_info());
        elements.push(Block::new(types::CONTENT, self.content.clone()));
        elements.push(self.signature_info.to_block(types::SIGNATURE_INFO));
        elements
    }

    fn signed_digest(&self) -> [u8; 32] {
        let mut signed = Vec::new();
        for element in self.signed_elements() {
            element.encode_into(&mut signed);
        }
        sha256(&[&signed])
    }

    /// Signs with DigestSha256, replacing any previous signature.
    pub fn sign_digest_sha256(&mut self) {
        self.signature_info = SignatureInfo::digest_sha256();
        self.signature_value = self.signed_digest().to_vec();
    }

    /// Returns true if the packet carries an intact DigestSha256 signature.
    ///
    /// Other signature types return false; they need a key to check.
    pub fn verify_digest_sha256(&self) -> bool {
        self.signature_info.is_digest_sha256() && self.signature_value == self.signed_digest()
    }

    pub fn to_block(&self) -> Block {
        let mut elements = self.signed_elements();
        elements.push(Block::new(
            types::SIGNATURE_VALUE,
            self.signature_value.clone(),
        ));
        Block::nested(types::DATA, &elements)
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_block().to_wire()
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::DATA)?;
        let mut elements = block.elements()?.into_iter();
        let name = match elements.next() {
            Some(b) => Name::from_block(&b)?,
            None => return Err(TlvError::MissingElement("Name")),
        };

        let mut data = Data::new(name, Vec::new());
        let mut signature_info = None;
        let mut signature_value = None;
        for element in elements {
            match element.typ() {
                types::META_INFO => {
                    for field in element.elements()? {
                        match field.typ() {
                            types::CONTENT_TYPE => {
                                data.content_type = Some(field.as_non_negative_integer()?)
                            }
                            types::FRESHNESS_PERIOD => {
                                data.freshness_period =
                                    Some(Duration::from_millis(field.as_non_negative_integer()?))
                            }
                            _ => {}
                        }
                    }
                }
                types::CONTENT => data.content = element.into_value(),
                types::SIGNATURE_INFO => {
                    signature_info = Some(SignatureInfo::from_block(&element)?)
                }
                types::SIGNATURE_VALUE => signature_value = Some(element.into_value()),
                typ if types::is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ)),
                _ => {}
            }
        }

        data.signature_info = signature_info.ok_or(TlvError::MissingElement("SignatureInfo"))?;
        data.signature_value =
            signature_value.ok_or(TlvError::MissingElement("SignatureValue"))?;
        Ok(data)
    }

    pub fn decode(buf: &[u8]) -> TlvResult<Self> {
        Self::from_block(&Block::from_wire(buf)?)
    }
}
