//! Interest packet encoding and decoding.

use crate::signature::sha256;
use crate::{types, Block, Component, Data, Name, SignatureInfo, TlvError, TlvResult};
use std::time::Duration;

/// InterestLifetime assumed when the field is absent.
pub const DEFAULT_INTEREST_LIFETIME: Duration = Duration::from_millis(4000);

/// An NDN Interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    /// Interest name. When parameters are present the encoder maintains the
    /// trailing ParametersSha256DigestComponent.
    pub name: Name,
    pub can_be_prefix: bool,
    pub must_be_fresh: bool,
    pub nonce: Option<u32>,
    pub lifetime: Option<Duration>,
    pub hop_limit: Option<u8>,
    pub application_parameters: Option<Vec<u8>>,
    pub signature_info: Option<SignatureInfo>,
    pub signature_value: Option<Vec<u8>>,
}

impl Interest {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            can_be_prefix: false,
            must_be_fresh: false,
            nonce: None,
            lifetime: None,
            hop_limit: None,
            application_parameters: None,
            signature_info: None,
            signature_value: None,
        }
    }

    /// Returns the lifetime, falling back to [`DEFAULT_INTEREST_LIFETIME`].
    pub fn lifetime_or_default(&self) -> Duration {
        self.lifetime.unwrap_or(DEFAULT_INTEREST_LIFETIME)
    }

    /// Returns true if `data` satisfies this Interest by name.
    pub fn matches_data(&self, data: &Data) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }

    /// Signs the Interest with DigestSha256 using the v0.3 signed Interest format.
    ///
    /// Adds empty ApplicationParameters when none are set and recomputes the
    /// ParametersSha256DigestComponent.
    pub fn sign_digest_sha256(&mut self, info: SignatureInfo) {
        let parameters = self.application_parameters.get_or_insert_with(Vec::new).clone();
        let info = SignatureInfo {
            signature_type: types::DIGEST_SHA256,
            ..info
        };

        let mut signed = Vec::new();
        for component in self.name.without_parameters_digest().components() {
            component.to_block().encode_into(&mut signed);
        }
        Block::new(types::APPLICATION_PARAMETERS, parameters).encode_into(&mut signed);
        info.to_block(types::INTEREST_SIGNATURE_INFO)
            .encode_into(&mut signed);

        self.signature_info = Some(info);
        self.signature_value = Some(sha256(&[&signed]).to_vec());
        self.name = self.wire_name();
    }

    /// Returns true if the Interest carries a DigestSha256 signature matching its contents.
    pub fn verify_digest_sha256(&self) -> bool {
        let (Some(info), Some(value)) = (&self.signature_info, &self.signature_value) else {
            return false;
        };
        let mut unsigned = self.clone();
        unsigned.sign_digest_sha256(info.clone());
        info.is_digest_sha256() && unsigned.signature_value.as_deref() == Some(value.as_slice())
    }

    fn parameters_elements(&self) -> Vec<Block> {
        let Some(parameters) = &self.application_parameters else {
            return Vec::new();
        };
        let mut elements = vec![Block::new(
            types::APPLICATION_PARAMETERS,
            parameters.clone(),
        )];
        if let Some(info) = &self.signature_info {
            elements.push(info.to_block(types::INTEREST_SIGNATURE_INFO));
        }
        if let Some(value) = &self.signature_value {
            elements.push(Block::new(types::INTEREST_SIGNATURE_VALUE, value.clone()));
        }
        elements
    }

    /// The name as it goes on the wire, with the parameters digest when needed.
    fn wire_name(&self) -> Name {
        let base = self.name.without_parameters_digest();
        let elements = self.parameters_elements();
        if elements.is_empty() {
            return base;
        }
        let wires: Vec<Vec<u8>> = elements.iter().map(Block::to_wire).collect();
        let parts: Vec<&[u8]> = wires.iter().map(Vec::as_slice).collect();
        base.append(Component::parameters_digest(sha256(&parts)))
    }

    pub fn to_block(&self) -> Block {
        let mut elements = vec![self.wire_name().to_block()];
        if self.can_be_prefix {
            elements.push(Block::empty(types::CAN_BE_PREFIX));
        }
        if self.must_be_fresh {
            elements.push(Block::empty(types::MUST_BE_FRESH));
        }
        if let Some(nonce) = self.nonce {
            elements.push(Block::new(types::NONCE, nonce.to_be_bytes().to_vec()));
        }
        if let Some(lifetime) = self.lifetime {
            elements.push(Block::from_non_negative_integer(
                types::INTEREST_LIFETIME,
                lifetime.as_millis() as u64,
            ));
        }
        if let Some(hop_limit) = self.hop_limit {
            elements.push(Block::new(types::HOP_LIMIT, vec![hop_limit]));
        }
        elements.extend(self.parameters_elements());
        Block::nested(types::INTEREST, &elements)
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_block().to_wire()
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::INTEREST)?;
        let mut elements = block.elements()?.into_iter();
        let name = match elements.next() {
            Some(b) => Name::from_block(&b)?,
            None => return Err(TlvError::MissingElement("Name")),
        };

        let mut interest = Interest::new(name);
        for element in elements {
            match element.typ() {
                types::CAN_BE_PREFIX => interest.can_be_prefix = true,
                types::MUST_BE_FRESH => interest.must_be_fresh = true,
                types::FORWARDING_HINT => {}
                types::NONCE => {
                    let bytes: [u8; 4] =
                        element
                            .value()
                            .try_into()
                            .map_err(|_| TlvError::InvalidLength {
                                field: "Nonce",
                                len: element.value().len(),
                            })?;
                    interest.nonce = Some(u32::from_be_bytes(bytes));
                }
                types::INTEREST_LIFETIME => {
                    interest.lifetime =
                        Some(Duration::from_millis(element.as_non_negative_integer()?));
                }
                types::HOP_LIMIT => match element.value() {
                    [hop_limit] => interest.hop_limit = Some(*hop_limit),
                    value => {
                        return Err(TlvError::InvalidLength {
                            field: "HopLimit",
                            len: value.len(),
                        })
                    }
                },
                types::APPLICATION_PARAMETERS => {
                    interest.application_parameters = Some(element.into_value());
                }
                types::INTEREST_SIGNATURE_INFO => {
                    interest.signature_info = Some(SignatureInfo::from_block(&element)?);
                }
                types::INTEREST_SIGNATURE_VALUE => {
                    interest.signature_value = Some(element.into_value());
                }
                typ if types::is_critical(typ) => return Err(TlvError::UnrecognizedCritical(typ)),
                _ => {}
            }
        }
        Ok(interest)
    }

    pub fn decode(buf: &[u8]) -> TlvResult<Self> {
        Self::from_block(&Block::from_wire(buf)?)
    }
}
