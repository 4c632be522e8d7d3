//! NFD management commands.
//!
//! Only prefix registration is needed: the responder registers its prefix
//! with the local RIB through a signed command Interest.

use ndn_traceroute_tlv::{
    types, Block, Component, Interest, Name, SignatureInfo, TlvError, TlvResult,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Command prefix of the RIB `register` verb.
pub const RIB_REGISTER_PREFIX: &str = "/localhost/nfd/rib/register";
/// Lifetime of management command Interests.
pub const COMMAND_LIFETIME: Duration = Duration::from_millis(4000);
/// KeyLocator placed on command signatures.
pub const COMMAND_KEY_NAME: &str = "/localhost/ndn-traceroute/KEY";
/// StatusCode of a successful command.
pub const STATUS_OK: u64 = 200;

/// ControlParameters of a RIB command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlParameters {
    pub name: Option<Name>,
    pub face_id: Option<u64>,
    pub origin: Option<u64>,
    pub cost: Option<u64>,
    pub flags: Option<u64>,
    pub expiration_period: Option<u64>,
}

impl ControlParameters {
    pub fn with_name(name: Name) -> Self {
        Self {
            name: Some(name),
            ..Default::default()
        }
    }

    pub fn to_block(&self) -> Block {
        let mut elements = Vec::new();
        if let Some(name) = &self.name {
            elements.push(name.to_block());
        }
        let numbers = [
            (types::FACE_ID, self.face_id),
            (types::ORIGIN, self.origin),
            (types::COST, self.cost),
            (types::FLAGS, self.flags),
            (types::EXPIRATION_PERIOD, self.expiration_period),
        ];
        for (typ, value) in numbers {
            if let Some(value) = value {
                elements.push(Block::from_non_negative_integer(typ, value));
            }
        }
        Block::nested(types::CONTROL_PARAMETERS, &elements)
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::CONTROL_PARAMETERS)?;
        let mut params = Self::default();
        for element in block.elements()? {
            match element.typ() {
                types::NAME => params.name = Some(Name::from_block(&element)?),
                types::FACE_ID => params.face_id = Some(element.as_non_negative_integer()?),
                types::ORIGIN => params.origin = Some(element.as_non_negative_integer()?),
                types::COST => params.cost = Some(element.as_non_negative_integer()?),
                types::FLAGS => params.flags = Some(element.as_non_negative_integer()?),
                types::EXPIRATION_PERIOD => {
                    params.expiration_period = Some(element.as_non_negative_integer()?)
                }
                // Fields of other managers are not interpreted.
                _ => {}
            }
        }
        Ok(params)
    }
}

/// ControlResponse carried in the Data answering a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlResponse {
    pub status_code: u64,
    pub status_text: String,
    pub body: Option<ControlParameters>,
}

impl ControlResponse {
    pub fn new(status_code: u64, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            body: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    pub fn to_block(&self) -> Block {
        let mut elements = vec![
            Block::from_non_negative_integer(types::STATUS_CODE, self.status_code),
            Block::new(types::STATUS_TEXT, self.status_text.as_bytes().to_vec()),
        ];
        if let Some(body) = &self.body {
            elements.push(body.to_block());
        }
        Block::nested(types::CONTROL_RESPONSE, &elements)
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::CONTROL_RESPONSE)?;
        let elements = block.elements()?;

        let status_code = elements
            .iter()
            .find(|b| b.typ() == types::STATUS_CODE)
            .ok_or(TlvError::MissingElement("StatusCode"))?
            .as_non_negative_integer()?;
        let status_text = elements
            .iter()
            .find(|b| b.typ() == types::STATUS_TEXT)
            .map(|b| String::from_utf8_lossy(b.value()).into_owned())
            .unwrap_or_default();
        let body = elements
            .iter()
            .find(|b| b.typ() == types::CONTROL_PARAMETERS)
            .map(ControlParameters::from_block)
            .transpose()?;

        Ok(Self {
            status_code,
            status_text,
            body,
        })
    }

    /// Decodes the Content of a command reply.
    pub fn from_content(content: &[u8]) -> TlvResult<Self> {
        Self::from_block(&Block::from_wire(content)?)
    }
}

/// Builds the signed command Interest registering `prefix` with the local RIB.
pub fn rib_register_command(prefix: &Name) -> TlvResult<Interest> {
    let command_prefix: Name = RIB_REGISTER_PREFIX.parse()?;
    let key_name: Name = COMMAND_KEY_NAME.parse()?;
    let parameters = ControlParameters::with_name(prefix.clone());

    let mut interest = Interest::new(
        command_prefix.append(Component::generic(parameters.to_block().to_wire())),
    );
    interest.must_be_fresh = true;
    interest.nonce = Some(rand::random());
    interest.lifetime = Some(COMMAND_LIFETIME);

    let time_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let signature_nonce: [u8; 8] = rand::random();
    interest.sign_digest_sha256(
        SignatureInfo::digest_sha256()
            .with_key_locator(key_name)
            .with_nonce_and_time(signature_nonce.to_vec(), time_ms),
    );
    Ok(interest)
}

/// Extracts the ControlParameters from a command Interest name.
pub fn command_parameters(command: &Interest) -> TlvResult<ControlParameters> {
    let prefix_len = RIB_REGISTER_PREFIX.split('/').filter(|s| !s.is_empty()).count();
    let component = command
        .name
        .get(prefix_len)
        .ok_or(TlvError::MissingElement("ControlParameters"))?;
    ControlParameters::from_block(&Block::from_wire(component.value())?)
}
