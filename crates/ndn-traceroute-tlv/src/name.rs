//! NDN names and name components, with NDN URI syntax.

use crate::encoding::{decode_non_negative_integer, encode_non_negative_integer};
use crate::{types, Block, TlvError, TlvResult};
use std::fmt;
use std::str::FromStr;

/// A single name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Component {
    typ: u64,
    value: Vec<u8>,
}

impl Component {
    /// Creates a component of an arbitrary type.
    pub fn new(typ: u64, value: impl Into<Vec<u8>>) -> Self {
        Self {
            typ,
            value: value.into(),
        }
    }

    /// Creates a GenericNameComponent.
    pub fn generic(value: impl Into<Vec<u8>>) -> Self {
        Self::new(types::GENERIC_NAME_COMPONENT, value)
    }

    /// Creates a GenericNameComponent holding `n` as a NonNegativeInteger.
    pub fn number(n: u64) -> Self {
        Self::generic(encode_non_negative_integer(n))
    }

    /// Creates a ParametersSha256DigestComponent.
    pub fn parameters_digest(digest: [u8; 32]) -> Self {
        Self::new(types::PARAMETERS_SHA256_DIGEST_COMPONENT, digest.to_vec())
    }

    pub fn typ(&self) -> u64 {
        self.typ
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Interprets the value as a NonNegativeInteger.
    pub fn to_number(&self) -> TlvResult<u64> {
        decode_non_negative_integer(&self.value)
    }

    pub fn is_parameters_digest(&self) -> bool {
        self.typ == types::PARAMETERS_SHA256_DIGEST_COMPONENT
    }

    pub fn to_block(&self) -> Block {
        Block::new(self.typ, self.value.clone())
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        if block.typ() == 0 || block.typ() > 0xFFFF {
            return Err(TlvError::UnexpectedType {
                expected: types::GENERIC_NAME_COMPONENT,
                actual: block.typ(),
            });
        }
        let digest_type = matches!(
            block.typ(),
            types::IMPLICIT_SHA256_DIGEST_COMPONENT | types::PARAMETERS_SHA256_DIGEST_COMPONENT
        );
        if digest_type && block.value().len() != 32 {
            return Err(TlvError::InvalidLength {
                field: "digest component",
                len: block.value().len(),
            });
        }
        Ok(Self::new(block.typ(), block.value()))
    }
}

impl From<&str> for Component {
    fn from(s: &str) -> Self {
        Self::generic(s.as_bytes())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typ {
            types::GENERIC_NAME_COMPONENT => write_escaped(f, &self.value),
            types::IMPLICIT_SHA256_DIGEST_COMPONENT => {
                write!(f, "sha256digest={}", hex_encode(&self.value))
            }
            types::PARAMETERS_SHA256_DIGEST_COMPONENT => {
                write!(f, "params-sha256={}", hex_encode(&self.value))
            }
            typ => {
                write!(f, "{}=", typ)?;
                write_escaped(f, &self.value)
            }
        }
    }
}

impl FromStr for Component {
    type Err = TlvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TlvError::InvalidUri {
            uri: s.to_string(),
            reason: reason.to_string(),
        };

        let Some((label, rest)) = s.split_once('=') else {
            return Ok(Self::generic(unescape_value(s).ok_or_else(|| {
                invalid("component of one or two periods")
            })?));
        };

        match label {
            "sha256digest" | "params-sha256" => {
                let digest = hex_decode(rest)
                    .filter(|d| d.len() == 32)
                    .ok_or_else(|| invalid("digest must be 64 hex digits"))?;
                let typ = if label == "sha256digest" {
                    types::IMPLICIT_SHA256_DIGEST_COMPONENT
                } else {
                    types::PARAMETERS_SHA256_DIGEST_COMPONENT
                };
                Ok(Self::new(typ, digest))
            }
            _ => {
                let typ: u64 = label
                    .parse()
                    .map_err(|_| invalid("unknown component type label"))?;
                if typ == 0 || typ > 0xFFFF {
                    return Err(invalid("component type out of range"));
                }
                let value = unescape_value(rest)
                    .ok_or_else(|| invalid("component of one or two periods"))?;
                Ok(Self::new(typ, value))
            }
        }
    }
}

/// An NDN name: an ordered sequence of components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    components: Vec<Component>,
}

impl Name {
    /// Creates an empty name (`/`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_components(components: Vec<Component>) -> Self {
        Self { components }
    }

    /// Appends a component, builder style.
    pub fn append(mut self, component: impl Into<Component>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn push(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn last(&self) -> Option<&Component> {
        self.components.last()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns the first `n` components.
    pub fn prefix(&self, n: usize) -> Name {
        Self::from_components(self.components[..n.min(self.len())].to_vec())
    }

    /// Returns true if every component of `self` matches the start of `other`.
    pub fn is_prefix_of(&self, other: &Name) -> bool {
        self.len() <= other.len() && self.components[..] == other.components[..self.len()]
    }

    /// Returns the name without a trailing ParametersSha256DigestComponent.
    pub fn without_parameters_digest(&self) -> Name {
        match self.last() {
            Some(c) if c.is_parameters_digest() => self.prefix(self.len() - 1),
            _ => self.clone(),
        }
    }

    pub fn to_block(&self) -> Block {
        let components: Vec<Block> = self.components.iter().map(Component::to_block).collect();
        Block::nested(types::NAME, &components)
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        self.to_block().encode_into(out);
    }

    pub fn from_block(block: &Block) -> TlvResult<Self> {
        block.expect_type(types::NAME)?;
        let components = block
            .elements()?
            .iter()
            .map(Component::from_block)
            .collect::<TlvResult<Vec<_>>>()?;
        Ok(Self { components })
    }

    pub fn from_wire(buf: &[u8]) -> TlvResult<Self> {
        Self::from_block(&Block::from_wire(buf)?)
    }
}

impl From<Vec<Component>> for Name {
    fn from(components: Vec<Component>) -> Self {
        Self::from_components(components)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for Name {
    type Err = TlvError;

    /// Parses an NDN URI such as `/example/test` or `ndn:/example/test`.
    ///
    /// Query and fragment parts are dropped; an authority after `ndn://` is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut uri = s.trim();
        if let Some(pos) = uri.find(['?', '#']) {
            uri = &uri[..pos];
        }
        if let Some(rest) = uri.strip_prefix("ndn:") {
            uri = rest;
            if let Some(after_authority) = uri.strip_prefix("//") {
                uri = after_authority.find('/').map_or("", |pos| &after_authority[pos..]);
            }
        }

        let components = uri
            .trim_start_matches('/')
            .split('/')
            .filter(|part| !part.is_empty())
            .map(Component::from_str)
            .collect::<TlvResult<Vec<_>>>()?;
        Ok(Self { components })
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, value: &[u8]) -> fmt::Result {
    if value.iter().all(|b| *b == b'.') {
        for _ in 0..value.len() + 3 {
            f.write_str(".")?;
        }
        return Ok(());
    }
    for &b in value {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "%{:02X}", b)?;
        }
    }
    Ok(())
}

/// Percent-decodes a component value; `None` for the reserved `.` and `..` forms.
fn unescape_value(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    let mut value = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let Some(b) = hex_byte(bytes[i + 1], bytes[i + 2]) {
                value.push(b);
                i += 3;
                continue;
            }
        }
        value.push(bytes[i]);
        i += 1;
    }

    if value.iter().all(|b| *b == b'.') {
        if value.len() < 3 {
            return None;
        }
        value.truncate(value.len() - 3);
    }
    Some(value)
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    let digit = |c: u8| (c as char).to_digit(16).map(|d| d as u8);
    Some(digit(hi)? << 4 | digit(lo)?)
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    let bytes = s.as_bytes();
    if bytes.len() % 2 != 0 {
        return None;
    }
    bytes
        .chunks(2)
        .map(|pair| hex_byte(pair[0], pair[1]))
        .collect()
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let name: Name = "/example/test".parse().unwrap();
        assert_eq!(name.len(), 2);
        assert_eq!(name.get(0).unwrap().value(), b"example");
        assert_eq!(name.to_string(), "/example/test");
    }

    #[test]
    fn test_parse_scheme_and_trailing_slash() {
        let name: Name = "ndn:/a/b/".parse().unwrap();
        assert_eq!(name.to_string(), "/a/b");
        let name: Name = "ndn://authority/a".parse().unwrap();
        assert_eq!(name.to_string(), "/a");
        let name: Name = "/a/b?query#fragment".parse().unwrap();
        assert_eq!(name.to_string(), "/a/b");
    }

    #[test]
    fn test_empty_name() {
        let name: Name = "/".parse().unwrap();
        assert!(name.is_empty());
        assert_eq!(name.to_string(), "/");
        assert_eq!(Name::new().to_block().to_wire(), vec![0x07, 0x00]);
    }

    #[test]
    fn test_percent_escaping() {
        let name = Name::new().append(Component::generic(b"a b/c".to_vec()));
        assert_eq!(name.to_string(), "/a%20b%2Fc");
        let parsed: Name = "/a%20b%2Fc".parse().unwrap();
        assert_eq!(parsed, name);
    }

    #[test]
    fn test_period_components() {
        let name = Name::new().append(Component::generic(Vec::new()));
        assert_eq!(name.to_string(), "/...");
        let parsed: Name = "/..../...".parse().unwrap();
        assert_eq!(parsed.get(0).unwrap().value(), b".");
        assert!(parsed.get(1).unwrap().value().is_empty());
        assert!("/a/..".parse::<Name>().is_err());
    }

    #[test]
    fn test_number_component() {
        let component = Component::number(0x0102);
        assert_eq!(component.value(), &[0x01, 0x02]);
        assert_eq!(component.to_number().unwrap(), 0x0102);
        assert_eq!(component.to_string(), "%01%02");
    }

    #[test]
    fn test_typed_components() {
        let digest = [0xABu8; 32];
        let name = Name::new()
            .append("cmd")
            .append(Component::new(32, b"x".to_vec()))
            .append(Component::parameters_digest(digest));
        let uri = name.to_string();
        assert_eq!(uri, format!("/cmd/32=x/params-sha256={}", "ab".repeat(32)));
        assert_eq!(uri.parse::<Name>().unwrap(), name);
        assert_eq!(name.without_parameters_digest().to_string(), "/cmd/32=x");
        assert!("/bad-label=x".parse::<Name>().is_err());
        assert!("/params-sha256=abc".parse::<Name>().is_err());
    }

    #[test]
    fn test_wire_encoding() {
        let name: Name = "/a/bc".parse().unwrap();
        let wire = name.to_block().to_wire();
        assert_eq!(wire, vec![0x07, 0x07, 0x08, 0x01, b'a', 0x08, 0x02, b'b', b'c']);
        assert_eq!(Name::from_wire(&wire).unwrap(), name);
    }

    #[test]
    fn test_from_block_rejects_bad_components() {
        let bad_type = Block::nested(types::NAME, &[Block::new(0, b"x".to_vec())]);
        assert!(Name::from_block(&bad_type).is_err());
        let short_digest = Block::nested(
            types::NAME,
            &[Block::new(types::IMPLICIT_SHA256_DIGEST_COMPONENT, vec![1, 2])],
        );
        assert!(Name::from_block(&short_digest).is_err());
        assert!(Name::from_block(&Block::empty(types::CONTENT)).is_err());
    }

    #[test]
    fn test_prefix_relationships() {
        let prefix: Name = "/example".parse().unwrap();
        let name: Name = "/example/test/traceroute".parse().unwrap();
        assert!(prefix.is_prefix_of(&name));
        assert!(!name.is_prefix_of(&prefix));
        assert!(Name::new().is_prefix_of(&name));
        assert_eq!(name.prefix(2).to_string(), "/example/test");
    }
}
