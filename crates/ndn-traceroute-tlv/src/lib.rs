//! NDN TLV wire codec for ndn-traceroute.
//!
//! Implements the subset of the NDN packet format v0.3 and NDNLPv2 needed to
//! express traceroute probes and answer them:
//!
//! - [`Block`] for generic TLV elements, with VarNumber and
//!   NonNegativeInteger helpers in [`encoding`]
//! - [`Name`] and [`Component`] with NDN URI syntax
//! - [`Interest`], [`Data`] and DigestSha256 signing
//! - [`LpPacket`] and [`NetPacket`] for link-layer framing and Nacks

pub mod block;
pub mod data;
pub mod encoding;
pub mod error;
pub mod interest;
pub mod lp;
pub mod name;
pub mod packet;
pub mod signature;
pub mod types;

pub use block::{parse_elements, Block, MAX_NDN_PACKET_SIZE};
pub use data::Data;
pub use error::{TlvError, TlvResult};
pub use interest::{Interest, DEFAULT_INTEREST_LIFETIME};
pub use lp::{LpPacket, NackReason};
pub use name::{Component, Name};
pub use packet::NetPacket;
pub use signature::SignatureInfo;
