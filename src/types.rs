//! Common types used throughout the application

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing chain identifiers
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Invalid digest: {0}")]
    Digest(String),

    #[error("Unknown network: {0}")]
    Network(String),
}

/// A Sui address: `0x` followed by 64 lowercase hex characters (66 total).
///
/// Object ids and package ids share this format. Short framework forms like
/// `0x2` are accepted on input and zero-padded to the canonical width, so
/// `Display` always produces the full 66-character form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuiAddress(String);

/// Object ids use the same canonical format as addresses.
pub type ObjectId = SuiAddress;

impl SuiAddress {
    pub const HEX_LEN: usize = 64;

    /// Parse and normalize an address string.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let hex_part = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| IdentifierError::Address(format!("missing 0x prefix: {}", s)))?;

        if hex_part.is_empty() || hex_part.len() > Self::HEX_LEN {
            return Err(IdentifierError::Address(format!(
                "expected 1..={} hex chars, got {}",
                Self::HEX_LEN,
                hex_part.len()
            )));
        }

        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentifierError::Address(format!(
                "non-hex character in address: {}",
                s
            )));
        }

        let mut normalized = String::with_capacity(2 + Self::HEX_LEN);
        normalized.push_str("0x");
        for _ in 0..(Self::HEX_LEN - hex_part.len()) {
            normalized.push('0');
        }
        normalized.push_str(&hex_part.to_ascii_lowercase());

        Ok(Self(normalized))
    }

    /// The canonical 66-character string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw 32 bytes of the address.
    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        // Canonical form is always valid hex of the right length.
        hex::decode_to_slice(&self.0[2..], &mut out).expect("canonical address is valid hex");
        out
    }

    /// Build an address from raw bytes (e.g. a derived account identity).
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(format!("0x{}", hex::encode(bytes)))
    }
}

impl FromStr for SuiAddress {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SuiAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(D::Error::custom)
    }
}

/// Opaque transaction digest, surfaced verbatim.
///
/// The digest is the only stable handle for re-querying a transaction's
/// effects, so it is never re-encoded or case-folded. Strict base58 shape
/// checks for untrusted input live in [`crate::security`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TxDigest(String);

impl TxDigest {
    pub fn new(s: impl Into<String>) -> Result<Self, IdentifierError> {
        let s = s.into();
        if s.is_empty() {
            return Err(IdentifierError::Digest("empty digest".to_string()));
        }
        if s.chars().any(|c| c.is_whitespace()) {
            return Err(IdentifierError::Digest(format!(
                "digest contains whitespace: {:?}",
                s
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxDigest {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for TxDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for TxDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(D::Error::custom)
    }
}

/// Ownership tag of an on-chain object.
///
/// The fullnode encodes this either as a bare string (`"Immutable"`,
/// `"Shared"`) or as a single-key object (`{"AddressOwner": "0x.."}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    AddressOwner(SuiAddress),
    ObjectOwner(SuiAddress),
    Shared,
    Immutable,
}

impl Ownership {
    pub fn is_immutable(&self) -> bool {
        matches!(self, Ownership::Immutable)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OwnershipRepr {
    Literal(String),
    AddressOwner {
        #[serde(rename = "AddressOwner")]
        owner: SuiAddress,
    },
    ObjectOwner {
        #[serde(rename = "ObjectOwner")]
        owner: SuiAddress,
    },
    Shared {
        #[serde(rename = "Shared")]
        shared: serde_json::Value,
    },
}

impl Serialize for Ownership {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            Ownership::Immutable => OwnershipRepr::Literal("Immutable".to_string()),
            Ownership::Shared => OwnershipRepr::Literal("Shared".to_string()),
            Ownership::AddressOwner(a) => OwnershipRepr::AddressOwner { owner: a.clone() },
            Ownership::ObjectOwner(a) => OwnershipRepr::ObjectOwner { owner: a.clone() },
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ownership {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OwnershipRepr::deserialize(deserializer)? {
            OwnershipRepr::Literal(s) => match s.as_str() {
                "Immutable" => Ok(Ownership::Immutable),
                "Shared" => Ok(Ownership::Shared),
                other => Err(D::Error::custom(format!("unknown ownership tag: {}", other))),
            },
            OwnershipRepr::AddressOwner { owner } => Ok(Ownership::AddressOwner(owner)),
            OwnershipRepr::ObjectOwner { owner } => Ok(Ownership::ObjectOwner(owner)),
            OwnershipRepr::Shared { .. } => Ok(Ownership::Shared),
        }
    }
}

/// Wire reference to an object inside effects (`effects.created[].reference`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRefWire {
    pub object_id: SuiAddress,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// A created-object record from transaction effects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedObject {
    pub owner: Ownership,
    pub reference: ObjectRefWire,
}

impl CreatedObject {
    pub fn object_id(&self) -> &ObjectId {
        &self.reference.object_id
    }
}

/// An event emitted by a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Fully qualified event type, e.g. `0x..::basic_nft::MintEvent`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Parsed event payload as reported by the node.
    #[serde(rename = "parsedJson", default)]
    pub fields: serde_json::Value,
}

/// Execution outcome recorded in effects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failure {
        #[serde(default)]
        error: Option<String>,
    },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

/// Normalized record of a transaction's recorded outcome.
///
/// Produced from the fullnode's transaction block response; this is the input
/// the resolver's fallback strategies scan. `published` holds package ids
/// from object changes tagged `"published"`, `created` comes from
/// `effects.created`, and `events` carries the emitted event list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub digest: TxDigest,
    pub status: ExecutionStatus,

    #[serde(default)]
    pub created: Vec<CreatedObject>,

    #[serde(default)]
    pub published: Vec<ObjectId>,

    #[serde(default)]
    pub events: Vec<EventRecord>,
}

impl TransactionRecord {
    /// An empty-but-successful record for a digest (effects not yet visible).
    pub fn empty(digest: TxDigest) -> Self {
        Self {
            digest,
            status: ExecutionStatus::Success,
            created: Vec::new(),
            published: Vec::new(),
            events: Vec::new(),
        }
    }
}

/// Target network for submission and queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Devnet,
    Testnet,
    Mainnet,
}

impl NetworkId {
    /// Default fullnode JSON-RPC URL for the network.
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            NetworkId::Devnet => "https://fullnode.devnet.sui.io:443",
            NetworkId::Testnet => "https://fullnode.testnet.sui.io:443",
            NetworkId::Mainnet => "https://fullnode.mainnet.sui.io:443",
        }
    }

    /// Explorer base; the digest is appended verbatim.
    pub fn explorer_base(&self) -> &'static str {
        match self {
            NetworkId::Devnet => "https://suiscan.xyz/devnet/tx",
            NetworkId::Testnet => "https://suiscan.xyz/testnet/tx",
            NetworkId::Mainnet => "https://suiscan.xyz/mainnet/tx",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkId::Devnet => "devnet",
            NetworkId::Testnet => "testnet",
            NetworkId::Mainnet => "mainnet",
        }
    }
}

impl FromStr for NetworkId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Ok(NetworkId::Devnet),
            "testnet" => Ok(NetworkId::Testnet),
            "mainnet" => Ok(NetworkId::Mainnet),
            other => Err(IdentifierError::Network(other.to_string())),
        }
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
