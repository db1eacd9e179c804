//! Wallet connection state and key import
//!
//! Two concerns live here. `WalletSession` is the connection-provider
//! surface: it tracks the active account address and an epoch that bumps on
//! every connect/disconnect, so in-flight build/submit/resolve work bound to
//! a previous account can detect it went stale. `WalletKey` imports an
//! ed25519 identity from the `suiprivkey` bech32 encoding (or the legacy
//! base64 form) and derives the account address.
//!
//! Hard rule: key material is never logged, never persisted, and never
//! echoed in error messages. `Debug` output is redacted.

use crate::types::SuiAddress;
use base64::Engine;
use bech32::FromBase32;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ed25519_dalek::SigningKey;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

/// Human-readable part of the private key encoding.
const PRIVKEY_HRP: &str = "suiprivkey";

/// Signature scheme flag prepended to key and address material.
const SCHEME_ED25519: u8 = 0x00;

/// Errors from key import. Messages describe the problem without ever
/// including the offending input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Invalid private key encoding: {0}")]
    InvalidEncoding(String),

    #[error("Unsupported signature scheme flag: {0}")]
    UnsupportedScheme(u8),

    #[error("Invalid key length: expected 32 or 33 bytes, got {0}")]
    InvalidLength(usize),

    #[error("Invalid key: all-zero key rejected")]
    AllZeroKey,
}

/// An imported signing identity
pub struct WalletKey {
    signing_key: SigningKey,
    address: SuiAddress,
}

impl WalletKey {
    /// Import from the `suiprivkey...` bech32 encoding: a scheme flag byte
    /// followed by the 32-byte seed.
    pub fn from_bech32(encoded: &str) -> Result<Self, WalletError> {
        let (hrp, data, _variant) = bech32::decode(encoded.trim())
            .map_err(|e| WalletError::InvalidEncoding(e.to_string()))?;
        if hrp != PRIVKEY_HRP {
            return Err(WalletError::InvalidEncoding(format!(
                "unexpected prefix '{}'",
                hrp
            )));
        }

        let mut bytes = Vec::<u8>::from_base32(&data)
            .map_err(|e| WalletError::InvalidEncoding(e.to_string()))?;
        let key = Self::from_flagged_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Import from the legacy base64 encoding: either the bare 32-byte seed
    /// or flag + seed.
    pub fn from_base64(encoded: &str) -> Result<Self, WalletError> {
        let mut bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| WalletError::InvalidEncoding(e.to_string()))?;
        let key = match bytes.len() {
            32 => Self::from_seed(&bytes),
            33 => Self::from_flagged_bytes(&bytes),
            other => Err(WalletError::InvalidLength(other)),
        };
        bytes.zeroize();
        key
    }

    fn from_flagged_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.len() != 33 {
            return Err(WalletError::InvalidLength(bytes.len()));
        }
        if bytes[0] != SCHEME_ED25519 {
            return Err(WalletError::UnsupportedScheme(bytes[0]));
        }
        Self::from_seed(&bytes[1..])
    }

    fn from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() != 32 {
            return Err(WalletError::InvalidLength(seed.len()));
        }
        if seed.iter().all(|&b| b == 0) {
            return Err(WalletError::AllZeroKey);
        }

        let mut seed_bytes = [0u8; 32];
        seed_bytes.copy_from_slice(seed);
        let signing_key = SigningKey::from_bytes(&seed_bytes);
        seed_bytes.zeroize();

        let address = derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The account address derived from this key.
    pub fn address(&self) -> &SuiAddress {
        &self.address
    }

    /// Whether the derived address matches an expected one. The original
    /// flow warns on mismatch instead of failing; callers decide.
    pub fn matches(&self, expected: &SuiAddress) -> bool {
        &self.address == expected
    }

    /// Access the signing key for delegation to a signer collaborator.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKey")
            .field("address", &self.address)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// Account address: blake2b-256 over scheme flag + public key bytes.
fn derive_address(signing_key: &SigningKey) -> SuiAddress {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update([SCHEME_ED25519]);
    hasher.update(signing_key.verifying_key().as_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    SuiAddress::from_bytes(&bytes)
}

/// Connection-provider state: the active account plus an epoch that
/// invalidates in-flight work when the connection changes.
#[derive(Debug, Default)]
pub struct WalletSession {
    active: Option<SuiAddress>,
    epoch: u64,
}

/// A snapshot tying in-flight work to the session state it started under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    address: SuiAddress,
    epoch: u64,
}

impl SessionBinding {
    pub fn address(&self) -> &SuiAddress {
        &self.address
    }
}

impl WalletSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new active account. Any previous bindings go stale.
    pub fn connect(&mut self, address: SuiAddress) -> SessionBinding {
        self.epoch += 1;
        self.active = Some(address.clone());
        tracing::info!(address = %address, epoch = self.epoch, "Wallet connected");
        SessionBinding {
            address,
            epoch: self.epoch,
        }
    }

    /// Drop the active account. Any previous bindings go stale.
    pub fn disconnect(&mut self) {
        self.epoch += 1;
        if let Some(address) = self.active.take() {
            tracing::info!(address = %address, "Wallet disconnected");
        }
    }

    pub fn active(&self) -> Option<&SuiAddress> {
        self.active.as_ref()
    }

    /// Binding for the current connection, if any.
    pub fn binding(&self) -> Option<SessionBinding> {
        self.active.as_ref().map(|address| SessionBinding {
            address: address.clone(),
            epoch: self.epoch,
        })
    }

    /// Whether a binding still refers to the live connection.
    pub fn is_current(&self, binding: &SessionBinding) -> bool {
        binding.epoch == self.epoch && Some(&binding.address) == self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::ToBase32;

    fn encode_key(flag: u8, seed: &[u8; 32]) -> String {
        let mut payload = Vec::with_capacity(33);
        payload.push(flag);
        payload.extend_from_slice(seed);
        bech32::encode(PRIVKEY_HRP, payload.to_base32(), bech32::Variant::Bech32).unwrap()
    }

    fn test_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        seed
    }

    #[test]
    fn test_bech32_import_derives_stable_address() {
        let encoded = encode_key(SCHEME_ED25519, &test_seed());
        let key = WalletKey::from_bech32(&encoded).unwrap();

        assert_eq!(key.address().as_str().len(), 66);
        assert!(key.address().as_str().starts_with("0x"));

        // Same seed, same address
        let again = WalletKey::from_bech32(&encoded).unwrap();
        assert!(key.matches(again.address()));
    }

    #[test]
    fn test_bech32_rejects_wrong_prefix() {
        let payload = {
            let mut v = vec![SCHEME_ED25519];
            v.extend_from_slice(&test_seed());
            v
        };
        let wrong =
            bech32::encode("otherkey", payload.to_base32(), bech32::Variant::Bech32).unwrap();
        let err = WalletKey::from_bech32(&wrong).unwrap_err();
        assert!(matches!(err, WalletError::InvalidEncoding(_)));
    }

    #[test]
    fn test_bech32_rejects_unknown_scheme() {
        let encoded = encode_key(0x03, &test_seed());
        let err = WalletKey::from_bech32(&encoded).unwrap_err();
        assert_eq!(err, WalletError::UnsupportedScheme(0x03));
    }

    #[test]
    fn test_all_zero_key_rejected() {
        let encoded = encode_key(SCHEME_ED25519, &[0u8; 32]);
        assert_eq!(
            WalletKey::from_bech32(&encoded).unwrap_err(),
            WalletError::AllZeroKey
        );
    }

    #[test]
    fn test_base64_import_both_lengths() {
        let seed = test_seed();
        let engine = &base64::engine::general_purpose::STANDARD;

        let bare = engine.encode(seed);
        let key_bare = WalletKey::from_base64(&bare).unwrap();

        let mut flagged = vec![SCHEME_ED25519];
        flagged.extend_from_slice(&seed);
        let key_flagged = WalletKey::from_base64(&engine.encode(flagged)).unwrap();

        assert_eq!(key_bare.address(), key_flagged.address());

        let err = WalletKey::from_base64(&engine.encode([1u8; 16])).unwrap_err();
        assert_eq!(err, WalletError::InvalidLength(16));
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let encoded = encode_key(SCHEME_ED25519, &test_seed());
        let key = WalletKey::from_bech32(&encoded).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&encoded));
    }

    #[test]
    fn test_session_epoch_invalidates_bindings() {
        let addr_a = SuiAddress::parse(&format!("0x{}", "a".repeat(64))).unwrap();
        let addr_b = SuiAddress::parse(&format!("0x{}", "b".repeat(64))).unwrap();

        let mut session = WalletSession::new();
        assert!(session.binding().is_none());

        let binding_a = session.connect(addr_a.clone());
        assert!(session.is_current(&binding_a));
        assert_eq!(session.active(), Some(&addr_a));

        // Switching accounts invalidates the old binding
        let binding_b = session.connect(addr_b);
        assert!(!session.is_current(&binding_a));
        assert!(session.is_current(&binding_b));

        session.disconnect();
        assert!(!session.is_current(&binding_b));
        assert!(session.active().is_none());
    }
}
