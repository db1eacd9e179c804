//! Security and validation module

use crate::types::{IdentifierError, SuiAddress, TxDigest};

/// Validators for untrusted identifier input
pub mod validator {
    use super::*;
    use once_cell::sync::Lazy;
    use regex::Regex;

    /// Shape of an exported private key string.
    static SUIPRIVKEY_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"suiprivkey[0-9a-z]+").expect("valid regex"));

    /// Parse and normalize an address from untrusted input.
    pub fn validate_address(s: &str) -> anyhow::Result<SuiAddress> {
        SuiAddress::parse(s).map_err(|e| anyhow::anyhow!("Invalid address: {}", e))
    }

    /// Validate a digest from untrusted input: must be non-empty base58.
    ///
    /// The [`TxDigest`] type itself stays permissive (digests are opaque and
    /// surfaced verbatim); this stricter check is for user-typed input.
    pub fn validate_digest(s: &str) -> anyhow::Result<TxDigest> {
        bs58::decode(s)
            .into_vec()
            .map_err(|e| anyhow::anyhow!("Invalid digest: not base58: {}", e))?;
        TxDigest::new(s).map_err(|e: IdentifierError| anyhow::anyhow!("{}", e))
    }

    /// Check if an address is a framework package (0x1, 0x2, 0x3).
    ///
    /// These can never be a freshly created entity, so resolution candidates
    /// and user-supplied package ids get screened against them.
    pub fn is_framework_address(address: &SuiAddress) -> bool {
        let hex_part = &address.as_str()[2..];
        let (zeros, tail) = hex_part.split_at(SuiAddress::HEX_LEN - 1);
        zeros.chars().all(|c| c == '0') && matches!(tail, "1" | "2" | "3")
    }

    /// Whether a string contains something shaped like an exported private
    /// key. Used to keep key material out of logs and error text.
    pub fn contains_secret(s: &str) -> bool {
        SUIPRIVKEY_RE.is_match(s)
    }

    /// Replace any key-shaped substring before a string may be logged.
    pub fn redact(s: &str) -> String {
        SUIPRIVKEY_RE.replace_all(s, "suiprivkey[REDACTED]").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::validator::*;

    fn full_addr(c: char) -> String {
        format!("0x{}", c.to_string().repeat(64))
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(&full_addr('a')).is_ok());
        assert!(validate_address("not-an-address").is_err());
    }

    #[test]
    fn test_validate_digest() {
        assert!(validate_digest("Dtestdigest123").is_ok());
        // '0' and 'l' are not in the base58 alphabet
        assert!(validate_digest("0l0l0l").is_err());
        assert!(validate_digest("").is_err());
    }

    #[test]
    fn test_framework_addresses() {
        let two = validate_address("0x2").unwrap();
        assert!(is_framework_address(&two));

        let user = validate_address(&full_addr('a')).unwrap();
        assert!(!is_framework_address(&user));

        // 0x21 is not a framework id even though it ends in 1
        let other = validate_address("0x21").unwrap();
        assert!(!is_framework_address(&other));
    }

    #[test]
    fn test_secret_detection_and_redaction() {
        let leaky = "failed to import suiprivkey1qz5trqhm0wl8qzhc40nr9x8l7st into session";
        assert!(contains_secret(leaky));

        let clean = redact(leaky);
        assert!(!contains_secret(&clean));
        assert!(clean.contains("suiprivkey[REDACTED]"));

        let harmless = "plain message";
        assert_eq!(redact(harmless), harmless);
    }
}
