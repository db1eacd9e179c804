//! Typed call arguments with wire-width validation
//!
//! Arguments mirror the two shapes the wallet transaction API distinguishes:
//! pure values (strings, fixed-width integers, addresses, raw bytes) and
//! references to existing on-chain objects. The builder validates kinds
//! against a target's signature; the checked constructors here enforce the
//! wire width only. Domain ranges (e.g. rarity within [1,4]) belong to the
//! caller.

use crate::intent::errors::IntentError;
use crate::types::{ObjectId, SuiAddress};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of an argument, used in signature tables and error reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgKind {
    Str,
    U8,
    U16,
    U32,
    U64,
    U128,
    Address,
    Bytes,
    Object,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgKind::Str => "string",
            ArgKind::U8 => "u8",
            ArgKind::U16 => "u16",
            ArgKind::U32 => "u32",
            ArgKind::U64 => "u64",
            ArgKind::U128 => "u128",
            ArgKind::Address => "address",
            ArgKind::Bytes => "bytes",
            ArgKind::Object => "object",
        };
        write!(f, "{}", name)
    }
}

/// A pure (by-value) argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PureValue {
    Str(String),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    Address(SuiAddress),
    Bytes(Vec<u8>),
}

impl PureValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            PureValue::Str(_) => ArgKind::Str,
            PureValue::U8(_) => ArgKind::U8,
            PureValue::U16(_) => ArgKind::U16,
            PureValue::U32(_) => ArgKind::U32,
            PureValue::U64(_) => ArgKind::U64,
            PureValue::U128(_) => ArgKind::U128,
            PureValue::Address(_) => ArgKind::Address,
            PureValue::Bytes(_) => ArgKind::Bytes,
        }
    }
}

/// One positional argument of a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    Pure(PureValue),
    Object(ObjectId),
}

impl CallArg {
    pub fn kind(&self) -> ArgKind {
        match self {
            CallArg::Pure(v) => v.kind(),
            CallArg::Object(_) => ArgKind::Object,
        }
    }

    pub fn str(s: impl Into<String>) -> Self {
        CallArg::Pure(PureValue::Str(s.into()))
    }

    pub fn u64(v: u64) -> Self {
        CallArg::Pure(PureValue::U64(v))
    }

    pub fn address(a: SuiAddress) -> Self {
        CallArg::Pure(PureValue::Address(a))
    }

    pub fn object(id: ObjectId) -> Self {
        CallArg::Object(id)
    }

    pub fn bytes(b: Vec<u8>) -> Self {
        CallArg::Pure(PureValue::Bytes(b))
    }

    /// Narrow a caller-supplied integer to u8, checking the wire width.
    pub fn u8_checked(v: u64) -> Result<Self, IntentError> {
        u8::try_from(v)
            .map(|n| CallArg::Pure(PureValue::U8(n)))
            .map_err(|_| IntentError::ValueOutOfRange {
                value: v as u128,
                width: ArgKind::U8,
            })
    }

    /// Narrow a caller-supplied integer to u16, checking the wire width.
    pub fn u16_checked(v: u64) -> Result<Self, IntentError> {
        u16::try_from(v)
            .map(|n| CallArg::Pure(PureValue::U16(n)))
            .map_err(|_| IntentError::ValueOutOfRange {
                value: v as u128,
                width: ArgKind::U16,
            })
    }

    /// Narrow a caller-supplied integer to u32, checking the wire width.
    pub fn u32_checked(v: u64) -> Result<Self, IntentError> {
        u32::try_from(v)
            .map(|n| CallArg::Pure(PureValue::U32(n)))
            .map_err(|_| IntentError::ValueOutOfRange {
                value: v as u128,
                width: ArgKind::U32,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_kinds() {
        assert_eq!(CallArg::str("hero").kind(), ArgKind::Str);
        assert_eq!(CallArg::u64(100).kind(), ArgKind::U64);
        let addr = SuiAddress::parse(&format!("0x{}", "1".repeat(64))).unwrap();
        assert_eq!(CallArg::address(addr.clone()).kind(), ArgKind::Address);
        assert_eq!(CallArg::object(addr).kind(), ArgKind::Object);
    }

    #[test]
    fn test_u8_width_check() {
        assert_eq!(CallArg::u8_checked(4).unwrap().kind(), ArgKind::U8);
        let err = CallArg::u8_checked(256).unwrap_err();
        assert!(matches!(
            err,
            IntentError::ValueOutOfRange {
                value: 256,
                width: ArgKind::U8
            }
        ));
    }

    #[test]
    fn test_u16_u32_width_checks() {
        assert!(CallArg::u16_checked(65_535).is_ok());
        assert!(CallArg::u16_checked(65_536).is_err());
        assert!(CallArg::u32_checked(u32::MAX as u64).is_ok());
        assert!(CallArg::u32_checked(u32::MAX as u64 + 1).is_err());
    }
}
