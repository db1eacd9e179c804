//! Error types for intent construction
//!
//! Every variant here is a validation failure raised synchronously, before
//! any network call. These are caller bugs and are never retryable as-is.

use crate::intent::args::ArgKind;
use crate::types::IdentifierError;
use thiserror::Error;

/// Validation errors from the transaction builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    /// Publish intents require at least one compiled bytecode module
    #[error("Publish requires at least one bytecode module")]
    EmptyModules,

    /// The target is not in the static signature table
    #[error("Unsupported call target: {0}")]
    UnknownTarget(String),

    /// The target string is not a `package::module::function` path
    #[error("Invalid call target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Argument list length does not match the target signature
    #[error("Argument count mismatch for {target}: expected {expected}, got {actual}")]
    ArgumentCount {
        target: String,
        expected: usize,
        actual: usize,
    },

    /// Argument at `index` has the wrong kind for the target signature
    #[error("Argument {index} of {target}: expected {expected}, got {actual}")]
    ArgumentKind {
        target: String,
        index: usize,
        expected: ArgKind,
        actual: ArgKind,
    },

    /// A numeric value does not fit the declared wire width
    #[error("Value {value} does not fit in {width}")]
    ValueOutOfRange { value: u128, width: ArgKind },

    /// A malformed address or digest reached the builder
    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

impl IntentError {
    /// Error category for structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyModules => "publish",
            Self::UnknownTarget(_) | Self::InvalidTarget { .. } => "target",
            Self::ArgumentCount { .. } | Self::ArgumentKind { .. } => "arguments",
            Self::ValueOutOfRange { .. } => "width",
            Self::Identifier(_) => "identifier",
        }
    }
}
