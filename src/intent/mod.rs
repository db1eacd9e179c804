//! Transaction intent construction
//!
//! This module turns validated action parameters into immutable, typed
//! transaction intents:
//!
//! - **args**: typed call arguments with wire-width checks
//! - **builder**: one-shot intent constructors and the static signature table
//! - **query**: read-only request descriptors (no intent, nothing signed)
//! - **errors**: the validation taxonomy, raised before any network call
//!
//! Construction is pure: no side effects, no I/O, and deterministic
//! serialization, so two builds from identical logical parameters are
//! byte-identical.

pub mod args;
pub mod builder;
pub mod errors;
pub mod query;

pub use args::{ArgKind, CallArg, PureValue};
pub use builder::{
    build_move_call, build_publish, sanity_check_publish_pairing, signature_of, Command,
    MoveTarget, StepResult, TransactionIntent,
};
pub use errors::IntentError;
pub use query::QueryRequest;
