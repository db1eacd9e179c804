//! suiforge - transaction intent construction and result resolution
//!
//! Builds typed transaction intents (mint, invoke, publish), hands them to
//! an injected signer/submitter, and resolves the ambiguous on-chain outcome
//! back to a concrete object id through an ordered fallback strategy. Reads
//! (balance, owned objects, effects) go through a thin fullnode JSON-RPC
//! client.

pub mod cli_wallet;
pub mod config;
pub mod intent;
pub mod observability;
pub mod resolver;
pub mod rpc;
pub mod security;
pub mod submit;
pub mod types;
pub mod wallet;

// Re-export the types most callers need
pub use intent::{build_move_call, build_publish, IntentError, TransactionIntent};
pub use resolver::{EffectsFetcher, ResolutionAttempt, ResolutionState, ResolverConfig};
pub use submit::{execute_and_resolve, SubmissionError, Submitter};
pub use types::{NetworkId, ObjectId, SuiAddress, TransactionRecord, TxDigest};
