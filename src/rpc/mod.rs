//! Fullnode query client
//!
//! JSON-RPC transport with bounded retry, plus the error taxonomy for
//! everything that can go wrong between here and the node.

pub mod client;
pub mod errors;

pub use client::{parse_transaction_record, LedgerClient, OwnedObjectSummary};
pub use errors::{RetryPolicy, RpcClientError};
