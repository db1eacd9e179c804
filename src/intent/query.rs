//! Read-only query descriptors
//!
//! Queries are not intents: nothing is signed or submitted. A descriptor
//! pairs the fullnode RPC method name with its positional parameters, so
//! the client stays a dumb transport.

use crate::types::{ObjectId, SuiAddress, TxDigest};
use serde::Serialize;
use serde_json::{json, Value};

/// A read-only request against the ledger query service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueryRequest {
    /// Total balance of the base coin for an owner
    Balance { owner: SuiAddress },

    /// Objects owned by an address, optionally filtered by struct type
    OwnedObjects {
        owner: SuiAddress,
        type_filter: Option<String>,
    },

    /// Content and type of a single object
    Object { id: ObjectId },

    /// Effects, object changes, and events of a transaction
    TransactionBlock { digest: TxDigest },
}

impl QueryRequest {
    pub fn balance(owner: SuiAddress) -> Self {
        QueryRequest::Balance { owner }
    }

    pub fn owned_objects(owner: SuiAddress, type_filter: Option<String>) -> Self {
        QueryRequest::OwnedObjects { owner, type_filter }
    }

    pub fn object(id: ObjectId) -> Self {
        QueryRequest::Object { id }
    }

    pub fn transaction_block(digest: TxDigest) -> Self {
        QueryRequest::TransactionBlock { digest }
    }

    /// JSON-RPC method name on the fullnode.
    pub fn method(&self) -> &'static str {
        match self {
            QueryRequest::Balance { .. } => "suix_getBalance",
            QueryRequest::OwnedObjects { .. } => "suix_getOwnedObjects",
            QueryRequest::Object { .. } => "sui_getObject",
            QueryRequest::TransactionBlock { .. } => "sui_getTransactionBlock",
        }
    }

    /// Positional JSON-RPC parameters.
    pub fn params(&self) -> Value {
        match self {
            QueryRequest::Balance { owner } => json!([owner]),
            QueryRequest::OwnedObjects { owner, type_filter } => {
                let query = match type_filter {
                    Some(struct_type) => json!({
                        "filter": { "StructType": struct_type },
                        "options": { "showType": true, "showContent": true, "showDisplay": true }
                    }),
                    None => json!({
                        "options": { "showType": true, "showContent": true }
                    }),
                };
                json!([owner, query])
            }
            QueryRequest::Object { id } => json!([
                id,
                { "showType": true, "showContent": true, "showDisplay": true }
            ]),
            QueryRequest::TransactionBlock { digest } => json!([
                digest,
                { "showEffects": true, "showObjectChanges": true, "showEvents": true }
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SuiAddress {
        SuiAddress::parse(&format!("0x{}", "5".repeat(64))).unwrap()
    }

    #[test]
    fn test_methods() {
        assert_eq!(QueryRequest::balance(addr()).method(), "suix_getBalance");
        assert_eq!(
            QueryRequest::owned_objects(addr(), None).method(),
            "suix_getOwnedObjects"
        );
        assert_eq!(QueryRequest::object(addr()).method(), "sui_getObject");
        let digest = TxDigest::new("D123").unwrap();
        assert_eq!(
            QueryRequest::transaction_block(digest).method(),
            "sui_getTransactionBlock"
        );
    }

    #[test]
    fn test_transaction_block_params_request_full_record() {
        let digest = TxDigest::new("Dtestdigest123").unwrap();
        let params = QueryRequest::transaction_block(digest).params();
        assert_eq!(params[0], "Dtestdigest123");
        assert_eq!(params[1]["showEffects"], true);
        assert_eq!(params[1]["showObjectChanges"], true);
        assert_eq!(params[1]["showEvents"], true);
    }

    #[test]
    fn test_owned_objects_type_filter() {
        let filtered = QueryRequest::owned_objects(
            addr(),
            Some("0x2::basic_nft::GameNFT".to_string()),
        );
        let params = filtered.params();
        assert_eq!(params[1]["filter"]["StructType"], "0x2::basic_nft::GameNFT");

        let unfiltered = QueryRequest::owned_objects(addr(), None);
        assert!(unfiltered.params()[1].get("filter").is_none());
    }
}
