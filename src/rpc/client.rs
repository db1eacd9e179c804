//! JSON-RPC client for the fullnode query service
//!
//! A thin transport: build the request from a [`QueryRequest`] descriptor,
//! retry transient failures with backoff, and normalize the interesting
//! responses into the crate's types. Everything protocol-shaped lives here
//! so the resolver only sees [`TransactionRecord`]s.

use crate::intent::query::QueryRequest;
use crate::resolver::EffectsFetcher;
use crate::rpc::errors::{RetryPolicy, RpcClientError};
use crate::types::{
    CreatedObject, EventRecord, ExecutionStatus, NetworkId, ObjectId, SuiAddress,
    TransactionRecord, TxDigest,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a single fullnode endpoint
#[derive(Debug, Clone)]
pub struct LedgerClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl LedgerClient {
    /// Build a client for an explicit endpoint URL.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, RpcClientError> {
        let endpoint = endpoint.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcClientError::from_reqwest(e, &endpoint))?;
        Ok(Self {
            http,
            endpoint,
            retry,
        })
    }

    /// Build a client for a network's default fullnode.
    pub fn for_network(
        network: NetworkId,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, RpcClientError> {
        Self::new(network.fullnode_url(), timeout, retry)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Execute a query descriptor, returning the raw JSON-RPC result.
    pub async fn execute(&self, query: &QueryRequest) -> Result<Value, RpcClientError> {
        self.call_with_retry(query.method(), query.params()).await
    }

    /// Fetch and normalize the full transaction record for a digest.
    pub async fn get_transaction_record(
        &self,
        digest: &TxDigest,
    ) -> Result<TransactionRecord, RpcClientError> {
        let query = QueryRequest::transaction_block(digest.clone());
        let result = self.execute(&query).await?;
        parse_transaction_record(result)
    }

    /// Total base-coin balance for an owner, in the smallest unit.
    pub async fn get_balance(&self, owner: &SuiAddress) -> Result<u128, RpcClientError> {
        let result = self.execute(&QueryRequest::balance(owner.clone())).await?;
        let total = result
            .get("totalBalance")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                RpcClientError::InvalidResponse("balance response missing totalBalance".to_string())
            })?;
        total
            .parse::<u128>()
            .map_err(|e| RpcClientError::InvalidResponse(format!("totalBalance: {}", e)))
    }

    /// Objects owned by an address, optionally filtered by struct type.
    pub async fn get_owned_objects(
        &self,
        owner: &SuiAddress,
        type_filter: Option<&str>,
    ) -> Result<Vec<OwnedObjectSummary>, RpcClientError> {
        let query =
            QueryRequest::owned_objects(owner.clone(), type_filter.map(|s| s.to_string()));
        let result = self.execute(&query).await?;

        let page: OwnedObjectsPage = serde_json::from_value(result)
            .map_err(|e| RpcClientError::InvalidResponse(format!("owned objects: {}", e)))?;

        Ok(page
            .data
            .into_iter()
            .filter_map(|entry| entry.data)
            .collect())
    }

    /// Content of a single object; `NotFound` if it does not exist.
    pub async fn get_object(&self, id: &ObjectId) -> Result<Value, RpcClientError> {
        let result = self.execute(&QueryRequest::object(id.clone())).await?;
        if let Some(error) = result.get("error") {
            return Err(RpcClientError::NotFound {
                what: format!("object {} ({})", id, error),
            });
        }
        result.get("data").cloned().ok_or(RpcClientError::NotFound {
            what: format!("object {}", id),
        })
    }

    /// Whether a package id exists on this network.
    pub async fn package_exists(&self, id: &ObjectId) -> Result<bool, RpcClientError> {
        match self.get_object(id).await {
            Ok(_) => Ok(true),
            Err(RpcClientError::NotFound { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    async fn call_with_retry(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<Value, RpcClientError> {
        let mut attempt = 0;
        loop {
            match self.call(method, params.clone()).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() => {
                    match self.retry.calculate_delay(attempt + 1) {
                        Some(delay) => {
                            warn!(
                                method,
                                attempt,
                                error = %err,
                                delay_ms = delay.as_millis() as u64,
                                "Retrying RPC call"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => return Err(err),
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn call(&self, method: &'static str, params: Value) -> Result<Value, RpcClientError> {
        debug!(method, endpoint = %self.endpoint, "RPC call");

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcClientError::from_reqwest(e, &self.endpoint))?;

        if response.status().as_u16() == 429 {
            return Err(RpcClientError::RateLimited {
                endpoint: self.endpoint.clone(),
            });
        }
        if response.status().is_server_error() {
            return Err(RpcClientError::RpcResponse {
                endpoint: self.endpoint.clone(),
                message: format!("HTTP {}", response.status()),
                code: Some(response.status().as_u16() as i64),
            });
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| RpcClientError::from_reqwest(e, &self.endpoint))?;

        if let Some(error) = envelope.get("error") {
            return Err(RpcClientError::RpcResponse {
                endpoint: self.endpoint.clone(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown RPC error")
                    .to_string(),
                code: error.get("code").and_then(Value::as_i64),
            });
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| RpcClientError::InvalidResponse("missing result field".to_string()))
    }
}

#[async_trait]
impl EffectsFetcher for LedgerClient {
    async fn fetch(&self, digest: &TxDigest) -> Result<TransactionRecord, RpcClientError> {
        self.get_transaction_record(digest).await
    }
}

/// Normalize a transaction block response (fullnode result or wallet JSON
/// output) into a [`TransactionRecord`].
pub fn parse_transaction_record(result: Value) -> Result<TransactionRecord, RpcClientError> {
    let wire: TxBlockWire = serde_json::from_value(result)
        .map_err(|e| RpcClientError::InvalidResponse(format!("transaction block: {}", e)))?;

    let effects = wire.effects.unwrap_or_default();
    let published = wire
        .object_changes
        .unwrap_or_default()
        .into_iter()
        .filter_map(|change| match change {
            ObjectChangeWire::Published { package_id } => Some(package_id),
            ObjectChangeWire::Other => None,
        })
        .collect();

    Ok(TransactionRecord {
        digest: wire.digest,
        status: effects.status,
        created: effects.created,
        published,
        events: wire.events.unwrap_or_default(),
    })
}

/// Summary of one owned object from a listing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObjectSummary {
    pub object_id: ObjectId,

    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
}

#[derive(Deserialize)]
struct OwnedObjectsPage {
    #[serde(default)]
    data: Vec<OwnedObjectEntry>,
}

#[derive(Deserialize)]
struct OwnedObjectEntry {
    #[serde(default)]
    data: Option<OwnedObjectSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxBlockWire {
    digest: TxDigest,

    #[serde(default)]
    effects: Option<EffectsWire>,

    #[serde(default)]
    object_changes: Option<Vec<ObjectChangeWire>>,

    #[serde(default)]
    events: Option<Vec<EventRecord>>,
}

#[derive(Deserialize)]
struct EffectsWire {
    status: ExecutionStatus,

    #[serde(default)]
    created: Vec<CreatedObject>,
}

impl Default for EffectsWire {
    fn default() -> Self {
        Self {
            status: ExecutionStatus::Success,
            created: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ObjectChangeWire {
    Published {
        #[serde(rename = "packageId")]
        package_id: ObjectId,
    },

    #[serde(other)]
    Other,
}
