//! Result resolution for submitted transactions
//!
//! After a transaction is accepted, the interesting question ("which created
//! object is the new package/NFT?") has no uniform answer in the effect
//! payload. Each [`ResolutionAttempt`] is an isolated state machine over one
//! digest:
//!
//! ```text
//! Pending -> Fetching -> Resolved(id)
//!                     -> Unresolved          (valid outcome, not an error)
//!                     -> FetchFailed(err)    (retryable with the same digest)
//! ```
//!
//! Effects may not be queryable immediately after acceptance, so the first
//! fetch waits a configurable delay; manual retries skip it. Errors never
//! propagate past the attempt boundary: they settle into the state, which
//! the caller inspects.

pub mod strategy;

use crate::rpc::errors::RpcClientError;
use crate::types::{ObjectId, SuiAddress, TransactionRecord, TxDigest};
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

pub use strategy::resolve_created_object;

/// Injected fetch capability: given a digest, obtain the transaction record.
#[async_trait]
pub trait EffectsFetcher: Send + Sync {
    async fn fetch(&self, digest: &TxDigest) -> Result<TransactionRecord, RpcClientError>;
}

/// Timing knobs for a resolution attempt
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Wait before the first fetch; effects have eventual visibility.
    pub initial_delay: Duration,

    /// Upper bound on a single fetch; elapsed surfaces as `FetchFailed`.
    pub fetch_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(2000),
            fetch_timeout: Duration::from_secs(15),
        }
    }
}

/// State of a resolution attempt
#[derive(Debug, Clone)]
pub enum ResolutionState {
    /// Digest known, no fetch issued yet
    Pending,
    /// Fetch in flight
    Fetching,
    /// Terminal: the extracted entity id
    Resolved(ObjectId),
    /// Terminal: effects fetched, no strategy matched. A reportable
    /// outcome, distinct from failure
    Unresolved,
    /// Terminal for this attempt: fetch error, safe to retry
    FetchFailed(RpcClientError),
}

impl ResolutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::Resolved(_)
                | ResolutionState::Unresolved
                | ResolutionState::FetchFailed(_)
        )
    }

    pub fn resolved_id(&self) -> Option<&ObjectId> {
        match self {
            ResolutionState::Resolved(id) => Some(id),
            _ => None,
        }
    }

    /// Short label for user-facing output; each terminal state must be
    /// distinguishable there.
    pub fn label(&self) -> &'static str {
        match self {
            ResolutionState::Pending => "pending",
            ResolutionState::Fetching => "fetching",
            ResolutionState::Resolved(_) => "resolved",
            ResolutionState::Unresolved => "unresolved",
            ResolutionState::FetchFailed(_) => "fetch-failed",
        }
    }
}

/// One resolution attempt for one digest.
///
/// Attempts own their state; independent attempts for different digests can
/// run concurrently with nothing shared.
#[derive(Debug)]
pub struct ResolutionAttempt {
    digest: TxDigest,
    sender: SuiAddress,
    known_packages: HashSet<ObjectId>,
    config: ResolverConfig,
    state: ResolutionState,
    fetches: u32,
}

impl ResolutionAttempt {
    pub fn new(digest: TxDigest, sender: SuiAddress, config: ResolverConfig) -> Self {
        Self {
            digest,
            sender,
            known_packages: HashSet::new(),
            config,
            state: ResolutionState::Pending,
            fetches: 0,
        }
    }

    /// Exclude already-known package ids from the generic fallback scan.
    pub fn with_known_packages(mut self, ids: impl IntoIterator<Item = ObjectId>) -> Self {
        self.known_packages.extend(ids);
        self
    }

    pub fn digest(&self) -> &TxDigest {
        &self.digest
    }

    pub fn state(&self) -> &ResolutionState {
        &self.state
    }

    pub fn fetches(&self) -> u32 {
        self.fetches
    }

    /// Run resolution. The first fetch waits the configured delay; later
    /// calls (after `FetchFailed` or `Unresolved`) go straight to the node.
    pub async fn resolve(&mut self, fetcher: &dyn EffectsFetcher) -> &ResolutionState {
        let delay = if self.fetches == 0 {
            Some(self.config.initial_delay)
        } else {
            None
        };
        self.run_fetch(fetcher, delay).await
    }

    /// Manual retry: same digest, no pre-fetch delay.
    pub async fn retry(&mut self, fetcher: &dyn EffectsFetcher) -> &ResolutionState {
        self.run_fetch(fetcher, None).await
    }

    async fn run_fetch(
        &mut self,
        fetcher: &dyn EffectsFetcher,
        delay: Option<Duration>,
    ) -> &ResolutionState {
        if let Some(delay) = delay {
            if !delay.is_zero() {
                debug!(
                    digest = %self.digest,
                    delay_ms = delay.as_millis() as u64,
                    "Waiting for effects visibility"
                );
                tokio::time::sleep(delay).await;
            }
        }

        self.state = ResolutionState::Fetching;
        self.fetches += 1;

        let fetched =
            tokio::time::timeout(self.config.fetch_timeout, fetcher.fetch(&self.digest)).await;

        self.state = match fetched {
            Err(_elapsed) => {
                let err = RpcClientError::Timeout {
                    endpoint: "effects-fetcher".to_string(),
                    timeout_ms: self.config.fetch_timeout.as_millis() as u64,
                };
                warn!(digest = %self.digest, error = %err, "Effects fetch timed out");
                ResolutionState::FetchFailed(err)
            }
            Ok(Err(err)) => {
                warn!(digest = %self.digest, error = %err, "Effects fetch failed");
                ResolutionState::FetchFailed(err)
            }
            Ok(Ok(record)) => {
                match strategy::resolve_created_object(&record, &self.sender, &self.known_packages)
                {
                    Some(id) => {
                        info!(digest = %self.digest, object_id = %id, "Resolved created entity");
                        ResolutionState::Resolved(id)
                    }
                    None => {
                        info!(digest = %self.digest, "No strategy matched; unresolved");
                        ResolutionState::Unresolved
                    }
                }
            }
        };

        &self.state
    }
}
