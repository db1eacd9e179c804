//! Submission flow: one suspend point, typed outcomes
//!
//! The signer/submitter is a collaborator behind the [`Submitter`] trait:
//! browser wallet, local CLI, or a test double. Submission returns a single
//! `Result` instead of success/error callbacks, and every terminal outcome
//! (resolved, unresolved, fetch-failed, rejected) stays distinguishable for
//! the caller: "transaction succeeded but identifier unknown" is a different
//! outcome from "transaction failed".

use crate::intent::TransactionIntent;
use crate::observability::CorrelationId;
use crate::resolver::{
    resolve_created_object, EffectsFetcher, ResolutionAttempt, ResolutionState, ResolverConfig,
};
use crate::types::{NetworkId, ObjectId, TransactionRecord, TxDigest};
use crate::wallet::{SessionBinding, WalletSession};
use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{info, warn};

/// Typed rejection from the signer/submitter collaborator
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// The user declined to sign; surfaced, never retried automatically
    #[error("Transaction rejected by user")]
    Rejected,

    /// Not enough gas coin to cover the transaction
    #[error("Insufficient gas: {0}")]
    InsufficientGas(String),

    /// A referenced package or object is missing or malformed
    #[error("Dependency error: {0}")]
    DependencyError(String),

    /// The wallet connection changed since the intent was built
    #[error("Stale wallet session: connection changed since the intent was built")]
    StaleSession,

    /// The intent's sender is not the active account
    #[error("Intent sender does not match the active account")]
    SenderMismatch,

    /// Anything else the collaborator reported
    #[error("Submission failed: {0}")]
    Other(String),
}

impl SubmissionError {
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, SubmissionError::Rejected)
    }

    /// Error category for structured logs
    pub fn category(&self) -> &'static str {
        match self {
            SubmissionError::Rejected => "rejected",
            SubmissionError::InsufficientGas(_) => "gas",
            SubmissionError::DependencyError(_) => "dependency",
            SubmissionError::StaleSession | SubmissionError::SenderMismatch => "session",
            SubmissionError::Other(_) => "other",
        }
    }
}

/// Classify a collaborator's free-text failure message into the taxonomy.
///
/// Wallets and nodes report failures as message strings; the distinctions
/// the user cares about hide in substrings.
pub fn classify_rejection(message: &str) -> SubmissionError {
    let lower = message.to_lowercase();
    if lower.contains("invalid input") || lower.contains("dependent package") {
        SubmissionError::DependencyError(message.to_string())
    } else if lower.contains("insufficientgas") || lower.contains("insufficient") {
        SubmissionError::InsufficientGas(message.to_string())
    } else if lower.contains("rejected") {
        SubmissionError::Rejected
    } else {
        SubmissionError::Other(message.to_string())
    }
}

/// Acceptance marker from the submitter: the digest, plus the effects if the
/// collaborator returned them inline
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub digest: TxDigest,
    pub record: Option<TransactionRecord>,
}

/// Signer/submitter collaborator. Accepts an intent and a target network,
/// suspends until signed and accepted (or declined).
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        intent: &TransactionIntent,
        network: NetworkId,
        correlation_id: Option<CorrelationId>,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Outcome of one build → submit → resolve sequence
#[derive(Debug, Clone)]
pub struct ExecutedAction {
    pub digest: TxDigest,
    pub resolution: ResolutionState,
    pub explorer_url: String,
}

/// Explorer link for a digest; the digest is embedded verbatim.
pub fn explorer_url(network: NetworkId, digest: &TxDigest) -> String {
    format!("{}/{}", network.explorer_base(), digest.as_str())
}

/// Run one submit/resolve sequence for an intent.
///
/// The intent is consumed: one build, one submission. The `binding` must
/// still match the live wallet session; if the connection changes while the
/// submission is in flight, the digest is returned with resolution left
/// `Pending`. The ledger submission is not revocable, but no resolution is
/// attempted against the wrong account.
pub async fn execute_and_resolve(
    submitter: &dyn Submitter,
    fetcher: &dyn EffectsFetcher,
    session: &WalletSession,
    binding: &SessionBinding,
    intent: TransactionIntent,
    network: NetworkId,
    resolver_config: ResolverConfig,
    known_packages: HashSet<ObjectId>,
) -> Result<ExecutedAction, SubmissionError> {
    if !session.is_current(binding) {
        return Err(SubmissionError::StaleSession);
    }
    if intent.sender() != binding.address() {
        return Err(SubmissionError::SenderMismatch);
    }

    let correlation_id = CorrelationId::new();
    info!(
        correlation_id = %correlation_id,
        sender = %intent.sender(),
        network = %network,
        commands = intent.commands().len(),
        "Submitting transaction intent"
    );

    let receipt = submitter
        .submit(&intent, network, Some(correlation_id.clone()))
        .await?;
    drop(intent);

    info!(
        correlation_id = %correlation_id,
        digest = %receipt.digest,
        "Transaction accepted"
    );

    let digest = receipt.digest.clone();
    let url = explorer_url(network, &digest);

    if !session.is_current(binding) {
        warn!(
            correlation_id = %correlation_id,
            digest = %digest,
            "Wallet connection changed mid-flight; skipping resolution"
        );
        return Ok(ExecutedAction {
            digest,
            resolution: ResolutionState::Pending,
            explorer_url: url,
        });
    }

    let resolution = match receipt.record {
        // Effects came back inline with acceptance; no fetch round-trip.
        Some(record) => {
            match resolve_created_object(&record, binding.address(), &known_packages) {
                Some(id) => ResolutionState::Resolved(id),
                None => ResolutionState::Unresolved,
            }
        }
        None => {
            let mut attempt =
                ResolutionAttempt::new(digest.clone(), binding.address().clone(), resolver_config)
                    .with_known_packages(known_packages);
            attempt.resolve(fetcher).await.clone()
        }
    };

    Ok(ExecutedAction {
        digest,
        resolution,
        explorer_url: url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{build_move_call, CallArg, MoveTarget};
    use crate::rpc::errors::RpcClientError;
    use crate::types::{CreatedObject, ObjectRefWire, Ownership, SuiAddress};
    use std::time::Duration;

    fn addr(c: char) -> SuiAddress {
        SuiAddress::parse(&format!("0x{}", std::iter::repeat(c).take(64).collect::<String>()))
            .unwrap()
    }

    fn level_up_intent(sender: SuiAddress) -> TransactionIntent {
        let target = MoveTarget::new(addr('b'), "basic_nft", "level_up").unwrap();
        build_move_call(sender, target, vec![CallArg::object(addr('c'))], None).unwrap()
    }

    fn fast_config() -> ResolverConfig {
        ResolverConfig {
            initial_delay: Duration::ZERO,
            fetch_timeout: Duration::from_secs(5),
        }
    }

    struct OkSubmitter {
        record: Option<TransactionRecord>,
    }

    #[async_trait]
    impl Submitter for OkSubmitter {
        async fn submit(
            &self,
            _intent: &TransactionIntent,
            _network: NetworkId,
            _correlation_id: Option<CorrelationId>,
        ) -> Result<SubmissionReceipt, SubmissionError> {
            Ok(SubmissionReceipt {
                digest: TxDigest::new("Dtestdigest123").unwrap(),
                record: self.record.clone(),
            })
        }
    }

    struct EmptyFetcher;

    #[async_trait]
    impl EffectsFetcher for EmptyFetcher {
        async fn fetch(&self, digest: &TxDigest) -> Result<TransactionRecord, RpcClientError> {
            Ok(TransactionRecord::empty(digest.clone()))
        }
    }

    fn immutable_record() -> TransactionRecord {
        let mut record = TransactionRecord::empty(TxDigest::new("Dtestdigest123").unwrap());
        record.created.push(CreatedObject {
            owner: Ownership::Immutable,
            reference: ObjectRefWire {
                object_id: addr('a'),
                version: None,
                digest: None,
            },
        });
        record
    }

    #[test]
    fn test_classify_rejection_mapping() {
        assert_eq!(
            classify_rejection("User rejected the request"),
            SubmissionError::Rejected
        );
        assert!(matches!(
            classify_rejection("InsufficientGas: balance too low"),
            SubmissionError::InsufficientGas(_)
        ));
        assert!(matches!(
            classify_rejection("Invalid input: package not found"),
            SubmissionError::DependencyError(_)
        ));
        assert!(matches!(
            classify_rejection("something exploded"),
            SubmissionError::Other(_)
        ));
    }

    #[test]
    fn test_error_categories_distinguishable() {
        let labels: Vec<&str> = vec![
            SubmissionError::Rejected.category(),
            SubmissionError::InsufficientGas(String::new()).category(),
            SubmissionError::DependencyError(String::new()).category(),
            SubmissionError::Other(String::new()).category(),
        ];
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_explorer_url_verbatim_digest() {
        let digest = TxDigest::new("Dtestdigest123").unwrap();
        let url = explorer_url(NetworkId::Testnet, &digest);
        assert!(url.ends_with("/Dtestdigest123"));
    }

    #[tokio::test]
    async fn test_happy_path_resolves_via_fetch() {
        struct RecordFetcher(TransactionRecord);

        #[async_trait]
        impl EffectsFetcher for RecordFetcher {
            async fn fetch(
                &self,
                _digest: &TxDigest,
            ) -> Result<TransactionRecord, RpcClientError> {
                Ok(self.0.clone())
            }
        }

        let mut session = WalletSession::new();
        let binding = session.connect(addr('5'));

        let action = execute_and_resolve(
            &OkSubmitter { record: None },
            &RecordFetcher(immutable_record()),
            &session,
            &binding,
            level_up_intent(addr('5')),
            NetworkId::Testnet,
            fast_config(),
            HashSet::new(),
        )
        .await
        .unwrap();

        assert_eq!(action.digest.as_str(), "Dtestdigest123");
        assert!(action.resolution.resolved_id().is_some());
    }

    #[tokio::test]
    async fn test_inline_record_skips_fetch() {
        let mut session = WalletSession::new();
        let binding = session.connect(addr('5'));

        let action = execute_and_resolve(
            &OkSubmitter {
                record: Some(immutable_record()),
            },
            &EmptyFetcher,
            &session,
            &binding,
            level_up_intent(addr('5')),
            NetworkId::Testnet,
            fast_config(),
            HashSet::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            action.resolution.resolved_id().unwrap().as_str(),
            format!("0x{}", "a".repeat(64))
        );
    }

    #[tokio::test]
    async fn test_stale_binding_rejected_before_submit() {
        let mut session = WalletSession::new();
        let binding = session.connect(addr('5'));
        session.connect(addr('6'));

        let result = execute_and_resolve(
            &OkSubmitter { record: None },
            &EmptyFetcher,
            &session,
            &binding,
            level_up_intent(addr('5')),
            NetworkId::Testnet,
            fast_config(),
            HashSet::new(),
        )
        .await;

        assert_eq!(result.unwrap_err(), SubmissionError::StaleSession);
    }

    #[tokio::test]
    async fn test_sender_mismatch_rejected() {
        let mut session = WalletSession::new();
        let binding = session.connect(addr('5'));

        let result = execute_and_resolve(
            &OkSubmitter { record: None },
            &EmptyFetcher,
            &session,
            &binding,
            level_up_intent(addr('7')),
            NetworkId::Testnet,
            fast_config(),
            HashSet::new(),
        )
        .await;

        assert_eq!(result.unwrap_err(), SubmissionError::SenderMismatch);
    }

    #[tokio::test]
    async fn test_submitter_rejection_propagates() {
        struct RejectingSubmitter;

        #[async_trait]
        impl Submitter for RejectingSubmitter {
            async fn submit(
                &self,
                _intent: &TransactionIntent,
                _network: NetworkId,
                _correlation_id: Option<CorrelationId>,
            ) -> Result<SubmissionReceipt, SubmissionError> {
                Err(classify_rejection("User rejected the transaction"))
            }
        }

        let mut session = WalletSession::new();
        let binding = session.connect(addr('5'));

        let result = execute_and_resolve(
            &RejectingSubmitter,
            &EmptyFetcher,
            &session,
            &binding,
            level_up_intent(addr('5')),
            NetworkId::Testnet,
            fast_config(),
            HashSet::new(),
        )
        .await;

        assert!(result.unwrap_err().is_user_rejection());
    }
}
