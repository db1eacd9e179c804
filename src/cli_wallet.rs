//! Submitter backed by the local `sui` CLI
//!
//! Signing stays entirely outside this crate: the local CLI holds the keys
//! and does the signing, exactly like a browser wallet would. This wrapper
//! maps an intent to `sui client call` / `sui client publish` invocations,
//! parses the `--json` output for the digest and effects, and classifies
//! failures through the submission taxonomy.

use crate::intent::{CallArg, Command, PureValue, TransactionIntent};
use crate::observability::CorrelationId;
use crate::rpc::parse_transaction_record;
use crate::submit::{classify_rejection, SubmissionError, SubmissionReceipt, Submitter};
use crate::types::{NetworkId, SuiAddress, TxDigest};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command as ProcessCommand;
use tracing::{debug, warn};

/// Wallet collaborator wrapping the `sui` binary
#[derive(Debug, Clone)]
pub struct SuiCliWallet {
    binary: String,
    /// Source directory for publish intents; the CLI compiles and signs
    /// from source, while the intent carries the validated module bytes.
    publish_source: Option<PathBuf>,
}

impl Default for SuiCliWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl SuiCliWallet {
    pub fn new() -> Self {
        Self {
            binary: "sui".to_string(),
            publish_source: None,
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_publish_source(mut self, dir: PathBuf) -> Self {
        self.publish_source = Some(dir);
        self
    }

    /// The CLI's active account address (`sui client addresses --json`).
    pub async fn active_address(&self) -> Result<SuiAddress, SubmissionError> {
        let output = self.run(&["client", "addresses", "--json"]).await?;
        let active = output
            .get("activeAddress")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SubmissionError::Other("no activeAddress in CLI output".to_string())
            })?;
        SuiAddress::parse(active)
            .map_err(|e| SubmissionError::Other(format!("bad active address: {}", e)))
    }

    async fn run(&self, args: &[&str]) -> Result<Value, SubmissionError> {
        debug!(binary = %self.binary, ?args, "Invoking sui CLI");

        let output = ProcessCommand::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| SubmissionError::Other(format!("failed to run {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_rejection(stderr.trim()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(json_tail(&stdout))
            .map_err(|e| SubmissionError::Other(format!("unparseable CLI output: {}", e)))
    }

    fn call_args(intent: &TransactionIntent) -> Result<Vec<String>, SubmissionError> {
        let (target, args) = match intent.commands() {
            [Command::MoveCall { target, args }] => (target, args),
            other => {
                return Err(SubmissionError::Other(format!(
                    "CLI wallet cannot submit this command shape ({} commands)",
                    other.len()
                )))
            }
        };

        let mut cli_args = vec![
            "client".to_string(),
            "call".to_string(),
            "--package".to_string(),
            target.package().to_string(),
            "--module".to_string(),
            target.module().to_string(),
            "--function".to_string(),
            target.function().to_string(),
        ];
        if !args.is_empty() {
            cli_args.push("--args".to_string());
            for arg in args {
                cli_args.push(render_arg(arg));
            }
        }
        if let Some(budget) = intent.gas_budget() {
            cli_args.push("--gas-budget".to_string());
            cli_args.push(budget.to_string());
        }
        cli_args.push("--json".to_string());
        Ok(cli_args)
    }

    fn publish_args(&self, intent: &TransactionIntent) -> Result<Vec<String>, SubmissionError> {
        let source = self.publish_source.as_ref().ok_or_else(|| {
            SubmissionError::Other(
                "publish intent needs a package source directory (with_publish_source)"
                    .to_string(),
            )
        })?;

        let mut cli_args = vec![
            "client".to_string(),
            "publish".to_string(),
            source.display().to_string(),
        ];
        if let Some(budget) = intent.gas_budget() {
            cli_args.push("--gas-budget".to_string());
            cli_args.push(budget.to_string());
        }
        cli_args.push("--json".to_string());
        Ok(cli_args)
    }
}

#[async_trait]
impl Submitter for SuiCliWallet {
    async fn submit(
        &self,
        intent: &TransactionIntent,
        network: NetworkId,
        correlation_id: Option<CorrelationId>,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let args = if intent.is_publish() {
            self.publish_args(intent)?
        } else {
            Self::call_args(intent)?
        };
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        debug!(
            correlation_id = ?correlation_id,
            network = %network,
            "Submitting via sui CLI"
        );
        let output = self.run(&arg_refs).await?;

        let digest = output
            .get("digest")
            .and_then(Value::as_str)
            .ok_or_else(|| SubmissionError::Other("no digest in CLI output".to_string()))?;
        let digest = TxDigest::new(digest)
            .map_err(|e| SubmissionError::Other(format!("bad digest in CLI output: {}", e)))?;

        // The CLI returns the full transaction block; keep the effects if
        // they parse, otherwise let the resolver fetch them.
        let record = match parse_transaction_record(output) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(digest = %digest, error = %e, "CLI output effects not parseable");
                None
            }
        };

        Ok(SubmissionReceipt { digest, record })
    }
}

/// Render one call argument the way the CLI expects it on the command line.
fn render_arg(arg: &CallArg) -> String {
    match arg {
        CallArg::Object(id) => id.to_string(),
        CallArg::Pure(value) => match value {
            PureValue::Str(s) => s.clone(),
            PureValue::U8(n) => n.to_string(),
            PureValue::U16(n) => n.to_string(),
            PureValue::U32(n) => n.to_string(),
            PureValue::U64(n) => n.to_string(),
            PureValue::U128(n) => n.to_string(),
            PureValue::Address(a) => a.to_string(),
            PureValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        },
    }
}

/// The CLI sometimes prints warnings before the JSON document; start from
/// the first brace.
fn json_tail(stdout: &str) -> &str {
    match stdout.find(['{', '[']) {
        Some(idx) => &stdout[idx..],
        None => stdout,
    }
}
