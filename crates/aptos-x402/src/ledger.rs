//! Ledger collaborator: dry-run simulation, submission and commit tracking.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::authenticator::{AccountAuthenticator, SignerPublicKey};
use crate::constants::ChainConfig;
use crate::transaction::{SignedTransaction, SimpleTransaction};
use crate::X402Error;

/// Content type the fullnode expects for BCS-encoded signed transactions.
const BCS_SIGNED_TRANSACTION: &str = "application/x.aptos.signed_transaction+bcs";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a dry run. `vm_status` is the node's status text either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationOutcome {
    pub success: bool,
    pub vm_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    pub hash: String,
}

/// A transaction that reached a terminal on-chain state. It may still have
/// aborted; check `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTransaction {
    pub hash: String,
    pub success: bool,
    pub vm_status: String,
}

/// The chain the facilitator simulates and submits against.
pub trait LedgerClient: Send + Sync {
    /// Dry-run `transaction` as if signed by `signer`, without committing anything.
    fn simulate(
        &self,
        transaction: &SimpleTransaction,
        signer: &SignerPublicKey,
    ) -> impl std::future::Future<Output = Result<SimulationOutcome, X402Error>> + Send;

    /// Submit `transaction` with the sender's proof and, for sponsored
    /// transactions, the fee payer's co-signature.
    fn submit(
        &self,
        transaction: &SimpleTransaction,
        sender: &AccountAuthenticator,
        fee_payer: Option<&AccountAuthenticator>,
    ) -> impl std::future::Future<Output = Result<PendingTransaction, X402Error>> + Send;

    /// Wait until `hash` is committed or the client's own timeout elapses.
    fn await_confirmation(
        &self,
        hash: &str,
    ) -> impl std::future::Future<Output = Result<CommittedTransaction, X402Error>> + Send;
}

#[derive(Debug, Deserialize)]
struct TransactionView {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    hash: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

/// Read a non-success response into a readable message.
async fn node_error(resp: reqwest::Response) -> String {
    let status = resp.status();
    match resp.json::<NodeError>().await {
        Ok(NodeError {
            message,
            error_code: Some(code),
        }) => format!("{message} ({code})"),
        Ok(NodeError { message, .. }) => message,
        Err(_) => format!("node returned {status}"),
    }
}

/// [`LedgerClient`] backed by the Aptos fullnode REST API.
#[derive(Debug, Clone)]
pub struct RestLedgerClient {
    client: reqwest::Client,
    base_url: String,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl RestLedgerClient {
    pub fn new(config: &ChainConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.rpc_url.trim_end_matches('/').to_string(),
            confirmation_timeout: config.confirmation_timeout,
            poll_interval: config.poll_interval,
        }
    }

    /// Reuse an existing HTTP client (connection pool, proxies, headers).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_bcs(
        &self,
        path: &str,
        signed: &SignedTransaction,
    ) -> Result<reqwest::Response, String> {
        let body = bcs::to_bytes(signed).map_err(|e| format!("bcs encode failed: {e}"))?;
        self.client
            .post(format!("{}{path}", self.base_url))
            .header(CONTENT_TYPE, BCS_SIGNED_TRANSACTION)
            .timeout(REQUEST_TIMEOUT)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))
    }

    async fn poll_until_committed(&self, hash: &str) -> Result<CommittedTransaction, X402Error> {
        let url = format!("{}/transactions/by_hash/{hash}", self.base_url);
        loop {
            let resp = self
                .client
                .get(&url)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await
                .map_err(|e| X402Error::ConfirmationError(format!("request failed: {e}")))?;

            // Not yet visible to this node.
            if resp.status() == StatusCode::NOT_FOUND {
                tokio::time::sleep(self.poll_interval).await;
                continue;
            }
            if !resp.status().is_success() {
                return Err(X402Error::ConfirmationError(node_error(resp).await));
            }

            let view: TransactionView = resp
                .json()
                .await
                .map_err(|e| X402Error::ConfirmationError(format!("invalid response: {e}")))?;
            if view.kind != "pending_transaction" {
                return Ok(CommittedTransaction {
                    hash: if view.hash.is_empty() {
                        hash.to_string()
                    } else {
                        view.hash
                    },
                    success: view.success.unwrap_or(false),
                    vm_status: view.vm_status.unwrap_or_default(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl LedgerClient for RestLedgerClient {
    async fn simulate(
        &self,
        transaction: &SimpleTransaction,
        signer: &SignerPublicKey,
    ) -> Result<SimulationOutcome, X402Error> {
        let signed =
            SignedTransaction::assemble(transaction, signer.simulation_authenticator(), None);
        let resp = self
            .post_bcs("/transactions/simulate", &signed)
            .await
            .map_err(X402Error::SimulationError)?;
        if !resp.status().is_success() {
            return Err(X402Error::SimulationError(node_error(resp).await));
        }

        let results: Vec<TransactionView> = resp
            .json()
            .await
            .map_err(|e| X402Error::SimulationError(format!("invalid response: {e}")))?;
        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| X402Error::SimulationError("empty simulation result".to_string()))?;

        Ok(SimulationOutcome {
            success: first.success.unwrap_or(false),
            vm_status: first.vm_status.unwrap_or_default(),
        })
    }

    async fn submit(
        &self,
        transaction: &SimpleTransaction,
        sender: &AccountAuthenticator,
        fee_payer: Option<&AccountAuthenticator>,
    ) -> Result<PendingTransaction, X402Error> {
        let signed = SignedTransaction::assemble(transaction, sender.clone(), fee_payer.cloned());
        let resp = self
            .post_bcs("/transactions", &signed)
            .await
            .map_err(X402Error::SubmissionError)?;
        if !resp.status().is_success() {
            return Err(X402Error::SubmissionError(node_error(resp).await));
        }

        let pending: TransactionView = resp
            .json()
            .await
            .map_err(|e| X402Error::SubmissionError(format!("invalid response: {e}")))?;
        if pending.hash.is_empty() {
            return Err(X402Error::SubmissionError(
                "node accepted transaction without a hash".to_string(),
            ));
        }
        Ok(PendingTransaction { hash: pending.hash })
    }

    async fn await_confirmation(&self, hash: &str) -> Result<CommittedTransaction, X402Error> {
        tokio::time::timeout(self.confirmation_timeout, self.poll_until_committed(hash))
            .await
            .map_err(|_| {
                X402Error::ConfirmationTimeout(format!(
                    "{hash} not committed after {}s",
                    self.confirmation_timeout.as_secs()
                ))
            })?
    }
}
