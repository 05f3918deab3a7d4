use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::address::AccountAddress;
use crate::envelope::{decode_envelope, DecodedEnvelope};
use crate::ledger::LedgerClient;
use crate::signer::FeePayerSigner;
use crate::{
    ChainConfig, InvalidReason, PaymentPayload, PaymentRequirements, SchemeFacilitator,
    SettleResponse, VerifyResponse, X402Error,
};

/// Outcome of the rule chain. A passing envelope is handed back so settlement
/// does not decode it twice.
enum Verdict {
    Rejected(VerifyResponse),
    Accepted(DecodedEnvelope),
}

fn reject(reason: InvalidReason, payer: &str) -> Verdict {
    Verdict::Rejected(VerifyResponse::invalid(reason, payer))
}

/// Best-effort text of a caught panic payload.
fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

/// Facilitator-side scheme implementation for exact fungible-asset payments on Aptos.
///
/// Holds no per-request state; concurrent calls share only the read-only
/// ledger client and fee payer.
pub struct AptosSchemeFacilitator<L, S> {
    ledger: L,
    fee_payer: S,
    config: ChainConfig,
}

impl<L, S> AptosSchemeFacilitator<L, S>
where
    L: LedgerClient,
    S: FeePayerSigner,
{
    /// Create a new facilitator with Aptos testnet defaults.
    pub fn new(ledger: L, fee_payer: S) -> Self {
        Self::with_chain_config(ledger, fee_payer, ChainConfig::default())
    }

    /// Create a new facilitator with a custom chain configuration.
    pub fn with_chain_config(ledger: L, fee_payer: S, config: ChainConfig) -> Self {
        Self {
            ledger,
            fee_payer,
            config,
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Address that co-signs sponsored settlements.
    pub fn fee_payer_address(&self) -> AccountAddress {
        self.fee_payer.address()
    }

    /// Ordered, fail-fast rule chain. Exactly one reason is reported.
    async fn check(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Verdict {
        // 1. Scheme
        if payload.accepted.scheme != self.config.scheme_name
            || requirements.scheme != self.config.scheme_name
        {
            return reject(InvalidReason::UnsupportedScheme, "");
        }

        // 2. Network (exact string match, and it must be the chain we talk to)
        if payload.accepted.network != requirements.network
            || requirements.network != self.config.network
        {
            return reject(InvalidReason::NetworkMismatch, "");
        }

        // 3. Decode
        let envelope = match decode_envelope(&payload.payload.transaction) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::info!(error = %e, "payment envelope could not be decoded");
                return reject(InvalidReason::DecodeError, "");
            }
        };
        let payer = envelope.sender().to_string();

        // 4. Entry function present
        let Some(call) = envelope.entry_function() else {
            return reject(InvalidReason::MissingEntryFunction, &payer);
        };

        // 5. Canonical transfer identity
        let target = &self.config.transfer_function;
        if call.module.address != target.module_address
            || call.module.name != target.module_name
            || call.function != target.function_name
        {
            return reject(InvalidReason::WrongFunction, &payer);
        }

        // 6-7. Shape
        if call.ty_args.len() != target.type_arg_count {
            return reject(InvalidReason::WrongTypeArgs, &payer);
        }
        if call.args.len() != target.arg_count {
            return reject(InvalidReason::WrongArgs, &payer);
        }

        // 8. Asset
        if !address_matches(call.address_arg(0), &requirements.asset) {
            return reject(InvalidReason::AssetMismatch, &payer);
        }

        // 9. Recipient
        if !address_matches(call.address_arg(1), &requirements.pay_to) {
            return reject(InvalidReason::RecipientMismatch, &payer);
        }

        // 10. Amount: canonical decimal rendering must equal the requirement byte for byte.
        let amount_matches = call
            .u64_arg(2)
            .is_ok_and(|amount| amount.to_string() == requirements.amount);
        if !amount_matches {
            return reject(InvalidReason::AmountMismatch, &payer);
        }

        // 11. Dry run
        match self
            .ledger
            .simulate(&envelope.transaction, &envelope.signer_key)
            .await
        {
            Ok(outcome) if outcome.success => {}
            Ok(outcome) => {
                tracing::info!(
                    payer = %payer,
                    vm_status = %outcome.vm_status,
                    "payment rejected: simulation failed"
                );
                return reject(InvalidReason::SimulationFailed(outcome.vm_status), &payer);
            }
            Err(e) => {
                tracing::warn!(payer = %payer, error = %e, "simulation request failed");
                let message = match e {
                    X402Error::SimulationError(message) => message,
                    other => other.to_string(),
                };
                return reject(InvalidReason::SimulationError(message), &payer);
            }
        }

        Verdict::Accepted(envelope)
    }

    /// Run the rule chain. A panic anywhere inside it, collaborators included,
    /// is reported as `unexpected_verify_error` instead of unwinding the caller.
    async fn run_verification(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Verdict {
        match AssertUnwindSafe(self.check(payload, requirements))
            .catch_unwind()
            .await
        {
            Ok(verdict) => verdict,
            Err(panic) => {
                tracing::error!(
                    error = panic_message(panic.as_ref()),
                    "unexpected verification error"
                );
                reject(InvalidReason::UnexpectedVerifyError, "")
            }
        }
    }

    /// Sign, submit and wait for `envelope`. Returns the committed hash.
    async fn execute(
        &self,
        mut envelope: DecodedEnvelope,
        sponsored: bool,
    ) -> Result<String, X402Error> {
        let fee_payer_auth = if sponsored {
            envelope.transaction.fee_payer_address = Some(self.fee_payer.address());
            Some(self.fee_payer.co_sign(&envelope.transaction)?)
        } else {
            None
        };

        let pending = self
            .ledger
            .submit(
                &envelope.transaction,
                &envelope.sender_authenticator,
                fee_payer_auth.as_ref(),
            )
            .await?;
        tracing::debug!(tx = %pending.hash, sponsored, "transaction submitted");

        let committed = self.ledger.await_confirmation(&pending.hash).await?;
        if !committed.success {
            return Err(X402Error::ConfirmationError(format!(
                "{} failed on chain: {}",
                committed.hash, committed.vm_status
            )));
        }
        Ok(committed.hash)
    }
}

/// Compare a decoded address argument against an address string from the requirements.
fn address_matches(
    decoded: Result<AccountAddress, crate::DecodeError>,
    expected: &str,
) -> bool {
    match (decoded, expected.parse::<AccountAddress>()) {
        (Ok(actual), Ok(expected)) => actual == expected,
        _ => false,
    }
}

impl<L, S> SchemeFacilitator for AptosSchemeFacilitator<L, S>
where
    L: LedgerClient,
    S: FeePayerSigner,
{
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> VerifyResponse {
        match self.run_verification(payload, requirements).await {
            Verdict::Rejected(response) => response,
            Verdict::Accepted(envelope) => {
                let payer = envelope.sender().to_string();
                tracing::info!(
                    payer = %payer,
                    amount = %requirements.amount,
                    "payment verification succeeded"
                );
                VerifyResponse::valid(payer)
            }
        }
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> SettleResponse {
        let network = requirements.network.clone();

        // Always re-verify; a prior /verify call is never trusted.
        let envelope = match self.run_verification(payload, requirements).await {
            Verdict::Accepted(envelope) => envelope,
            Verdict::Rejected(check) => {
                tracing::warn!(
                    payer = %check.payer,
                    reason = check.invalid_reason.as_deref().unwrap_or("unknown"),
                    "settlement rejected after re-verification"
                );
                return SettleResponse {
                    success: false,
                    error_reason: check.invalid_reason,
                    payer: check.payer,
                    transaction: String::new(),
                    network,
                };
            }
        };

        let payer = envelope.sender().to_string();
        let sponsored = requirements.is_sponsored();

        let outcome = match AssertUnwindSafe(self.execute(envelope, sponsored))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => Err(X402Error::ChainError(format!(
                "unexpected settlement error: {}",
                panic_message(panic.as_ref())
            ))),
        };

        match outcome {
            Ok(hash) => {
                tracing::info!(
                    payer = %payer,
                    amount = %requirements.amount,
                    sponsored,
                    tx = %hash,
                    "payment settled successfully"
                );
                SettleResponse::settled(hash, network, payer)
            }
            Err(e) => {
                tracing::error!(payer = %payer, error = %e, "settlement failed");
                SettleResponse::failed(format!("transaction_failed: {e}"), network, payer)
            }
        }
    }
}
