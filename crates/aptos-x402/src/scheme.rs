//! Core trait definitions for the facilitator role.
//!
//! - [`SchemeFacilitator`]: verifies and settles payments
//! - [`crate::ledger::LedgerClient`]: the chain it simulates and submits against
//! - [`crate::signer::FeePayerSigner`]: the sponsor that co-signs gasless payments
//!
//! See [`crate::scheme_facilitator::AptosSchemeFacilitator`] for the Aptos implementation.

use crate::payment::{PaymentPayload, PaymentRequirements};
use crate::response::{SettleResponse, VerifyResponse};

/// Facilitator-side scheme: verifies and settles payments.
///
/// Both operations always produce a structured result; failures are reported
/// through `invalid_reason` / `error_reason` rather than as errors.
pub trait SchemeFacilitator: Send + Sync {
    /// Verify a payment payload against the requirements, including a dry run on chain.
    fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = VerifyResponse> + Send;

    /// Settle a payment on-chain (re-verifies first, then submits and waits for commit).
    fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> impl std::future::Future<Output = SettleResponse> + Send;
}
