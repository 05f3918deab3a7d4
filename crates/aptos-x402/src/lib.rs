//! x402 `exact` payments on Aptos.
//!
//! A payer signs a `0x1::primary_fungible_store::transfer` transaction
//! off-chain; the facilitator decodes it, checks it against the merchant's
//! requirements, dry-runs it on chain and, on settlement, optionally
//! co-signs as fee payer before submitting and waiting for commit.
//!
//! # Pipeline
//!
//! - [`envelope`]: base64/JSON/BCS decoding of the signed transaction
//! - [`AptosSchemeFacilitator`]: the rule chain (`verify`) and settlement (`settle`)
//! - [`ledger::LedgerClient`]: simulation, submission and confirmation
//! - [`signer::FeePayerSigner`]: sponsor co-signatures for gasless payments
//!
//! # Quick example
//!
//! ```no_run
//! use x402::ledger::RestLedgerClient;
//! use x402::signer::LocalFeePayer;
//! use x402::{AptosSchemeFacilitator, ChainConfig, SchemeFacilitator};
//!
//! # async fn run(payload: x402::PaymentPayload, requirements: x402::PaymentRequirements) {
//! let config = ChainConfig::default();
//! let fee_payer = LocalFeePayer::from_private_key("0xYOUR_KEY").unwrap();
//! let facilitator =
//!     AptosSchemeFacilitator::with_chain_config(RestLedgerClient::new(&config), fee_payer, config);
//!
//! let result = facilitator.settle(&payload, &requirements).await;
//! println!("settled: {} {}", result.success, result.transaction);
//! # }
//! ```

// Core types and traits
pub mod constants;
pub mod error;
pub mod hmac;
pub mod payment;
pub mod response;
pub mod scheme;

// Aptos wire model
pub mod address;
pub mod authenticator;
pub mod envelope;
pub mod keyless;
pub mod transaction;

// Collaborators and the pipeline
pub mod ledger;
pub mod scheme_facilitator;
pub mod signer;

// Re-exports
pub use address::AccountAddress;
pub use constants::ChainConfig;
pub use constants::*;
pub use error::{DecodeError, X402Error};
pub use payment::*;
pub use response::*;
pub use scheme::*;

pub use scheme_facilitator::AptosSchemeFacilitator;
