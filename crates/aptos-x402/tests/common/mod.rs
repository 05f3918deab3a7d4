#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ed25519_dalek::{Signer, SigningKey};

use x402::authenticator::{AccountAuthenticator, SignerPublicKey};
use x402::envelope::encode_envelope;
use x402::ledger::{CommittedTransaction, LedgerClient, PendingTransaction, SimulationOutcome};
use x402::signer::LocalFeePayer;
use x402::transaction::{
    EntryFunction, ModuleId, RawTransaction, SimpleTransaction, StructTag, TransactionPayload,
    TypeTag,
};
use x402::{
    AccountAddress, AcceptedRequirements, AptosSchemeFacilitator, ExactAptosPayload,
    PaymentPayload, PaymentRequirements, X402Error, APTOS_TESTNET,
};

pub const ASSET: &str = "0xa";
pub const RECIPIENT: &str = "0x00000000000000000000000000000000000000000000000000000000000b0b01";
pub const TX_HASH: &str = "0x5e7f2d6a9c1b4e8f0a3d6c9b2e5f8a1d4c7b0e3f6a9d2c5b8e1f4a7d0c3b6e9f";
const SENDER_SEED: [u8; 32] = [7; 32];
const FEE_PAYER_KEY: &str = "0x9bf49a6a0755f953811fce125f2683d50429c3bb49e074147e0089a52eae155f";

#[derive(Debug, Clone)]
pub struct Submission {
    pub transaction: SimpleTransaction,
    pub sender: AccountAuthenticator,
    pub fee_payer: Option<AccountAuthenticator>,
}

#[derive(Debug)]
pub struct LedgerState {
    pub simulation: Result<SimulationOutcome, String>,
    pub submission_error: Option<String>,
    pub confirmation: Result<CommittedTransaction, String>,
    pub simulations: Vec<SignerPublicKey>,
    pub submissions: Vec<Submission>,
    pub confirmations: Vec<String>,
}

/// Ledger call a [`FakeLedger`] can be told to panic in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Simulate,
    Submit,
}

/// In-memory ledger that records every call and answers with canned outcomes.
#[derive(Debug, Clone)]
pub struct FakeLedger {
    pub state: Arc<Mutex<LedgerState>>,
    panic_at: Option<Stage>,
}

impl FakeLedger {
    pub fn succeeding() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                simulation: Ok(SimulationOutcome {
                    success: true,
                    vm_status: "Executed successfully".to_string(),
                }),
                submission_error: None,
                confirmation: Ok(CommittedTransaction {
                    hash: TX_HASH.to_string(),
                    success: true,
                    vm_status: "Executed successfully".to_string(),
                }),
                simulations: vec![],
                submissions: vec![],
                confirmations: vec![],
            })),
            panic_at: None,
        }
    }

    /// Panic (outside the state lock) when `stage` is reached.
    pub fn panicking_at(self, stage: Stage) -> Self {
        Self {
            panic_at: Some(stage),
            ..self
        }
    }

    pub fn with_simulation(self, simulation: Result<SimulationOutcome, String>) -> Self {
        self.state.lock().unwrap().simulation = simulation;
        self
    }

    pub fn with_submission_error(self, message: &str) -> Self {
        self.state.lock().unwrap().submission_error = Some(message.to_string());
        self
    }

    pub fn with_confirmation(self, confirmation: Result<CommittedTransaction, String>) -> Self {
        self.state.lock().unwrap().confirmation = confirmation;
        self
    }

    pub fn simulation_count(&self) -> usize {
        self.state.lock().unwrap().simulations.len()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn confirmations(&self) -> Vec<String> {
        self.state.lock().unwrap().confirmations.clone()
    }
}

impl LedgerClient for FakeLedger {
    async fn simulate(
        &self,
        _transaction: &SimpleTransaction,
        signer: &SignerPublicKey,
    ) -> Result<SimulationOutcome, X402Error> {
        if self.panic_at == Some(Stage::Simulate) {
            panic!("ledger bug in simulate");
        }
        let mut state = self.state.lock().unwrap();
        state.simulations.push(signer.clone());
        state.simulation.clone().map_err(X402Error::SimulationError)
    }

    async fn submit(
        &self,
        transaction: &SimpleTransaction,
        sender: &AccountAuthenticator,
        fee_payer: Option<&AccountAuthenticator>,
    ) -> Result<PendingTransaction, X402Error> {
        if self.panic_at == Some(Stage::Submit) {
            panic!("ledger bug in submit");
        }
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.submission_error {
            return Err(X402Error::SubmissionError(message.clone()));
        }
        state.submissions.push(Submission {
            transaction: transaction.clone(),
            sender: sender.clone(),
            fee_payer: fee_payer.cloned(),
        });
        Ok(PendingTransaction {
            hash: TX_HASH.to_string(),
        })
    }

    async fn await_confirmation(&self, hash: &str) -> Result<CommittedTransaction, X402Error> {
        let mut state = self.state.lock().unwrap();
        state.confirmations.push(hash.to_string());
        state
            .confirmation
            .clone()
            .map_err(X402Error::ConfirmationTimeout)
    }
}

pub fn fee_payer() -> LocalFeePayer {
    LocalFeePayer::from_private_key(FEE_PAYER_KEY).unwrap()
}

pub fn facilitator(ledger: &FakeLedger) -> AptosSchemeFacilitator<FakeLedger, LocalFeePayer> {
    AptosSchemeFacilitator::new(ledger.clone(), fee_payer())
}

pub fn sender_key() -> SigningKey {
    SigningKey::from_bytes(&SENDER_SEED)
}

pub fn sender_address() -> AccountAddress {
    AccountAddress::from_ed25519_public_key(sender_key().verifying_key().as_bytes())
}

pub fn requirements(amount: &str) -> PaymentRequirements {
    PaymentRequirements {
        scheme: "exact".to_string(),
        network: APTOS_TESTNET.to_string(),
        asset: ASSET.to_string(),
        pay_to: RECIPIENT.to_string(),
        amount: amount.to_string(),
        sponsored: false,
        max_timeout_seconds: Some(60),
        extra: None,
        description: None,
        mime_type: None,
    }
}

pub fn sponsored_requirements(amount: &str) -> PaymentRequirements {
    PaymentRequirements {
        sponsored: true,
        ..requirements(amount)
    }
}

pub fn metadata_type() -> TypeTag {
    TypeTag::Struct(Box::new(StructTag {
        address: AccountAddress::ONE,
        module: "fungible_asset".to_string(),
        name: "Metadata".to_string(),
        type_args: vec![],
    }))
}

pub fn transfer_call(asset: &str, recipient: &str, amount: u64) -> EntryFunction {
    let asset: AccountAddress = asset.parse().unwrap();
    let recipient: AccountAddress = recipient.parse().unwrap();
    EntryFunction {
        module: ModuleId {
            address: AccountAddress::ONE,
            name: "primary_fungible_store".to_string(),
        },
        function: "transfer".to_string(),
        ty_args: vec![metadata_type()],
        args: vec![
            bcs::to_bytes(&asset).unwrap(),
            bcs::to_bytes(&recipient).unwrap(),
            bcs::to_bytes(&amount).unwrap(),
        ],
    }
}

/// A fee-payer-aware transaction (fee payer left as `0x0` for the sponsor to fill in).
pub fn transaction(payload: TransactionPayload) -> SimpleTransaction {
    SimpleTransaction {
        raw_txn: RawTransaction {
            sender: sender_address(),
            sequence_number: 12,
            payload,
            max_gas_amount: 2_000,
            gas_unit_price: 100,
            expiration_timestamp_secs: 1_900_000_000,
            chain_id: 2,
        },
        fee_payer_address: Some(AccountAddress::ZERO),
    }
}

/// Sign `transaction` as the test sender and wrap it as an x402 payload.
pub fn signed_payload(transaction: &SimpleTransaction) -> PaymentPayload {
    let key = sender_key();
    let signature = key.sign(&transaction.signing_message().unwrap());
    let auth = AccountAuthenticator::Ed25519 {
        public_key: key.verifying_key().to_bytes().to_vec(),
        signature: signature.to_bytes().to_vec(),
    };
    payload_with(encode_envelope(transaction, &auth).unwrap())
}

pub fn transfer_transaction(amount: u64) -> SimpleTransaction {
    transaction(TransactionPayload::EntryFunction(transfer_call(
        ASSET, RECIPIENT, amount,
    )))
}

pub fn transfer_payload(amount: u64) -> PaymentPayload {
    signed_payload(&transfer_transaction(amount))
}

/// Wrap `transaction` with an arbitrary sender authenticator.
pub fn payload_signed_with(
    transaction: &SimpleTransaction,
    sender: &AccountAuthenticator,
) -> PaymentPayload {
    payload_with(encode_envelope(transaction, sender).unwrap())
}

pub fn payload_with(encoded: String) -> PaymentPayload {
    PaymentPayload {
        x402_version: 2,
        accepted: AcceptedRequirements {
            scheme: "exact".to_string(),
            network: APTOS_TESTNET.to_string(),
        },
        payload: ExactAptosPayload {
            transaction: encoded,
        },
    }
}
