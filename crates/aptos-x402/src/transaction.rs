//! BCS model of Aptos transactions.
//!
//! Enum variant order is the wire tag order and must not be changed.
//! Variants that this facilitator never acts on are still modelled so that a
//! well-formed transaction carrying them decodes (and is then rejected by the
//! validator) instead of failing as malformed bytes.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::address::AccountAddress;
use crate::authenticator::{AccountAuthenticator, TransactionAuthenticator};
use crate::error::DecodeError;

/// Move identifiers are plain UTF-8 strings on the wire.
pub type Identifier = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: Identifier,
    pub name: Identifier,
    pub type_args: Vec<TypeTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: Identifier,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    pub module: ModuleId,
    pub function: Identifier,
    pub ty_args: Vec<TypeTag>,
    /// Each argument is itself BCS-encoded; its type is only known to the callee.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    fn arg(&self, index: usize) -> Result<&[u8], DecodeError> {
        self.args
            .get(index)
            .map(Vec::as_slice)
            .ok_or(DecodeError::MissingArgument { index })
    }

    /// Decode positional argument `index` as an account address.
    pub fn address_arg(&self, index: usize) -> Result<AccountAddress, DecodeError> {
        Ok(bcs::from_bytes(self.arg(index)?)?)
    }

    /// Decode positional argument `index` as a `u64`.
    pub fn u64_arg(&self, index: usize) -> Result<u64, DecodeError> {
        Ok(bcs::from_bytes(self.arg(index)?)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionArgument {
    U8(u8),
    U64(u64),
    U128(u128),
    Address(AccountAddress),
    U8Vector(Vec<u8>),
    Bool(bool),
    U16(u16),
    U32(u32),
    U256([u8; 32]),
    Serialized(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code: Vec<u8>,
    pub ty_args: Vec<TypeTag>,
    pub args: Vec<TransactionArgument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub code: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultisigTransactionPayload {
    EntryFunction(EntryFunction),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Multisig {
    pub multisig_address: AccountAddress,
    pub transaction_payload: Option<MultisigTransactionPayload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    Script(Script),
    /// Deprecated on chain, kept for tag alignment.
    ModuleBundle(Vec<Module>),
    EntryFunction(EntryFunction),
    Multisig(Multisig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    pub expiration_timestamp_secs: u64,
    pub chain_id: u8,
}

/// A raw transaction plus the optional fee-payer address, as produced by
/// wallets building a (possibly sponsored) single-signer transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleTransaction {
    pub raw_txn: RawTransaction,
    pub fee_payer_address: Option<AccountAddress>,
}

impl SimpleTransaction {
    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    /// The entry function call, if the payload is one.
    pub fn entry_function(&self) -> Option<&EntryFunction> {
        match &self.raw_txn.payload {
            TransactionPayload::EntryFunction(f) => Some(f),
            TransactionPayload::Script(_)
            | TransactionPayload::ModuleBundle(_)
            | TransactionPayload::Multisig(_) => None,
        }
    }

    /// Bytes every signer of this transaction signs over.
    ///
    /// Fee-payer-aware transactions sign the `MultiAgentWithFeePayer` message;
    /// plain transactions sign the raw transaction itself.
    pub fn signing_message(&self) -> Result<Vec<u8>, bcs::Error> {
        match self.fee_payer_address {
            Some(fee_payer_address) => RawTransactionWithData::MultiAgentWithFeePayer {
                raw_txn: self.raw_txn.clone(),
                secondary_signer_addresses: vec![],
                fee_payer_address,
            }
            .signing_message(),
            None => prefixed_message("RawTransaction", &self.raw_txn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawTransactionWithData {
    MultiAgent {
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
    },
    MultiAgentWithFeePayer {
        raw_txn: RawTransaction,
        secondary_signer_addresses: Vec<AccountAddress>,
        fee_payer_address: AccountAddress,
    },
}

impl RawTransactionWithData {
    pub fn signing_message(&self) -> Result<Vec<u8>, bcs::Error> {
        prefixed_message("RawTransactionWithData", self)
    }
}

/// `sha3_256("APTOS::" || type_name) || bcs(value)`
fn prefixed_message<T: Serialize>(type_name: &str, value: &T) -> Result<Vec<u8>, bcs::Error> {
    let mut hasher = Sha3_256::new();
    hasher.update(b"APTOS::");
    hasher.update(type_name.as_bytes());
    let mut message = hasher.finalize().to_vec();
    message.extend(bcs::to_bytes(value)?);
    Ok(message)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub authenticator: TransactionAuthenticator,
}

impl SignedTransaction {
    /// Assemble the submission form of `transaction`. When a fee-payer
    /// authenticator is supplied the transaction must already carry the
    /// fee-payer address it was signed for.
    pub fn assemble(
        transaction: &SimpleTransaction,
        sender: AccountAuthenticator,
        fee_payer: Option<AccountAuthenticator>,
    ) -> Self {
        let authenticator = match (transaction.fee_payer_address, fee_payer) {
            (Some(fee_payer_address), Some(fee_payer_signer)) => {
                TransactionAuthenticator::FeePayer {
                    sender,
                    secondary_signer_addresses: vec![],
                    secondary_signers: vec![],
                    fee_payer_address,
                    fee_payer_signer,
                }
            }
            (Some(fee_payer_address), None) => TransactionAuthenticator::FeePayer {
                sender,
                secondary_signer_addresses: vec![],
                secondary_signers: vec![],
                fee_payer_address,
                fee_payer_signer: AccountAuthenticator::NoAccountAuthenticator,
            },
            (None, _) => TransactionAuthenticator::SingleSender { sender },
        };
        Self {
            raw_txn: transaction.raw_txn.clone(),
            authenticator,
        }
    }
}
