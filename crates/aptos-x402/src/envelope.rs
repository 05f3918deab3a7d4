//! Payment envelope codec.
//!
//! The `transaction` field of an exact-scheme payload is base64 text of a
//! JSON object holding two byte arrays: the BCS `SimpleTransaction` and the
//! BCS sender `AccountAuthenticator`.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::authenticator::{AccountAuthenticator, SignerPublicKey};
use crate::error::{DecodeError, X402Error};
use crate::transaction::{EntryFunction, SimpleTransaction};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct WireEnvelope {
    transaction: Vec<u8>,
    sender_authenticator: Vec<u8>,
}

/// A fully decoded payment envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEnvelope {
    pub transaction: SimpleTransaction,
    pub sender_authenticator: AccountAuthenticator,
    pub signer_key: SignerPublicKey,
}

impl DecodedEnvelope {
    pub fn sender(&self) -> AccountAddress {
        self.transaction.sender()
    }

    pub fn entry_function(&self) -> Option<&EntryFunction> {
        self.transaction.entry_function()
    }
}

/// Decode the opaque base64 `transaction` field of a payment payload.
pub fn decode_envelope(encoded: &str) -> Result<DecodedEnvelope, DecodeError> {
    let json = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;
    let wire: WireEnvelope =
        serde_json::from_slice(&json).map_err(|e| DecodeError::Json(e.to_string()))?;

    let transaction: SimpleTransaction = bcs::from_bytes(&wire.transaction)?;
    let sender_authenticator: AccountAuthenticator = bcs::from_bytes(&wire.sender_authenticator)?;
    let signer_key = sender_authenticator.signer_key()?;

    Ok(DecodedEnvelope {
        transaction,
        sender_authenticator,
        signer_key,
    })
}

/// Build the base64 `transaction` field for a signed transaction.
pub fn encode_envelope(
    transaction: &SimpleTransaction,
    sender_authenticator: &AccountAuthenticator,
) -> Result<String, X402Error> {
    let wire = WireEnvelope {
        transaction: bcs::to_bytes(transaction).map_err(DecodeError::from)?,
        sender_authenticator: bcs::to_bytes(sender_authenticator).map_err(DecodeError::from)?,
    };
    let json = serde_json::to_vec(&wire)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(json))
}
