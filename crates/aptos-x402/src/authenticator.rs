//! Account and transaction authenticators.
//!
//! Key and signature bytes are carried as length-prefixed byte vectors,
//! matching their BCS encoding on chain.

use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;
use crate::error::DecodeError;
use crate::keyless::{
    FederatedKeylessPublicKey, KeylessPublicKey, KeylessSignature,
    PartialAuthenticatorAssertionResponse,
};

pub const ED25519_SIGNATURE_LENGTH: usize = 64;

const SECP256K1_SIGNATURE_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnyPublicKey {
    Ed25519 { public_key: Vec<u8> },
    Secp256k1Ecdsa { public_key: Vec<u8> },
    Secp256r1Ecdsa { public_key: Vec<u8> },
    Keyless { public_key: KeylessPublicKey },
    FederatedKeyless { public_key: FederatedKeylessPublicKey },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnySignature {
    Ed25519 { signature: Vec<u8> },
    Secp256k1Ecdsa { signature: Vec<u8> },
    WebAuthn { signature: PartialAuthenticatorAssertionResponse },
    Keyless { signature: KeylessSignature },
}

impl AnySignature {
    /// The form of this signature to send to simulation.
    ///
    /// Nodes refuse to simulate transactions carrying valid Ed25519 or
    /// secp256k1 signatures, so those are zeroed. Passkey and keyless proofs
    /// have no zero form the node can parse and are passed through as signed.
    pub fn for_simulation(&self) -> AnySignature {
        match self {
            AnySignature::Ed25519 { .. } => AnySignature::Ed25519 {
                signature: vec![0; ED25519_SIGNATURE_LENGTH],
            },
            AnySignature::Secp256k1Ecdsa { .. } => AnySignature::Secp256k1Ecdsa {
                signature: vec![0; SECP256K1_SIGNATURE_LENGTH],
            },
            AnySignature::WebAuthn { .. } | AnySignature::Keyless { .. } => self.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiKey {
    pub public_keys: Vec<AnyPublicKey>,
    pub signatures_required: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountAuthenticator {
    Ed25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    MultiEd25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    SingleKey {
        public_key: AnyPublicKey,
        signature: AnySignature,
    },
    MultiKey {
        public_keys: MultiKey,
        signatures: Vec<AnySignature>,
        signatures_bitmap: Vec<u8>,
    },
    NoAccountAuthenticator,
}

impl AccountAuthenticator {
    /// Extract the public-key material a sender authenticator carries.
    ///
    /// Only the single Ed25519, generic single-key and threshold multi-key
    /// shapes are accepted from payers.
    pub fn signer_key(&self) -> Result<SignerPublicKey, DecodeError> {
        match self {
            AccountAuthenticator::Ed25519 { public_key, .. } => {
                let key: [u8; 32] = public_key.as_slice().try_into().map_err(|_| {
                    DecodeError::Bcs(format!(
                        "ed25519 public key must be 32 bytes, got {}",
                        public_key.len()
                    ))
                })?;
                Ok(SignerPublicKey::Ed25519(key))
            }
            AccountAuthenticator::SingleKey {
                public_key,
                signature,
            } => Ok(SignerPublicKey::SingleKey {
                public_key: public_key.clone(),
                signature: signature.clone(),
            }),
            AccountAuthenticator::MultiKey {
                public_keys,
                signatures,
                signatures_bitmap,
            } => Ok(SignerPublicKey::MultiKey {
                public_keys: public_keys.clone(),
                signatures: signatures.clone(),
                signatures_bitmap: signatures_bitmap.clone(),
            }),
            AccountAuthenticator::MultiEd25519 { .. } => {
                Err(DecodeError::UnsupportedAuthenticator("multi_ed25519"))
            }
            AccountAuthenticator::NoAccountAuthenticator => {
                Err(DecodeError::UnsupportedAuthenticator("no_account_authenticator"))
            }
        }
    }
}

/// Public-key material extracted from a payer's authenticator, in whatever
/// shape the authenticator variant carries.
///
/// The generic shapes keep the payer's signatures alongside the keys: which
/// keys signed is part of the shape, and some proofs cannot be zeroed for
/// simulation (see [`AnySignature::for_simulation`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerPublicKey {
    Ed25519([u8; 32]),
    SingleKey {
        public_key: AnyPublicKey,
        signature: AnySignature,
    },
    MultiKey {
        public_keys: MultiKey,
        signatures: Vec<AnySignature>,
        signatures_bitmap: Vec<u8>,
    },
}

impl SignerPublicKey {
    /// The authenticator to attach to a dry-run simulation.
    pub fn simulation_authenticator(&self) -> AccountAuthenticator {
        match self {
            SignerPublicKey::Ed25519(key) => AccountAuthenticator::Ed25519 {
                public_key: key.to_vec(),
                signature: vec![0; ED25519_SIGNATURE_LENGTH],
            },
            SignerPublicKey::SingleKey {
                public_key,
                signature,
            } => AccountAuthenticator::SingleKey {
                public_key: public_key.clone(),
                signature: signature.for_simulation(),
            },
            SignerPublicKey::MultiKey {
                public_keys,
                signatures,
                signatures_bitmap,
            } => AccountAuthenticator::MultiKey {
                public_keys: public_keys.clone(),
                signatures: signatures.iter().map(AnySignature::for_simulation).collect(),
                signatures_bitmap: signatures_bitmap.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAuthenticator {
    Ed25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    MultiEd25519 {
        public_key: Vec<u8>,
        signature: Vec<u8>,
    },
    MultiAgent {
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
    },
    FeePayer {
        sender: AccountAuthenticator,
        secondary_signer_addresses: Vec<AccountAddress>,
        secondary_signers: Vec<AccountAuthenticator>,
        fee_payer_address: AccountAddress,
        fee_payer_signer: AccountAuthenticator,
    },
    SingleSender {
        sender: AccountAuthenticator,
    },
}
