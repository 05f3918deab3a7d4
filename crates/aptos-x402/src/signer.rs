//! Fee-sponsor signing capability.
//!
//! The sponsor key is read-only after startup; co-signing produces an
//! independent signature per call and needs no synchronization.

use ed25519_dalek::{Signer, SigningKey};

use crate::address::AccountAddress;
use crate::authenticator::AccountAuthenticator;
use crate::transaction::SimpleTransaction;
use crate::X402Error;

/// AIP-80 prefix for Ed25519 private keys.
const AIP80_ED25519_PREFIX: &str = "ed25519-priv-";

/// Co-signs transactions as their fee payer.
pub trait FeePayerSigner: Send + Sync {
    /// The on-chain account that pays gas.
    fn address(&self) -> AccountAddress;

    /// Sign `transaction` as fee payer. The transaction's fee-payer address
    /// must already be set to [`FeePayerSigner::address`].
    fn co_sign(&self, transaction: &SimpleTransaction) -> Result<AccountAuthenticator, X402Error>;
}

/// Ed25519 fee payer holding its key in process memory.
pub struct LocalFeePayer {
    signing_key: SigningKey,
    address: AccountAddress,
}

impl LocalFeePayer {
    pub fn new(signing_key: SigningKey) -> Self {
        let address =
            AccountAddress::from_ed25519_public_key(signing_key.verifying_key().as_bytes());
        Self {
            signing_key,
            address,
        }
    }

    /// Parse a hex private key, with or without `0x` and the AIP-80 `ed25519-priv-` prefix.
    pub fn from_private_key(key: &str) -> Result<Self, X402Error> {
        let trimmed = key.trim();
        let trimmed = trimmed.strip_prefix(AIP80_ED25519_PREFIX).unwrap_or(trimmed);
        let hex_digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(hex_digits)
            .map_err(|e| X402Error::ConfigError(format!("invalid fee payer key hex: {e}")))?;
        let secret: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            X402Error::ConfigError(format!(
                "fee payer key must be 32 bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::new(SigningKey::from_bytes(&secret)))
    }

    /// Use an explicit account address, for accounts whose key has been rotated.
    pub fn with_address(mut self, address: AccountAddress) -> Self {
        self.address = address;
        self
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl std::fmt::Debug for LocalFeePayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFeePayer")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl FeePayerSigner for LocalFeePayer {
    fn address(&self) -> AccountAddress {
        self.address
    }

    fn co_sign(&self, transaction: &SimpleTransaction) -> Result<AccountAuthenticator, X402Error> {
        match transaction.fee_payer_address {
            Some(addr) if addr == self.address => {}
            Some(other) => {
                return Err(X402Error::SigningError(format!(
                    "fee payer address {other} is not the sponsor {}",
                    self.address
                )))
            }
            None => {
                return Err(X402Error::SigningError(
                    "transaction has no fee payer address".to_string(),
                ))
            }
        }

        let message = transaction
            .signing_message()
            .map_err(|e| X402Error::SigningError(format!("bcs encode failed: {e}")))?;
        let signature = self.signing_key.sign(&message);

        Ok(AccountAuthenticator::Ed25519 {
            public_key: self.public_key().to_vec(),
            signature: signature.to_bytes().to_vec(),
        })
    }
}
