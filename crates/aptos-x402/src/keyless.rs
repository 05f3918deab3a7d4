//! Keyless (OIDC) and passkey proof shapes.
//!
//! These are never verified here. They are modelled field for field so a
//! `SingleKey` or `MultiKey` authenticator carrying them decodes, and so the
//! payer's proof can be handed back to the node unchanged.

use serde::{Deserialize, Serialize};

use crate::address::AccountAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeylessPublicKey {
    pub iss_val: String,
    /// Identity commitment.
    pub idc: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedKeylessPublicKey {
    /// Account holding the issuer's JWKs.
    pub jwk_addr: AccountAddress,
    pub pk: KeylessPublicKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssertionSignature {
    Secp256r1Ecdsa { signature: Vec<u8> },
}

/// WebAuthn assertion as produced by a passkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialAuthenticatorAssertionResponse {
    pub signature: AssertionSignature,
    pub authenticator_data: Vec<u8>,
    pub client_data_json: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemeralPublicKey {
    Ed25519 { public_key: Vec<u8> },
    Secp256r1Ecdsa { public_key: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemeralSignature {
    Ed25519 { signature: Vec<u8> },
    WebAuthn { signature: PartialAuthenticatorAssertionResponse },
}

/// Compressed BN254 G1 point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct G1Bytes(pub [u8; 32]);

/// Compressed BN254 G2 point, 64 bytes written back to back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct G2Bytes(pub [u8; 32], pub [u8; 32]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub a: G1Bytes,
    pub b: G2Bytes,
    pub c: G1Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zkp {
    Groth16(Groth16Proof),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroKnowledgeSig {
    pub proof: Zkp,
    pub exp_horizon_secs: u64,
    pub extra_field: Option<String>,
    pub override_aud_val: Option<String>,
    pub training_wheels_signature: Option<EphemeralSignature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pepper(pub [u8; 31]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenIdSig {
    pub jwt_sig: Vec<u8>,
    pub jwt_payload_json: String,
    pub uid_key: String,
    pub epk_blinder: Vec<u8>,
    pub pepper: Pepper,
    pub idc_aud_val: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EphemeralCertificate {
    ZeroKnowledgeSig(ZeroKnowledgeSig),
    OpenIdSig(OpenIdSig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeylessSignature {
    pub cert: EphemeralCertificate,
    pub jwt_header_json: String,
    pub exp_date_secs: u64,
    pub ephemeral_pubkey: EphemeralPublicKey,
    pub ephemeral_signature: EphemeralSignature,
}
