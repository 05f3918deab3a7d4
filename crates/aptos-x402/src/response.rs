use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a payment was rejected. Rendered as the wire reason string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    MissingParameters,
    UnsupportedScheme,
    NetworkMismatch,
    DecodeError,
    MissingEntryFunction,
    WrongFunction,
    WrongTypeArgs,
    WrongArgs,
    AssetMismatch,
    RecipientMismatch,
    AmountMismatch,
    SimulationFailed(String),
    SimulationError(String),
    UnexpectedVerifyError,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::MissingParameters => f.write_str("missing_parameters"),
            InvalidReason::UnsupportedScheme => f.write_str("unsupported_scheme"),
            InvalidReason::NetworkMismatch => f.write_str("network_mismatch"),
            InvalidReason::DecodeError => f.write_str("invalid_payment_decode_error"),
            InvalidReason::MissingEntryFunction => {
                f.write_str("invalid_payment_missing_entry_function")
            }
            InvalidReason::WrongFunction => f.write_str("invalid_payment_wrong_function"),
            InvalidReason::WrongTypeArgs => f.write_str("invalid_payment_wrong_type_args"),
            InvalidReason::WrongArgs => f.write_str("invalid_payment_wrong_args"),
            InvalidReason::AssetMismatch => f.write_str("invalid_payment_asset_mismatch"),
            InvalidReason::RecipientMismatch => f.write_str("invalid_payment_recipient_mismatch"),
            InvalidReason::AmountMismatch => f.write_str("invalid_payment_amount_mismatch"),
            InvalidReason::SimulationFailed(status) => write!(f, "simulation_failed: {status}"),
            InvalidReason::SimulationError(message) => write!(f, "simulation_error: {message}"),
            InvalidReason::UnexpectedVerifyError => f.write_str("unexpected_verify_error"),
        }
    }
}

/// Response from the facilitator's `/verify` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    /// Sender address once decodable, empty before that.
    #[serde(default)]
    pub payer: String,
}

impl VerifyResponse {
    pub fn valid(payer: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            invalid_reason: None,
            payer: payer.into(),
        }
    }

    pub fn invalid(reason: InvalidReason, payer: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            invalid_reason: Some(reason.to_string()),
            payer: payer.into(),
        }
    }
}

/// Response from the facilitator's `/settle` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default)]
    pub payer: String,
    /// Transaction hash, empty on failure.
    #[serde(default)]
    pub transaction: String,
    pub network: String,
}

impl SettleResponse {
    pub fn settled(transaction: String, network: impl Into<String>, payer: String) -> Self {
        Self {
            success: true,
            error_reason: None,
            payer,
            transaction,
            network: network.into(),
        }
    }

    pub fn failed(reason: impl Into<String>, network: impl Into<String>, payer: String) -> Self {
        Self {
            success: false,
            error_reason: Some(reason.into()),
            payer,
            transaction: String::new(),
            network: network.into(),
        }
    }
}
