use thiserror::Error;

/// Errors returned by x402 operations.
#[derive(Debug, Error)]
pub enum X402Error {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("simulation error: {0}")]
    SimulationError(String),

    #[error("submission rejected: {0}")]
    SubmissionError(String),

    #[error("confirmation timed out: {0}")]
    ConfirmationTimeout(String),

    #[error("confirmation failed: {0}")]
    ConfirmationError(String),

    #[error("chain error: {0}")]
    ChainError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failures while decoding a payment envelope. No partial result is ever
/// produced alongside one of these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(String),

    #[error("invalid envelope json: {0}")]
    Json(String),

    #[error("invalid bcs: {0}")]
    Bcs(String),

    #[error("unsupported authenticator: {0}")]
    UnsupportedAuthenticator(&'static str),

    #[error("argument {index} missing")]
    MissingArgument { index: usize },

    #[error("invalid address: {0}")]
    Address(String),
}

impl From<bcs::Error> for DecodeError {
    fn from(e: bcs::Error) -> Self {
        DecodeError::Bcs(e.to_string())
    }
}
