use x402::ledger::RestLedgerClient;
use x402::signer::LocalFeePayer;
use x402::{AptosSchemeFacilitator, ChainConfig, X402Error};

use crate::config::FacilitatorConfig;

/// The facilitator as wired in production: fullnode REST client and an in-memory sponsor key.
pub type Facilitator = AptosSchemeFacilitator<RestLedgerClient, LocalFeePayer>;

/// Shared application state for the facilitator server.
pub struct AppState {
    pub facilitator: Facilitator,
    pub chain_config: ChainConfig,
    /// HMAC shared secret for `/verify` and `/settle`. `None` leaves them open.
    pub hmac_secret: Option<Vec<u8>>,
    /// Bearer token for `/metrics`.
    pub metrics_token: Option<Vec<u8>>,
}

impl AppState {
    /// Parse the sponsor key, connect the ledger client and assemble the state.
    pub fn from_config(config: &FacilitatorConfig) -> Result<Self, X402Error> {
        let mut fee_payer = LocalFeePayer::from_private_key(&config.fee_payer_private_key)?;
        if let Some(address) = config.fee_payer_address {
            fee_payer = fee_payer.with_address(address);
        }

        let ledger = RestLedgerClient::new(&config.chain);
        let facilitator =
            AptosSchemeFacilitator::with_chain_config(ledger, fee_payer, config.chain.clone());

        Ok(Self {
            facilitator,
            chain_config: config.chain.clone(),
            hmac_secret: config.hmac_secret.clone(),
            metrics_token: config.metrics_token.clone(),
        })
    }
}
