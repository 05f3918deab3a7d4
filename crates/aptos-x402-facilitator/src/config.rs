use x402::{AccountAddress, ChainConfig, X402Error, APTOS_TESTNET};

/// Facilitator settings, read once at startup.
///
/// Deliberately not `Debug`: it holds the sponsor's private key.
pub struct FacilitatorConfig {
    pub fee_payer_private_key: String,
    /// Explicit sponsor address for accounts whose key has been rotated.
    pub fee_payer_address: Option<AccountAddress>,
    pub chain: ChainConfig,
    pub port: u16,
    pub rate_limit_rpm: u64,
    pub allowed_origins: Vec<String>,
    /// When set, `/verify` and `/settle` require an `X-Facilitator-Auth` HMAC.
    pub hmac_secret: Option<Vec<u8>>,
    pub metrics_token: Option<Vec<u8>>,
}

impl FacilitatorConfig {
    pub fn from_env() -> Result<Self, X402Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, X402Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fee_payer_private_key = get("FEE_PAYER_PRIVATE_KEY").ok_or_else(|| {
            X402Error::ConfigError(
                "FEE_PAYER_PRIVATE_KEY environment variable is required".to_string(),
            )
        })?;

        let fee_payer_address = get("FEE_PAYER_ADDRESS")
            .map(|a| a.parse::<AccountAddress>())
            .transpose()
            .map_err(|e| X402Error::ConfigError(format!("invalid FEE_PAYER_ADDRESS: {e}")))?;

        let network = get("APTOS_NETWORK").unwrap_or_else(|| APTOS_TESTNET.to_string());
        let mut chain = ChainConfig::for_network(&network).ok_or_else(|| {
            X402Error::ConfigError(format!(
                "unsupported APTOS_NETWORK '{network}' (expected aptos:1 or aptos:2)"
            ))
        })?;
        if let Some(rpc_url) = get("APTOS_RPC_URL") {
            chain.rpc_url = rpc_url;
        }
        if let Some(secs) = get("CONFIRMATION_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                X402Error::ConfigError(format!("invalid CONFIRMATION_TIMEOUT_SECS: {e}"))
            })?;
            chain.confirmation_timeout = std::time::Duration::from_secs(secs);
        }

        let port: u16 = get("FACILITATOR_PORT")
            .or_else(|| get("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(4022);

        let rate_limit_rpm: u64 = get("RATE_LIMIT_RPM")
            .and_then(|r| r.parse().ok())
            .unwrap_or(120);

        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let hmac_secret = get("FACILITATOR_SHARED_SECRET").map(String::into_bytes);
        if let Some(secret) = &hmac_secret {
            if secret.len() < 32 {
                tracing::warn!(
                    "FACILITATOR_SHARED_SECRET is only {} bytes (minimum 32 recommended)",
                    secret.len()
                );
            }
        }

        Ok(Self {
            fee_payer_private_key,
            fee_payer_address,
            chain,
            port,
            rate_limit_rpm,
            allowed_origins,
            hmac_secret,
            metrics_token: get("METRICS_TOKEN").map(String::into_bytes),
        })
    }
}
