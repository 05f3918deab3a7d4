use std::time::Duration;

use crate::address::AccountAddress;

/// x402 protocol version spoken by this facilitator.
pub const X402_VERSION: u32 = 2;

/// x402 scheme name for exact-amount fungible-asset transfers.
pub const SCHEME_NAME: &str = "exact";

/// CAIP-2 style network identifier for Aptos mainnet.
pub const APTOS_MAINNET: &str = "aptos:1";

/// CAIP-2 style network identifier for Aptos testnet.
pub const APTOS_TESTNET: &str = "aptos:2";

pub const MAINNET_RPC_URL: &str = "https://fullnode.mainnet.aptoslabs.com/v1";

pub const TESTNET_RPC_URL: &str = "https://fullnode.testnet.aptoslabs.com/v1";

/// Default upper bound on waiting for a submitted transaction to commit.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(30);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Identity of the single entry function an exact payment may call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFunction {
    pub module_address: AccountAddress,
    pub module_name: &'static str,
    pub function_name: &'static str,
    pub type_arg_count: usize,
    pub arg_count: usize,
}

/// `0x1::primary_fungible_store::transfer<0x1::fungible_asset::Metadata>(asset, recipient, amount)`
pub const FUNGIBLE_ASSET_TRANSFER: TransferFunction = TransferFunction {
    module_address: AccountAddress::ONE,
    module_name: "primary_fungible_store",
    function_name: "transfer",
    type_arg_count: 1,
    arg_count: 3,
};

/// Runtime chain configuration. Decouples the scheme implementation from
/// compile-time constants so one binary can serve mainnet or testnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub network: String,
    pub scheme_name: String,
    pub rpc_url: String,
    pub transfer_function: TransferFunction,
    pub confirmation_timeout: Duration,
    pub poll_interval: Duration,
}

impl ChainConfig {
    /// Configuration for a known network id, or `None` for anything else.
    pub fn for_network(network: &str) -> Option<Self> {
        let rpc_url = match network {
            APTOS_MAINNET => MAINNET_RPC_URL,
            APTOS_TESTNET => TESTNET_RPC_URL,
            _ => return None,
        };
        Some(Self {
            network: network.to_string(),
            rpc_url: rpc_url.to_string(),
            ..Self::default()
        })
    }
}

impl Default for ChainConfig {
    /// Defaults to Aptos testnet.
    fn default() -> Self {
        Self {
            network: APTOS_TESTNET.to_string(),
            scheme_name: SCHEME_NAME.to_string(),
            rpc_url: TESTNET_RPC_URL.to_string(),
            transfer_function: FUNGIBLE_ASSET_TRANSFER,
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_network() {
        let mainnet = ChainConfig::for_network(APTOS_MAINNET).unwrap();
        assert_eq!(mainnet.rpc_url, MAINNET_RPC_URL);
        assert_eq!(mainnet.scheme_name, "exact");
        assert!(ChainConfig::for_network("eip155:1").is_none());
    }
}
