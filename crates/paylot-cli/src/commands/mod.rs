//! CLI command implementations

pub mod buy;
pub mod deposit;
pub mod draw;
pub mod merchant;
pub mod serve;
pub mod status;
pub mod transfer;

use anyhow::{Context, Result};
use ethers::types::{Address, H256, U256};
use paylot_adapters::EvmChainClient;
use paylot_core::config::{EXPLORER_TX_URL, TOKEN_DECIMALS};
use paylot_core::PaylotConfig;

/// Load configuration from the environment.
pub(crate) fn load_config() -> Result<PaylotConfig> {
    PaylotConfig::from_env().context("invalid configuration")
}

/// Build the signing chain client, surfacing credential problems before any
/// network call.
pub(crate) fn admin_client(config: &PaylotConfig) -> Result<EvmChainClient> {
    config.require_admin_key()?;
    Ok(EvmChainClient::new(&config.chain)?)
}

pub(crate) fn parse_address(label: &str, value: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .with_context(|| format!("invalid {label} address: {value}"))
}

/// Parse a human token amount at the settlement token's 6 decimals.
pub(crate) fn parse_token_amount(value: &str) -> Result<U256> {
    let parsed = ethers::utils::parse_units(value, TOKEN_DECIMALS)
        .with_context(|| format!("invalid token amount: {value}"))?;
    Ok(parsed.into())
}

/// Block-explorer link for a transaction.
pub(crate) fn explorer_link(tx_hash: H256) -> String {
    format!("{EXPLORER_TX_URL}/{tx_hash:#x}")
}
