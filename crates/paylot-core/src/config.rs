//! Configuration for the paylot client.
//!
//! The deployment is fixed: one lottery contract, one settlement token and one
//! entropy provider on Arbitrum Sepolia, plus the Hermes price-oracle service.
//! The defaults below encode that deployment; environment variables override
//! the credential, the RPC endpoint and the log level.
//!
//! # Environment variables
//!
//! - `ADMIN_PRIVATE_KEY` - admin signing credential, `0x`-prefixed 32-byte hex
//! - `PAYLOT_RPC_URL` - JSON-RPC endpoint override
//! - `PAYLOT_LOG_LEVEL` - logging level (trace, debug, info, warn, error)

use crate::{PaylotError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chain id of Arbitrum Sepolia.
pub const ARBITRUM_SEPOLIA_CHAIN_ID: u64 = 421614;

/// Public JSON-RPC endpoint for Arbitrum Sepolia.
pub const DEFAULT_RPC_URL: &str = "https://sepolia-rollup.arbitrum.io/rpc";

/// Deployed payment-lottery contract.
pub const LOTTERY_ADDRESS: &str = "0x41C89b87c56CE3A21e58725CF22A8553FDF7d37a";

/// Settlement token (ERC-20, 6 decimals).
pub const TOKEN_ADDRESS: &str = "0x637A1259C6afd7E3AdF63993cA7E58BB438aB1B1";

/// Entropy provider charging a per-request fee read via `getFeeV2()`.
pub const ENTROPY_ADDRESS: &str = "0x549Ebba8036Ab746611B4fFA1423eb0A4Df61440";

/// Hermes price-oracle service.
pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network";

/// ETH/USD price feed id consumed by the lottery contract.
pub const PRICE_FEED_ID: &str =
    "0xff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace";

/// Decimal places of the settlement token.
pub const TOKEN_DECIMALS: u32 = 6;

/// Block-explorer base for transaction links.
pub const EXPLORER_TX_URL: &str = "https://sepolia.arbiscan.io/tx";

/// Complete paylot configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaylotConfig {
    pub chain: ChainConfig,
    pub oracle: OracleConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
}

/// Chain endpoint, contract addresses and the admin signing credential.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub lottery_address: String,
    pub token_address: String,
    pub entropy_address: String,
    /// Admin signing credential (`0x`-prefixed 32-byte hex). Required for the
    /// draw sequence and the admin-only contract calls; read-only commands and
    /// server startup work without it.
    pub admin_key_hex: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            chain_id: ARBITRUM_SEPOLIA_CHAIN_ID,
            lottery_address: LOTTERY_ADDRESS.into(),
            token_address: TOKEN_ADDRESS.into(),
            entropy_address: ENTROPY_ADDRESS.into(),
            admin_key_hex: None,
        }
    }
}

/// Price-oracle endpoint configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OracleConfig {
    pub hermes_base_url: String,
    pub price_feed_id: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            hermes_base_url: DEFAULT_HERMES_URL.into(),
            price_feed_id: PRICE_FEED_ID.into(),
        }
    }
}

/// Fixed delays and transport timeouts.
///
/// The callback and approval waits are blind, elapsed-time delays; nothing
/// observes the event they wait for. That is the specified behavior of the
/// wrapped contract flow, kept as-is.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Wait after the randomness request for the entropy callback.
    pub callback_wait: Duration,
    /// Wait between an ERC-20 approval and the call that spends it.
    pub approval_wait: Duration,
    /// Timeout for oracle HTTP requests.
    pub http_timeout: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            callback_wait: Duration::from_secs(10),
            approval_wait: Duration::from_secs(2),
            http_timeout: Duration::from_secs(10),
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into() }
    }
}

impl Default for PaylotConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            oracle: OracleConfig::default(),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PaylotConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PaylotConfigBuilder {
        PaylotConfigBuilder::default()
    }

    /// Load configuration from environment variables on top of the fixed
    /// deployment defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("ADMIN_PRIVATE_KEY") {
            config.chain.admin_key_hex = Some(key);
        }

        if let Ok(url) = std::env::var("PAYLOT_RPC_URL") {
            config.chain.rpc_url = url;
        }

        if let Ok(level) = std::env::var("PAYLOT_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Postconditions:
    /// - A present admin credential is well-formed.
    /// - Endpoint URLs parse; no network traffic is generated here.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref key) = self.chain.admin_key_hex {
            validate_admin_key(key)?;
        }

        if self.chain.chain_id == 0 {
            return Err(PaylotError::ConfigError("chain_id must be non-zero".into()));
        }

        url::Url::parse(&self.chain.rpc_url)
            .map_err(|e| PaylotError::ConfigError(format!("invalid rpc_url: {e}")))?;
        url::Url::parse(&self.oracle.hermes_base_url)
            .map_err(|e| PaylotError::ConfigError(format!("invalid hermes_base_url: {e}")))?;

        let feed = &self.oracle.price_feed_id;
        let feed_hex = feed
            .strip_prefix("0x")
            .ok_or_else(|| PaylotError::ConfigError("price_feed_id must be 0x-prefixed".into()))?;
        if feed_hex.len() != 64 || hex::decode(feed_hex).is_err() {
            return Err(PaylotError::ConfigError(
                "price_feed_id must be 32 bytes of hex".into(),
            ));
        }

        if self.timing.http_timeout.is_zero() {
            return Err(PaylotError::ConfigError("http_timeout must be > 0".into()));
        }

        Ok(())
    }

    /// Return the admin credential or the configuration error reported before
    /// any transaction is attempted.
    pub fn require_admin_key(&self) -> Result<&str> {
        let key = self.chain.admin_key_hex.as_deref().ok_or_else(|| {
            PaylotError::ConfigError(
                "admin private key not configured (set ADMIN_PRIVATE_KEY)".into(),
            )
        })?;
        validate_admin_key(key)?;
        Ok(key)
    }
}

/// Check the shape of the admin signing credential.
///
/// The credential must be `0x`-prefixed 32-byte hex. Rejection happens here,
/// before any network call.
pub fn validate_admin_key(key: &str) -> Result<()> {
    let Some(body) = key.strip_prefix("0x") else {
        return Err(PaylotError::ConfigError(
            "invalid admin private key format: must start with 0x".into(),
        ));
    };
    if body.len() != 64 {
        return Err(PaylotError::ConfigError(
            "admin private key must be 32 bytes (64 hex characters after 0x)".into(),
        ));
    }
    if hex::decode(body).is_err() {
        return Err(PaylotError::ConfigError(
            "admin private key is not valid hex".into(),
        ));
    }
    Ok(())
}

/// Builder for `PaylotConfig`.
#[derive(Default)]
pub struct PaylotConfigBuilder {
    config: PaylotConfig,
}

impl PaylotConfigBuilder {
    /// Set the admin signing credential.
    pub fn admin_key_hex(mut self, key: impl Into<String>) -> Self {
        self.config.chain.admin_key_hex = Some(key.into());
        self
    }

    /// Set the JSON-RPC endpoint.
    pub fn rpc_url(mut self, url: impl Into<String>) -> Self {
        self.config.chain.rpc_url = url.into();
        self
    }

    /// Set the Hermes base URL.
    pub fn hermes_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.oracle.hermes_base_url = url.into();
        self
    }

    /// Set the entropy-callback wait.
    pub fn callback_wait(mut self, wait: Duration) -> Self {
        self.config.timing.callback_wait = wait;
        self
    }

    /// Set the approval wait.
    pub fn approval_wait(mut self, wait: Duration) -> Self {
        self.config.timing.approval_wait = wait;
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PaylotConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
