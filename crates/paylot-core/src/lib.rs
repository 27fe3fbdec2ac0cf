use thiserror::Error;

pub mod config;
pub mod draw;
pub mod egress;
pub mod pricefeed;

pub use config::PaylotConfig;
pub use draw::{
    run_draw, DrawChain, DrawRun, DrawStep, DrawStepUpdate, PriceUpdateSource, Sleeper, StepStatus,
    ThreadSleeper,
};

/// Unified error type for paylot operations.
#[derive(Debug, Error)]
pub enum PaylotError {
    /// Missing or malformed configuration. Always raised before any network
    /// call is attempted.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid caller-supplied input (addresses, amounts).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// RPC or transaction failure. Transactions confirmed before the failure
    /// remain confirmed.
    #[error("Chain error: {0}")]
    ChainError(String),

    /// Price-oracle fetch or response-shape failure.
    #[error("Oracle error: {0}")]
    OracleError(String),
}

pub type Result<T> = std::result::Result<T, PaylotError>;
