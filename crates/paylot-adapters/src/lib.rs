//! Outbound adapters for the paylot client.
//!
//! - [`hermes`]: blocking HTTP client for the Hermes price-oracle service,
//!   implementing `paylot_core::PriceUpdateSource`.
//! - [`chain`]: EVM chain client (signer, provider, contract bindings),
//!   implementing `paylot_core::DrawChain` plus the payment/token surface
//!   used by the CLI.

pub mod chain;
pub mod hermes;

pub use chain::EvmChainClient;
pub use hermes::{HermesClient, HermesConfig};
