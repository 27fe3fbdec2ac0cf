//! `paylot draw` command implementation

use anyhow::Result;
use paylot_adapters::{EvmChainClient, HermesClient};
use paylot_core::{run_draw, DrawStepUpdate, StepStatus, ThreadSleeper};

use super::load_config;

pub fn run() -> Result<()> {
    let config = load_config()?;
    config.require_admin_key()?;

    let chain = EvmChainClient::new(&config.chain)?;
    let prices = HermesClient::from_config(&config)?;

    println!("🎲 Draw");
    println!();

    let outcome = run_draw(&chain, &prices, &ThreadSleeper, &config.timing);

    for update in &outcome.updates {
        print_step(update);
    }
    println!();

    if outcome.success {
        if let Some(message) = outcome.message {
            println!("✅ {message}");
        }
        Ok(())
    } else {
        anyhow::bail!("draw failed; see the step list above")
    }
}

fn print_step(update: &DrawStepUpdate) {
    let marker = match update.status {
        StepStatus::Completed => "✅",
        StepStatus::Error => "❌",
        StepStatus::Processing | StepStatus::Pending => "⏳",
    };
    println!("   {marker} {:?}", update.step);
    if let Some(ref message) = update.message {
        println!("      {message}");
    }
    if let Some(ref tx_hash) = update.tx_hash {
        println!(
            "      {}/{tx_hash}",
            paylot_core::config::EXPLORER_TX_URL
        );
    }
}
