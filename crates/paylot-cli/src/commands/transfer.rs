//! `paylot transfer` command implementation

use anyhow::Result;

use super::{admin_client, explorer_link, load_config, parse_address, parse_token_amount};

pub fn run(to: String, amount: String) -> Result<()> {
    let config = load_config()?;
    let to = parse_address("recipient", &to)?;
    let amount_wei = parse_token_amount(&amount)?;

    let client = admin_client(&config)?;

    println!("📤 Transfer");
    println!();
    println!("   To:     {to:?}");
    println!("   Amount: {amount} tokens");
    println!();

    let tx = client.transfer(to, amount_wei)?;
    println!("   Confirmed: {}", explorer_link(tx));

    Ok(())
}
