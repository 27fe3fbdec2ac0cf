//! `paylot deposit` command implementation

use anyhow::Result;

use super::{admin_client, explorer_link, load_config, parse_token_amount};

pub fn run(amount: String) -> Result<()> {
    let config = load_config()?;
    let amount_wei = parse_token_amount(&amount)?;

    let client = admin_client(&config)?;

    println!("🏦 Deposit");
    println!();
    println!("   Amount: {amount} tokens");
    println!();

    let approve_tx = client.approve(amount_wei)?;
    println!("   Approve submitted:  {}", explorer_link(approve_tx));

    std::thread::sleep(config.timing.approval_wait);

    let deposit_tx = client.deposit(amount_wei)?;
    println!("   Deposit confirmed:  {}", explorer_link(deposit_tx));

    Ok(())
}
