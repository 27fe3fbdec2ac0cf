//! `paylot buy` command implementation

use anyhow::Result;

use super::{admin_client, explorer_link, load_config, parse_address, parse_token_amount};

pub fn run(sender: String, receiver: String, amount: String) -> Result<()> {
    let config = load_config()?;
    let sender = parse_address("sender", &sender)?;
    let receiver = parse_address("receiver", &receiver)?;
    let amount_wei = parse_token_amount(&amount)?;

    let client = admin_client(&config)?;

    println!("💸 Buy");
    println!();
    println!("   Sender:   {sender:?}");
    println!("   Receiver: {receiver:?}");
    println!("   Amount:   {amount} tokens");
    println!();

    let approve_tx = client.approve(amount_wei)?;
    println!("   Approve submitted: {}", explorer_link(approve_tx));

    // Fixed wait between the approval and the spending call; the approval is
    // not awaited for confirmation.
    std::thread::sleep(config.timing.approval_wait);

    let buy_tx = client.buy(sender, receiver, amount_wei)?;
    println!("   Buy confirmed:     {}", explorer_link(buy_tx));

    Ok(())
}
