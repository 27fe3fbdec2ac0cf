//! `paylot status` command implementation

use anyhow::Result;
use ethers::utils::format_units;
use paylot_core::config::TOKEN_DECIMALS;

use super::{admin_client, load_config, parse_address};

pub fn run(address: Option<String>) -> Result<()> {
    let config = load_config()?;
    let client = admin_client(&config)?;

    let subject = match address {
        Some(value) => parse_address("subject", &value)?,
        None => client.signer_address(),
    };

    println!("📊 Paylot status");
    println!();
    println!("⚙️  Configuration");
    println!("   Network:  chain id {}", config.chain.chain_id);
    println!("   RPC:      {}", config.chain.rpc_url);
    println!("   Lottery:  {}", config.chain.lottery_address);
    println!("   Token:    {}", config.chain.token_address);
    println!("   Oracle:   {}", config.oracle.hermes_base_url);
    println!();

    println!("👛 Account {subject:?}");
    let balance = client.balance_of(subject)?;
    let allowance = client.allowance(subject)?;
    println!("   Balance:   {} tokens", format_units(balance, TOKEN_DECIMALS)?);
    println!(
        "   Allowance: {} tokens (lottery spender)",
        format_units(allowance, TOKEN_DECIMALS)?
    );

    Ok(())
}
