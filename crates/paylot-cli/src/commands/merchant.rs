//! `paylot add-merchant` command implementation

use anyhow::Result;

use super::{admin_client, explorer_link, load_config, parse_address};

pub fn run(merchant: String) -> Result<()> {
    let config = load_config()?;
    let merchant = parse_address("merchant", &merchant)?;

    let client = admin_client(&config)?;

    println!("🏪 Add merchant");
    println!();
    println!("   Merchant: {merchant:?}");
    println!();

    let tx = client.add_merchant(merchant)?;
    println!("   Confirmed: {}", explorer_link(tx));

    Ok(())
}
