//! Paylot CLI - payment lottery client for Arbitrum Sepolia
//!
//! Submits the pre-defined lottery contract calls, runs the admin draw
//! sequence and serves the HTTP API used by the web front end.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

/// Paylot: decentralized payment lottery client
#[derive(Parser)]
#[command(name = "paylot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pay a merchant through the lottery contract (approve, then buy)
    Buy {
        /// Paying address
        #[arg(long)]
        sender: String,

        /// Merchant address receiving the payment
        #[arg(long)]
        receiver: String,

        /// Amount in settlement-token units (6 decimals)
        #[arg(long)]
        amount: String,
    },

    /// Register a merchant address (admin only)
    AddMerchant {
        /// Merchant address
        #[arg(long)]
        merchant: String,
    },

    /// Deposit settlement tokens into the prize pool (admin only)
    Deposit {
        /// Amount in settlement-token units (6 decimals)
        #[arg(long)]
        amount: String,
    },

    /// Transfer settlement tokens directly
    Transfer {
        /// Recipient address
        #[arg(long)]
        to: String,

        /// Amount in settlement-token units (6 decimals)
        #[arg(long)]
        amount: String,
    },

    /// Show configuration, token balance and lottery allowance
    Status {
        /// Address to inspect (defaults to the admin signer)
        #[arg(long)]
        address: Option<String>,
    },

    /// Run the draw sequence (admin only)
    Draw,

    /// Serve the HTTP API
    Serve {
        /// Bind address
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match (cli.verbose, std::env::var("PAYLOT_LOG_LEVEL")) {
        (true, _) => "debug".to_string(),
        (false, Ok(level)) => level,
        (false, Err(_)) => "info".to_string(),
    };
    tracing_subscriber::fmt().with_env_filter(filter.as_str()).init();

    match cli.command {
        Commands::Buy {
            sender,
            receiver,
            amount,
        } => commands::buy::run(sender, receiver, amount),
        Commands::AddMerchant { merchant } => commands::merchant::run(merchant),
        Commands::Deposit { amount } => commands::deposit::run(amount),
        Commands::Transfer { to, amount } => commands::transfer::run(to, amount),
        Commands::Status { address } => commands::status::run(address),
        Commands::Draw => commands::draw::run(),
        Commands::Serve { bind } => commands::serve::run(bind),
    }
}
