//! Pairswap CLI - drive a single-pair exchange from the command line
//!
//! The whole simulated world (token ledger, native ledger, exchange) lives in
//! a JSON state file. Every mutating command runs exactly one exchange call
//! and only writes the file back when that call succeeds.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod config;
mod exchange;
mod liquidity;
mod store;
mod trading;

use config::CliConfig;
use trading::Side;

#[derive(Parser)]
#[command(name = "pairswap")]
#[command(about = "Pairswap CLI - constant-product exchange for one token pair", long_about = None)]
#[command(version)]
struct Cli {
    /// State file (overrides the config file)
    #[arg(short, long, global = true)]
    state: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a fresh exchange and state file
    Init {
        /// Token name
        #[arg(long)]
        token_name: Option<String>,

        /// Token symbol
        #[arg(long)]
        token_symbol: Option<String>,

        /// Swap fee (basis points)
        #[arg(long)]
        fee_bps: Option<u64>,

        /// Overwrite an existing state file
        #[arg(long)]
        force: bool,
    },

    /// Credit an account with native currency and tokens
    Faucet {
        account: String,

        /// Native amount to credit
        #[arg(long, default_value = "0")]
        eth: u128,

        /// Token amount to mint
        #[arg(long, default_value = "0")]
        tokens: u128,
    },

    /// Approve the exchange to pull tokens from an account
    Approve {
        owner: String,
        amount: u128,
    },

    /// Deposit native currency and tokens, mint claims
    AddLiquidity {
        provider: String,

        /// Native amount attached to the call
        #[arg(long)]
        eth: u128,

        /// Most tokens the provider is willing to deposit
        #[arg(long)]
        max_tokens: u128,
    },

    /// Burn claims, withdraw a pro-rata share of both reserves
    RemoveLiquidity {
        provider: String,
        claims: u128,
    },

    /// Swap operations
    Swap {
        #[command(subcommand)]
        command: SwapCommands,
    },

    /// Quote a swap against current reserves
    Quote {
        #[command(subcommand)]
        command: QuoteCommands,
    },

    /// Claim token operations
    Claims {
        #[command(subcommand)]
        command: ClaimCommands,
    },

    /// Show reserves, claim supply and spot prices
    Status,

    /// Show an account's balances
    Balance {
        account: String,
    },
}

#[derive(Subcommand)]
enum SwapCommands {
    /// Sell native currency for tokens
    EthToToken {
        trader: String,

        /// Native amount to sell
        #[arg(long)]
        eth: u128,

        /// Minimum tokens to receive
        #[arg(long, default_value = "0")]
        min_tokens: u128,

        /// Send the tokens to another account
        #[arg(long)]
        recipient: Option<String>,
    },

    /// Sell tokens for native currency
    TokenToEth {
        trader: String,

        /// Token amount to sell
        #[arg(long)]
        tokens: u128,

        /// Minimum native amount to receive
        #[arg(long, default_value = "0")]
        min_eth: u128,
    },
}

#[derive(Subcommand)]
enum QuoteCommands {
    /// Tokens received for a native amount
    EthToToken {
        amount: u128,
    },

    /// Native received for a token amount
    TokenToEth {
        amount: u128,
    },
}

#[derive(Subcommand)]
enum ClaimCommands {
    /// Move claims between accounts
    Transfer {
        from: String,
        to: String,
        amount: u128,
    },

    /// Allow a spender to move an owner's claims
    Approve {
        owner: String,
        spender: String,
        amount: u128,
    },

    /// Move claims on an owner's behalf
    TransferFrom {
        spender: String,
        owner: String,
        to: String,
        amount: u128,
    },
}

fn init_logging(verbose: bool, config: &CliConfig) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if let Some(level) = &config.log_level {
        builder.parse_filters(level);
    }
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref(), cli.state.as_deref())?;
    init_logging(cli.verbose, &config);

    if cli.verbose {
        println!("{} {}", "State:".bright_cyan(), config.state_path.display());
        println!("{} {} bps", "Default Fee:".bright_cyan(), config.fee_bps);
    }

    match cli.command {
        Commands::Init { token_name, token_symbol, fee_bps, force } => {
            exchange::initialize_exchange(&config, token_name, token_symbol, fee_bps, force)?;
        }
        Commands::Faucet { account, eth, tokens } => {
            exchange::faucet(&config, account, eth, tokens)?;
        }
        Commands::Approve { owner, amount } => {
            exchange::approve(&config, owner, amount)?;
        }
        Commands::AddLiquidity { provider, eth, max_tokens } => {
            liquidity::add_liquidity(&config, provider, eth, max_tokens)?;
        }
        Commands::RemoveLiquidity { provider, claims } => {
            liquidity::remove_liquidity(&config, provider, claims)?;
        }
        Commands::Swap { command } => match command {
            SwapCommands::EthToToken { trader, eth, min_tokens, recipient } => {
                trading::swap_eth_to_token(&config, trader, eth, min_tokens, recipient)?;
            }
            SwapCommands::TokenToEth { trader, tokens, min_eth } => {
                trading::swap_token_to_eth(&config, trader, tokens, min_eth)?;
            }
        },
        Commands::Quote { command } => match command {
            QuoteCommands::EthToToken { amount } => {
                trading::quote(&config, Side::EthToToken, amount)?;
            }
            QuoteCommands::TokenToEth { amount } => {
                trading::quote(&config, Side::TokenToEth, amount)?;
            }
        },
        Commands::Claims { command } => match command {
            ClaimCommands::Transfer { from, to, amount } => {
                liquidity::transfer_claims(&config, from, to, amount)?;
            }
            ClaimCommands::Approve { owner, spender, amount } => {
                liquidity::approve_claims(&config, owner, spender, amount)?;
            }
            ClaimCommands::TransferFrom { spender, owner, to, amount } => {
                liquidity::transfer_claims_from(&config, spender, owner, to, amount)?;
            }
        },
        Commands::Status => {
            exchange::show_status(&config)?;
        }
        Commands::Balance { account } => {
            exchange::show_balance(&config, account)?;
        }
    }

    Ok(())
}
