//! Exchange initialization, account funding and status

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use pairswap::{Address, ExchangeConfig, MemoryHost, NativeLedger, TokenLedger, SCALE};

use crate::config::CliConfig;
use crate::store;

/// Render a `SCALE`-scaled price with six decimals
pub fn format_price(scaled: u128) -> String {
    format!("{}.{:06}", scaled / SCALE, scaled % SCALE)
}

pub fn initialize_exchange(
    config: &CliConfig,
    token_name: Option<String>,
    token_symbol: Option<String>,
    fee_bps: Option<u64>,
    force: bool,
) -> Result<()> {
    println!("{}", "=== Initialize Exchange ===".bright_green().bold());

    if config.state_path.exists() && !force {
        anyhow::bail!(
            "State file already exists: {}\n\
             Pass --force to overwrite it",
            config.state_path.display()
        );
    }

    let token_name = token_name.unwrap_or_else(|| config.token_name.clone());
    let token_symbol = token_symbol.unwrap_or_else(|| config.token_symbol.clone());
    let exchange_config = ExchangeConfig::with_fee_bps(fee_bps.unwrap_or(config.fee_bps));

    let host = MemoryHost::in_memory(&token_name, &token_symbol, exchange_config)
        .context("Failed to create exchange")?;
    store::save(&config.state_path, &host)?;
    info!("initialized exchange for {} at {}", token_symbol, config.state_path.display());

    let exchange = host.exchange();
    println!("{} {}", "Exchange:".bright_cyan(), exchange.address());
    println!("{} {} ({})", "Token:".bright_cyan(), token_name, exchange.token_address());
    println!("{} {} ({})", "Claim Token:".bright_cyan(), exchange.name(), exchange.symbol());
    println!("{} {} bps", "Fee:".bright_cyan(), exchange_config.fee_bps);
    println!("{} {}", "State:".bright_cyan(), config.state_path.display());
    println!("\n{}", "Exchange initialized".bright_green());
    Ok(())
}

/// Seed an account with native currency and tokens
pub fn faucet(config: &CliConfig, account: String, eth: u128, tokens: u128) -> Result<()> {
    println!("{}", "=== Faucet ===".bright_green().bold());
    let account = Address::new(account);

    store::update(config, |host| {
        host.fund(&account, eth, tokens)?;
        Ok(())
    })?;

    println!("{} {}", "Account:".bright_cyan(), account);
    println!("{} +{}", "Native:".bright_cyan(), eth);
    println!("{} +{}", "Tokens:".bright_cyan(), tokens);
    Ok(())
}

/// Approve the exchange to pull `amount` of `owner`'s tokens
pub fn approve(config: &CliConfig, owner: String, amount: u128) -> Result<()> {
    println!("{}", "=== Approve Exchange ===".bright_green().bold());
    let owner = Address::new(owner);

    store::update(config, |host| {
        host.approve_token(&owner, amount)?;
        Ok(())
    })?;

    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Allowance:".bright_cyan(), amount);
    Ok(())
}

pub fn show_status(config: &CliConfig) -> Result<()> {
    let host = store::load(&config.state_path)?;
    let exchange = host.exchange();

    println!("{}", "=== Exchange Status ===".bright_green().bold());
    println!("{} {}", "Exchange:".bright_cyan(), exchange.address());
    println!("{} {}", "Token:".bright_cyan(), exchange.token_address());
    println!("{} {} ({})", "Claim Token:".bright_cyan(), exchange.name(), exchange.symbol());
    println!("{} {} bps", "Fee:".bright_cyan(), exchange.config().fee_bps);
    println!("{} {}", "Token Reserve:".bright_cyan(), host.get_reserve());
    println!("{} {}", "Native Reserve:".bright_cyan(), host.native_reserve());
    println!("{} {}", "Claim Supply:".bright_cyan(), exchange.total_supply());

    match (host.eth_price(), host.token_price()) {
        (Ok(eth_price), Ok(token_price)) => {
            println!("{} {} tokens", "Price of 1 native:".bright_cyan(), format_price(eth_price));
            println!("{} {} native", "Price of 1 token:".bright_cyan(), format_price(token_price));
        }
        _ => println!("\n{}", "Pool is empty".dimmed()),
    }

    let held = host.ledgers().token.balance_of(exchange.address());
    if held > host.get_reserve() {
        println!(
            "{} {}",
            "Untracked tokens held:".yellow(),
            held - host.get_reserve()
        );
    }
    Ok(())
}

pub fn show_balance(config: &CliConfig, account: String) -> Result<()> {
    let host = store::load(&config.state_path)?;
    let account = Address::new(account);
    let exchange = host.exchange();

    println!("{}", "=== Balances ===".bright_green().bold());
    println!("{} {}", "Account:".bright_cyan(), account);
    println!("{} {}", "Native:".bright_cyan(), host.ledgers().native.balance_of(&account));
    println!("{} {}", "Tokens:".bright_cyan(), host.ledgers().token.balance_of(&account));
    println!(
        "{} {}",
        "Exchange Allowance:".bright_cyan(),
        host.ledgers().token.allowance(&account, exchange.address())
    );

    let claims = exchange.balance_of(&account);
    println!("{} {}", "Claims:".bright_cyan(), claims);
    if claims > 0 {
        let payout = host
            .quote_redemption(claims)
            .context("Failed to value claims")?;
        println!(
            "{} {} tokens + {} native",
            "Redeemable:".bright_cyan(),
            payout.token_out,
            payout.native_out
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_of_large_position() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig {
            state_path: dir.path().join("state.json"),
            fee_bps: 30,
            log_level: None,
            token_name: "Token".to_string(),
            token_symbol: "TKN".to_string(),
        };
        let big: u128 = 100_000_000_000_000_000_000;
        let mut host = MemoryHost::in_memory("Token", "TKN", ExchangeConfig::default()).unwrap();
        let alice = Address::new("alice");
        host.fund(&alice, 2 * big, 2 * big).unwrap();
        host.approve_token(&alice, u128::MAX).unwrap();
        host.add_liquidity(&alice, big, big).unwrap();
        store::save(&config.state_path, &host).unwrap();

        show_balance(&config, "alice".to_string()).unwrap();
        let payout = host.quote_redemption(big).unwrap();
        assert_eq!((payout.token_out, payout.native_out), (big, big));
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(3 * SCALE), "3.000000");
        assert_eq!(format_price(SCALE / 3), "0.333333");
        assert_eq!(format_price(1_500_042), "1.500042");
    }
}
