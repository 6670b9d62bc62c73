//! Swaps and price quotes

use anyhow::{Context, Result};
use colored::Colorize;
use log::info;

use pairswap::Address;

use crate::config::CliConfig;
use crate::exchange::format_price;
use crate::store;

/// Which side of the pair the trader sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    EthToToken,
    TokenToEth,
}

impl Side {
    fn labels(self) -> (&'static str, &'static str) {
        match self {
            Side::EthToToken => ("native", "tokens"),
            Side::TokenToEth => ("tokens", "native"),
        }
    }
}

pub fn swap_eth_to_token(
    config: &CliConfig,
    trader: String,
    eth: u128,
    min_tokens: u128,
    recipient: Option<String>,
) -> Result<()> {
    println!("{}", "=== Swap Native -> Token ===".bright_green().bold());
    let trader = Address::new(trader);
    let recipient = recipient.map(Address::new);

    let out = store::update(config, |host| {
        let out = match &recipient {
            Some(recipient) => host.eth_to_token_transfer(&trader, eth, min_tokens, recipient)?,
            None => host.eth_to_token_swap(&trader, eth, min_tokens)?,
        };
        Ok(out)
    })?;
    info!("{} sold {} native for {} tokens", trader, eth, out);

    println!("{} {}", "Trader:".bright_cyan(), trader);
    if let Some(recipient) = &recipient {
        println!("{} {}", "Recipient:".bright_cyan(), recipient);
    }
    println!("{} {} native", "Sold:".bright_cyan(), eth);
    println!("{} {} tokens", "Received:".bright_cyan(), out);
    Ok(())
}

pub fn swap_token_to_eth(config: &CliConfig, trader: String, tokens: u128, min_eth: u128) -> Result<()> {
    println!("{}", "=== Swap Token -> Native ===".bright_green().bold());
    let trader = Address::new(trader);

    let out = store::update(config, |host| Ok(host.token_to_eth_swap(&trader, tokens, min_eth)?))?;
    info!("{} sold {} tokens for {} native", trader, tokens, out);

    println!("{} {}", "Trader:".bright_cyan(), trader);
    println!("{} {} tokens", "Sold:".bright_cyan(), tokens);
    println!("{} {} native", "Received:".bright_cyan(), out);
    Ok(())
}

/// Quote a swap without touching the state file
pub fn quote(config: &CliConfig, side: Side, amount: u128) -> Result<()> {
    let host = store::load(&config.state_path)?;
    let out = match side {
        Side::EthToToken => host.get_token_amount(amount),
        Side::TokenToEth => host.get_eth_amount(amount),
    }
    .context("Failed to quote swap")?;

    let (sold, bought) = side.labels();
    println!("{}", "=== Quote ===".bright_green().bold());
    println!("{} {} {}", "Sell:".bright_cyan(), amount, sold);
    println!("{} {} {}", "Receive:".bright_cyan(), out, bought);

    let spot = match side {
        Side::EthToToken => host.eth_price(),
        Side::TokenToEth => host.token_price(),
    }
    .context("Failed to read spot price")?;
    println!("{} {} {} per {}", "Spot Price:".bright_cyan(), format_price(spot), bought, sold);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap::{ExchangeConfig, MemoryHost};

    fn config_with_pool(dir: &tempfile::TempDir) -> CliConfig {
        let config = CliConfig {
            state_path: dir.path().join("state.json"),
            fee_bps: 30,
            log_level: None,
            token_name: "Token".to_string(),
            token_symbol: "TKN".to_string(),
        };
        let mut host = MemoryHost::in_memory("Token", "TKN", ExchangeConfig::default()).unwrap();
        let alice = Address::new("alice");
        host.fund(&alice, 100_000, 100_000).unwrap();
        host.approve_token(&alice, u128::MAX).unwrap();
        host.add_liquidity(&alice, 20_000, 10_000).unwrap();
        store::save(&config.state_path, &host).unwrap();
        config
    }

    #[test]
    fn test_swap_persists_and_quote_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_pool(&dir);

        quote(&config, Side::EthToToken, 1_000).unwrap();
        let unchanged = store::load(&config.state_path).unwrap();
        assert_eq!(unchanged.get_reserve(), 20_000);

        let expected = unchanged.get_token_amount(1_000).unwrap();
        swap_eth_to_token(&config, "alice".to_string(), 1_000, expected, Some("bob".to_string())).unwrap();

        let host = store::load(&config.state_path).unwrap();
        assert_eq!(host.get_reserve(), 20_000 - expected);
        assert_eq!(host.native_reserve(), 11_000);
    }

    #[test]
    fn test_rejected_swap_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_pool(&dir);

        let result = swap_token_to_eth(&config, "alice".to_string(), 1_000, 10_000);
        assert!(result.is_err());
        let host = store::load(&config.state_path).unwrap();
        assert_eq!(host.get_reserve(), 20_000);
        assert_eq!(host.native_reserve(), 10_000);
    }
}
