//! Liquidity provision and claim token operations

use anyhow::Result;
use colored::Colorize;
use log::info;

use pairswap::Address;

use crate::config::CliConfig;
use crate::store;

pub fn add_liquidity(config: &CliConfig, provider: String, eth: u128, max_tokens: u128) -> Result<()> {
    println!("{}", "=== Add Liquidity ===".bright_green().bold());
    let provider = Address::new(provider);

    let (minted, reserve_before, reserve_after) = store::update(config, |host| {
        let reserve_before = host.get_reserve();
        let minted = host.add_liquidity(&provider, max_tokens, eth)?;
        Ok((minted, reserve_before, host.get_reserve()))
    })?;
    info!("{} added liquidity: minted {} claims", provider, minted);

    println!("{} {}", "Provider:".bright_cyan(), provider);
    println!("{} {}", "Native Deposited:".bright_cyan(), eth);
    println!("{} {}", "Tokens Deposited:".bright_cyan(), reserve_after - reserve_before);
    println!("{} {}", "Claims Minted:".bright_cyan(), minted);
    Ok(())
}

pub fn remove_liquidity(config: &CliConfig, provider: String, claims: u128) -> Result<()> {
    println!("{}", "=== Remove Liquidity ===".bright_green().bold());
    let provider = Address::new(provider);

    let payout = store::update(config, |host| Ok(host.remove_liquidity(&provider, claims)?))?;
    info!("{} burned {} claims", provider, claims);

    println!("{} {}", "Provider:".bright_cyan(), provider);
    println!("{} {}", "Claims Burned:".bright_cyan(), claims);
    println!("{} {}", "Native Returned:".bright_cyan(), payout.native_out);
    println!("{} {}", "Tokens Returned:".bright_cyan(), payout.token_out);
    Ok(())
}

pub fn transfer_claims(config: &CliConfig, from: String, to: String, amount: u128) -> Result<()> {
    println!("{}", "=== Transfer Claims ===".bright_green().bold());
    let (from, to) = (Address::new(from), Address::new(to));

    store::update(config, |host| Ok(host.transfer_claims(&from, &to, amount)?))?;

    println!("{} {} -> {}", "Transfer:".bright_cyan(), from, to);
    println!("{} {}", "Amount:".bright_cyan(), amount);
    Ok(())
}

pub fn approve_claims(config: &CliConfig, owner: String, spender: String, amount: u128) -> Result<()> {
    println!("{}", "=== Approve Claims ===".bright_green().bold());
    let (owner, spender) = (Address::new(owner), Address::new(spender));

    store::update(config, |host| Ok(host.approve_claims(&owner, &spender, amount)?))?;

    println!("{} {}", "Owner:".bright_cyan(), owner);
    println!("{} {}", "Spender:".bright_cyan(), spender);
    println!("{} {}", "Allowance:".bright_cyan(), amount);
    Ok(())
}

pub fn transfer_claims_from(
    config: &CliConfig,
    spender: String,
    owner: String,
    to: String,
    amount: u128,
) -> Result<()> {
    println!("{}", "=== Transfer Claims From ===".bright_green().bold());
    let (spender, owner, to) = (Address::new(spender), Address::new(owner), Address::new(to));

    let remaining = store::update(config, |host| {
        host.transfer_claims_from(&spender, &owner, &to, amount)?;
        Ok(host.exchange().allowance(&owner, &spender))
    })?;

    println!("{} {} -> {}", "Transfer:".bright_cyan(), owner, to);
    println!("{} {}", "Amount:".bright_cyan(), amount);
    println!("{} {}", "Remaining Allowance:".bright_cyan(), remaining);
    Ok(())
}
