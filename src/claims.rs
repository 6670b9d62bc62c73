//! Liquidity claim token
//!
//! A standalone balance book plus supply counter. Holders may transfer and
//! approve freely, but only the exchange can mint or burn: those methods are
//! crate-private, so the supply can only change through liquidity
//! operations.

use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, LedgerError, Result};
use crate::ledger::{Address, Allowances, Balances};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimLedger {
    name: String,
    symbol: String,
    total_supply: u128,
    balances: Balances,
    allowances: Allowances,
}

impl ClaimLedger {
    /// Claim token metadata derived from the paired token's name and symbol
    pub(crate) fn for_token(token_name: &str, token_symbol: &str) -> Self {
        Self {
            name: format!("{token_name} Pool Share"),
            symbol: format!("{token_symbol}-LP"),
            total_supply: 0,
            balances: Balances::default(),
            allowances: Allowances::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(owner, spender)
    }

    /// Holders with a non-zero balance
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.balances.iter()
    }

    pub(crate) fn mint(&mut self, to: &Address, amount: u128) -> Result<()> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(ExchangeError::Overflow)?;
        self.balances.credit(to, amount).map_err(claim_error)?;
        self.total_supply = supply;
        Ok(())
    }

    pub(crate) fn burn(&mut self, from: &Address, amount: u128) -> Result<()> {
        self.balances.debit(from, amount).map_err(claim_error)?;
        self.total_supply -= amount;
        Ok(())
    }

    pub(crate) fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<()> {
        self.balances.move_funds(from, to, amount).map_err(claim_error)
    }

    pub(crate) fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) {
        self.allowances.set(owner, spender, amount);
    }

    pub(crate) fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        self.allowances
            .check(owner, spender, amount)
            .map_err(claim_error)?;
        self.transfer(owner, to, amount)?;
        self.allowances
            .spend(owner, spender, amount)
            .map_err(claim_error)
    }
}

fn claim_error(err: LedgerError) -> ExchangeError {
    match err {
        LedgerError::InsufficientBalance { .. } => ExchangeError::InsufficientClaimBalance,
        LedgerError::InsufficientAllowance { .. } => ExchangeError::InsufficientClaimAllowance,
        LedgerError::Overflow => ExchangeError::Overflow,
    }
}
