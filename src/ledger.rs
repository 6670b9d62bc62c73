//! Ledger interfaces the exchange moves funds through
//!
//! The exchange never owns funds directly. Tokens live in a [`TokenLedger`]
//! (balances, allowance-gated `transfer_from`, direct `transfer`) and the
//! native settlement asset lives in a [`NativeLedger`]. The in-memory
//! implementations here back the tests, the CLI and any embedding that does
//! not bring its own ledgers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

// ============================================================================
// Identities
// ============================================================================

/// Account or contract identity on a ledger
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Ledger Traits
// ============================================================================

/// Fungible token ledger
pub trait TokenLedger {
    /// Identity of the token itself
    fn address(&self) -> &Address;

    fn name(&self) -> &str;

    fn symbol(&self) -> &str;

    fn balance_of(&self, account: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    /// Set `spender`'s allowance over `owner`'s tokens (overwrites)
    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), LedgerError>;

    /// Move tokens `from` -> `to`, signed by `from`
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;

    /// Move `owner`'s tokens to `to` on behalf of `spender`, consuming allowance
    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError>;
}

/// Native settlement currency ledger
pub trait NativeLedger {
    fn balance_of(&self, account: &Address) -> u128;

    /// Move native currency `from` -> `to`; never partial
    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError>;
}

/// The pair of ledgers a single exchange call touches
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledgers<T, N> {
    pub token: T,
    pub native: N,
}

impl<T, N> Ledgers<T, N> {
    pub fn new(token: T, native: N) -> Self {
        Self { token, native }
    }
}

// ============================================================================
// Balance and Allowance Books
// ============================================================================

/// Holder -> balance map with checked debit/credit
///
/// Zero balances are pruned so equal books compare equal regardless of
/// history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Balances(BTreeMap<Address, u128>);

impl Balances {
    pub fn get(&self, account: &Address) -> u128 {
        self.0.get(account).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }
        let current = self.get(account);
        let updated = current.checked_add(amount).ok_or(LedgerError::Overflow)?;
        self.0.insert(account.clone(), updated);
        Ok(())
    }

    pub fn debit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.get(account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance { needed: amount, available });
        }
        if amount == 0 {
            return Ok(());
        }
        let remaining = available - amount;
        if remaining == 0 {
            self.0.remove(account);
        } else {
            self.0.insert(account.clone(), remaining);
        }
        Ok(())
    }

    /// Debit then credit; the debit is validated first so a failure moves nothing
    pub fn move_funds(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        if from != to {
            let incoming = self.get(to);
            incoming.checked_add(amount).ok_or(LedgerError::Overflow)?;
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    /// Sum of all balances, `None` on overflow
    pub fn total(&self) -> Option<u128> {
        self.0.values().try_fold(0u128, |acc, v| acc.checked_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &u128)> {
        self.0.iter()
    }
}

/// Owner -> spender -> allowance map
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allowances(BTreeMap<Address, BTreeMap<Address, u128>>);

impl Allowances {
    pub fn get(&self, owner: &Address, spender: &Address) -> u128 {
        self.0
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    pub fn set(&mut self, owner: &Address, spender: &Address, amount: u128) {
        if amount == 0 {
            if let Some(spenders) = self.0.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.0.remove(owner);
                }
            }
            return;
        }
        self.0
            .entry(owner.clone())
            .or_default()
            .insert(spender.clone(), amount);
    }

    /// Check that `amount` can be spent, without consuming it
    pub fn check(&self, owner: &Address, spender: &Address, amount: u128) -> Result<(), LedgerError> {
        let available = self.get(owner, spender);
        if available < amount {
            return Err(LedgerError::InsufficientAllowance { needed: amount, available });
        }
        Ok(())
    }

    pub fn spend(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), LedgerError> {
        self.check(owner, spender, amount)?;
        let remaining = self.get(owner, spender) - amount;
        self.set(owner, spender, remaining);
        Ok(())
    }
}

// ============================================================================
// In-Memory Ledgers
// ============================================================================

/// Token ledger held entirely in memory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTokenLedger {
    address: Address,
    name: String,
    symbol: String,
    total_supply: u128,
    balances: Balances,
    allowances: Allowances,
}

impl MemoryTokenLedger {
    pub fn new(address: Address, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            total_supply: 0,
            balances: Balances::default(),
            allowances: Allowances::default(),
        }
    }

    /// Issue new tokens to `to`
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), LedgerError> {
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.balances.credit(to, amount)?;
        self.total_supply = supply;
        Ok(())
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn address(&self) -> &Address {
        &self.address
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn symbol(&self) -> &str {
        &self.symbol
    }

    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(owner, spender)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), LedgerError> {
        self.allowances.set(owner, spender, amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        self.balances.move_funds(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), LedgerError> {
        self.allowances.check(owner, spender, amount)?;
        self.balances.move_funds(owner, to, amount)?;
        self.allowances.spend(owner, spender, amount)
    }
}

/// Native-currency ledger held entirely in memory
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryNativeLedger {
    balances: Balances,
}

impl MemoryNativeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `account` from outside the system (genesis or faucet)
    pub fn deposit(&mut self, account: &Address, amount: u128) -> Result<(), LedgerError> {
        self.balances.credit(account, amount)
    }

    pub fn total(&self) -> Option<u128> {
        self.balances.total()
    }
}

impl NativeLedger for MemoryNativeLedger {
    fn balance_of(&self, account: &Address) -> u128 {
        self.balances.get(account)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), LedgerError> {
        self.balances.move_funds(from, to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(id: &str) -> Address {
        Address::new(id)
    }

    #[test]
    fn test_token_transfer_moves_balance() {
        let mut token = MemoryTokenLedger::new(addr("tkn"), "Token", "TKN");
        token.mint(&addr("alice"), 100).unwrap();
        token.transfer(&addr("alice"), &addr("bob"), 40).unwrap();
        assert_eq!(token.balance_of(&addr("alice")), 60);
        assert_eq!(token.balance_of(&addr("bob")), 40);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn test_token_transfer_insufficient_balance() {
        let mut token = MemoryTokenLedger::new(addr("tkn"), "Token", "TKN");
        token.mint(&addr("alice"), 10).unwrap();
        let result = token.transfer(&addr("alice"), &addr("bob"), 11);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientBalance { needed: 11, available: 10 })
        );
        assert_eq!(token.balance_of(&addr("alice")), 10);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut token = MemoryTokenLedger::new(addr("tkn"), "Token", "TKN");
        token.mint(&addr("alice"), 100).unwrap();
        token.approve(&addr("alice"), &addr("pool"), 70).unwrap();

        token
            .transfer_from(&addr("pool"), &addr("alice"), &addr("pool"), 50)
            .unwrap();
        assert_eq!(token.allowance(&addr("alice"), &addr("pool")), 20);
        assert_eq!(token.balance_of(&addr("pool")), 50);

        let result = token.transfer_from(&addr("pool"), &addr("alice"), &addr("pool"), 21);
        assert_eq!(
            result,
            Err(LedgerError::InsufficientAllowance { needed: 21, available: 20 })
        );
    }

    #[test]
    fn test_transfer_from_without_balance_keeps_allowance() {
        let mut token = MemoryTokenLedger::new(addr("tkn"), "Token", "TKN");
        token.mint(&addr("alice"), 5).unwrap();
        token.approve(&addr("alice"), &addr("pool"), 50).unwrap();

        assert!(token
            .transfer_from(&addr("pool"), &addr("alice"), &addr("pool"), 6)
            .is_err());
        assert_eq!(token.allowance(&addr("alice"), &addr("pool")), 50);
    }

    #[test]
    fn test_native_self_transfer_is_noop() {
        let mut native = MemoryNativeLedger::new();
        native.deposit(&addr("alice"), 9).unwrap();
        native.transfer(&addr("alice"), &addr("alice"), 9).unwrap();
        assert_eq!(native.balance_of(&addr("alice")), 9);
        assert_eq!(native.total(), Some(9));
    }

    #[test]
    fn test_credit_overflow_rejected() {
        let mut native = MemoryNativeLedger::new();
        native.deposit(&addr("alice"), u128::MAX).unwrap();
        native.deposit(&addr("bob"), 1).unwrap();
        assert_eq!(
            native.transfer(&addr("bob"), &addr("alice"), 1),
            Err(LedgerError::Overflow)
        );
        assert_eq!(native.balance_of(&addr("bob")), 1);
    }

    #[test]
    fn test_address_serializes_as_string() {
        let json = serde_json::to_string(&addr("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
