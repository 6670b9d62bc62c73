//! Transactional host around one exchange and its ledgers
//!
//! The host plays the part of the execution environment: it serializes
//! calls (every mutating method takes `&mut self`), credits the native value
//! attached to payable calls before the exchange runs, and rolls the whole
//! world back when a call fails. A failed call therefore leaves exchange,
//! token ledger and native ledger exactly as they were.
//!
//! For multi-threaded embeddings wrap the host in [`SharedHost`]: one mutex
//! per pool is all the serialization the exchange needs.

use std::sync::{Arc, Mutex};

use amm_model::Redemption;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ExchangeConfig;
use crate::error::Result;
use crate::exchange::{Call, Exchange};
use crate::ledger::{Address, Ledgers, MemoryNativeLedger, MemoryTokenLedger, NativeLedger, TokenLedger};

/// A host shared across threads; the lock is the per-pool serialization point
pub type SharedHost<T, N> = Arc<Mutex<Host<T, N>>>;

/// Host over the in-memory ledgers
pub type MemoryHost = Host<MemoryTokenLedger, MemoryNativeLedger>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host<T, N> {
    exchange: Exchange,
    ledgers: Ledgers<T, N>,
}

impl<T, N> Host<T, N>
where
    T: TokenLedger + Clone,
    N: NativeLedger + Clone,
{
    /// Deploy a fresh exchange at `exchange_address` for the token in `token`
    pub fn new(exchange_address: Address, token: T, native: N, config: ExchangeConfig) -> Result<Self> {
        let exchange = Exchange::new(exchange_address, &token, config)?;
        Ok(Self {
            exchange,
            ledgers: Ledgers::new(token, native),
        })
    }

    pub fn into_shared(self) -> SharedHost<T, N> {
        Arc::new(Mutex::new(self))
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn ledgers(&self) -> &Ledgers<T, N> {
        &self.ledgers
    }

    /// Direct ledger access for seeding balances outside any exchange call
    pub fn ledgers_mut(&mut self) -> &mut Ledgers<T, N> {
        &mut self.ledgers
    }

    /// Run `op` atomically: on error every ledger and exchange mutation is discarded
    pub fn transact<R>(
        &mut self,
        op: impl FnOnce(&mut Exchange, &mut Ledgers<T, N>) -> Result<R>,
    ) -> Result<R> {
        let snapshot = (self.exchange.clone(), self.ledgers.clone());
        match op(&mut self.exchange, &mut self.ledgers) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!("call rolled back: {err}");
                (self.exchange, self.ledgers) = snapshot;
                Err(err)
            }
        }
    }

    /// Run a payable call: `value` moves from the caller to the exchange first
    fn transact_payable<R>(
        &mut self,
        caller: &Address,
        value: u128,
        op: impl FnOnce(&mut Exchange, &mut Ledgers<T, N>, &Call) -> Result<R>,
    ) -> Result<R> {
        let call = Call::with_value(caller.clone(), value);
        self.transact(|exchange, ledgers| {
            ledgers.native.transfer(&call.caller, exchange.address(), call.value)?;
            op(exchange, ledgers, &call)
        })
    }

    // ========================================================================
    // Exchange Calls
    // ========================================================================

    /// Let the exchange pull up to `amount` of `owner`'s tokens
    pub fn approve_token(&mut self, owner: &Address, amount: u128) -> Result<()> {
        self.transact(|exchange, ledgers| {
            ledgers.token.approve(owner, exchange.address(), amount)?;
            Ok(())
        })
    }

    pub fn add_liquidity(&mut self, caller: &Address, token_amount_max: u128, value: u128) -> Result<u128> {
        self.transact_payable(caller, value, |exchange, ledgers, call| {
            exchange.add_liquidity(ledgers, call, token_amount_max)
        })
    }

    pub fn remove_liquidity(&mut self, caller: &Address, claim_amount: u128) -> Result<Redemption> {
        self.transact(|exchange, ledgers| exchange.remove_liquidity(ledgers, caller, claim_amount))
    }

    pub fn token_to_eth_swap(&mut self, caller: &Address, tokens_sold: u128, min_eth: u128) -> Result<u128> {
        self.transact(|exchange, ledgers| exchange.token_to_eth_swap(ledgers, caller, tokens_sold, min_eth))
    }

    pub fn eth_to_token_swap(&mut self, caller: &Address, value: u128, min_tokens: u128) -> Result<u128> {
        self.transact_payable(caller, value, |exchange, ledgers, call| {
            exchange.eth_to_token_swap(ledgers, call, min_tokens)
        })
    }

    pub fn eth_to_token_transfer(
        &mut self,
        caller: &Address,
        value: u128,
        min_tokens: u128,
        recipient: &Address,
    ) -> Result<u128> {
        self.transact_payable(caller, value, |exchange, ledgers, call| {
            exchange.eth_to_token_transfer(ledgers, call, min_tokens, recipient)
        })
    }

    pub fn transfer_claims(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<()> {
        self.transact(|exchange, _| exchange.transfer(caller, to, amount))
    }

    pub fn approve_claims(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<()> {
        self.transact(|exchange, _| exchange.approve(owner, spender, amount))
    }

    pub fn transfer_claims_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        self.transact(|exchange, _| exchange.transfer_from(spender, owner, to, amount))
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn get_reserve(&self) -> u128 {
        self.exchange.get_reserve()
    }

    pub fn native_reserve(&self) -> u128 {
        self.exchange.native_reserve(&self.ledgers.native)
    }

    pub fn get_token_amount(&self, eth_sold: u128) -> Result<u128> {
        self.exchange.get_token_amount(&self.ledgers.native, eth_sold)
    }

    pub fn get_eth_amount(&self, tokens_sold: u128) -> Result<u128> {
        self.exchange.get_eth_amount(&self.ledgers.native, tokens_sold)
    }

    /// Payout for redeeming `claim_amount` claims now, without redeeming them
    pub fn quote_redemption(&self, claim_amount: u128) -> Result<Redemption> {
        self.exchange.quote_redemption(&self.ledgers.native, claim_amount)
    }

    pub fn token_price(&self) -> Result<u128> {
        self.exchange.token_price(&self.ledgers.native)
    }

    pub fn eth_price(&self) -> Result<u128> {
        self.exchange.eth_price(&self.ledgers.native)
    }
}

impl MemoryHost {
    /// Fresh in-memory world: token `token_symbol` at `token:<symbol>`, exchange at `exchange`
    pub fn in_memory(token_name: &str, token_symbol: &str, config: ExchangeConfig) -> Result<Self> {
        let token_address = Address::new(format!("token:{token_symbol}"));
        let token = MemoryTokenLedger::new(token_address, token_name, token_symbol);
        Self::new(Address::new("exchange"), token, MemoryNativeLedger::new(), config)
    }

    /// Credit native currency and mint tokens to `account`
    pub fn fund(&mut self, account: &Address, native: u128, tokens: u128) -> Result<()> {
        self.transact(|_, ledgers| {
            ledgers.native.deposit(account, native)?;
            ledgers.token.mint(account, tokens)?;
            Ok(())
        })
    }
}
