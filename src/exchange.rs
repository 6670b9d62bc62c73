//! Exchange facade: one pool pairing a fungible token with the native asset
//!
//! Every operation follows the same shape:
//! 1. validate inputs and compute amounts from the pre-call reserves
//! 2. move funds through the ledgers (any failure aborts)
//! 3. check the staged token reserve is backed by the ledger balance
//! 4. commit the reserve counter and claim balances together
//!
//! Nothing in `self` changes until step 4, so a failed call leaves the
//! exchange untouched. Ledger side effects of a failed call are undone by
//! [`crate::host::Host::transact`], which is why the mutating operations
//! are crate-private: outside this crate they are reached only through
//! [`crate::host::Host`].
//!
//! Payable calls carry their native value in [`Call::value`]; the host
//! credits it to the exchange before the facade runs, so the pre-call native
//! reserve is the ledger balance minus that value.

use amm_model::{
    get_output_amount, liquidity_minted, redemption_amounts, required_token_deposit, spot_price,
    FeeConfig, Redemption,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::claims::ClaimLedger;
use crate::config::ExchangeConfig;
use crate::error::{ExchangeError, Result};
use crate::ledger::{Address, Ledgers, NativeLedger, TokenLedger};

/// Caller identity plus the native value attached to the call
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Call {
    pub caller: Address,
    pub value: u128,
}

impl Call {
    pub fn with_value(caller: Address, value: u128) -> Self {
        Self { caller, value }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    /// The exchange's own account on both ledgers
    address: Address,
    token_address: Address,
    config: ExchangeConfig,
    /// Tracked token reserve; the token ledger balance is only a lower bound
    token_reserve: u128,
    claims: ClaimLedger,
}

impl Exchange {
    /// Create an empty pool for `token`
    ///
    /// The claim token's name and symbol are derived from `token` here and
    /// never change afterwards.
    pub fn new<T: TokenLedger>(address: Address, token: &T, config: ExchangeConfig) -> Result<Self> {
        config.fee()?;
        Ok(Self {
            address,
            token_address: token.address().clone(),
            config,
            token_reserve: 0,
            claims: ClaimLedger::for_token(token.name(), token.symbol()),
        })
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn token_address(&self) -> &Address {
        &self.token_address
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn fee(&self) -> Result<FeeConfig> {
        self.config.fee()
    }

    pub fn name(&self) -> &str {
        self.claims.name()
    }

    pub fn symbol(&self) -> &str {
        self.claims.symbol()
    }

    /// Tracked token reserve. Never read from the ledger.
    pub fn get_reserve(&self) -> u128 {
        self.token_reserve
    }

    /// Native currency currently held by the exchange
    pub fn native_reserve<N: NativeLedger>(&self, native: &N) -> u128 {
        native.balance_of(&self.address)
    }

    pub fn claims(&self) -> &ClaimLedger {
        &self.claims
    }

    pub fn total_supply(&self) -> u128 {
        self.claims.total_supply()
    }

    pub fn balance_of(&self, account: &Address) -> u128 {
        self.claims.balance_of(account)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.claims.allowance(owner, spender)
    }

    // ========================================================================
    // Quotes
    // ========================================================================

    /// Tokens received for selling `eth_sold` at current reserves
    pub fn get_token_amount<N: NativeLedger>(&self, native: &N, eth_sold: u128) -> Result<u128> {
        let out = get_output_amount(eth_sold, self.native_reserve(native), self.token_reserve, self.fee()?)?;
        Ok(out)
    }

    /// Native currency received for selling `tokens_sold` at current reserves
    pub fn get_eth_amount<N: NativeLedger>(&self, native: &N, tokens_sold: u128) -> Result<u128> {
        let out = get_output_amount(tokens_sold, self.token_reserve, self.native_reserve(native), self.fee()?)?;
        Ok(out)
    }

    /// Native per token, scaled by [`amm_model::SCALE`]
    pub fn token_price<N: NativeLedger>(&self, native: &N) -> Result<u128> {
        Ok(spot_price(self.native_reserve(native), self.token_reserve)?)
    }

    /// Tokens per native unit, scaled by [`amm_model::SCALE`]
    pub fn eth_price<N: NativeLedger>(&self, native: &N) -> Result<u128> {
        Ok(spot_price(self.token_reserve, self.native_reserve(native))?)
    }

    /// Payout `claim_amount` claims would redeem at current reserves
    pub fn quote_redemption<N: NativeLedger>(&self, native: &N, claim_amount: u128) -> Result<Redemption> {
        let payout = redemption_amounts(
            claim_amount,
            self.claims.total_supply(),
            self.token_reserve,
            self.native_reserve(native),
        )?;
        Ok(payout)
    }

    // ========================================================================
    // Liquidity
    // ========================================================================

    /// Deposit `call.value` native plus a proportional amount of tokens
    ///
    /// The first deposit sets the price: all of `token_amount_max` is taken
    /// and `call.value` claims are minted. Later deposits take exactly
    /// `value · token_reserve / native_before` tokens and mint
    /// `value · total_supply / native_before` claims.
    ///
    /// # Returns
    /// Claims minted to the caller
    pub(crate) fn add_liquidity<T: TokenLedger, N: NativeLedger>(
        &mut self,
        ledgers: &mut Ledgers<T, N>,
        call: &Call,
        token_amount_max: u128,
    ) -> Result<u128> {
        self.ensure_token(&ledgers.token)?;
        if call.value == 0 || token_amount_max == 0 {
            return Err(ExchangeError::InvalidAmount);
        }

        let (token_in, minted) = if self.token_reserve == 0 {
            (token_amount_max, call.value)
        } else {
            let native_before = self.native_reserve_before(&ledgers.native, call)?;
            let required = required_token_deposit(call.value, self.token_reserve, native_before)?;
            if required > token_amount_max {
                return Err(ExchangeError::InsufficientTokenAmount {
                    required,
                    max: token_amount_max,
                });
            }
            let minted = liquidity_minted(call.value, self.claims.total_supply(), native_before)?;
            (required, minted)
        };
        if minted == 0 {
            return Err(ExchangeError::InvalidAmount);
        }
        debug!(
            "add_liquidity: caller={} value={} token_in={} minted={}",
            call.caller, call.value, token_in, minted
        );

        let staged_reserve = self
            .token_reserve
            .checked_add(token_in)
            .ok_or(ExchangeError::Overflow)?;
        self.claims
            .total_supply()
            .checked_add(minted)
            .ok_or(ExchangeError::Overflow)?;

        ledgers
            .token
            .transfer_from(&self.address, &call.caller, &self.address, token_in)?;
        self.ensure_backing(&ledgers.token, staged_reserve)?;

        self.claims.mint(&call.caller, minted)?;
        self.token_reserve = staged_reserve;
        info!(
            "liquidity added: caller={} tokens={} native={} claims={}",
            call.caller, token_in, call.value, minted
        );
        Ok(minted)
    }

    /// Redeem `claim_amount` claims for a pro-rata share of both reserves
    pub(crate) fn remove_liquidity<T: TokenLedger, N: NativeLedger>(
        &mut self,
        ledgers: &mut Ledgers<T, N>,
        caller: &Address,
        claim_amount: u128,
    ) -> Result<Redemption> {
        self.ensure_token(&ledgers.token)?;
        let total_supply = self.claims.total_supply();
        if claim_amount == 0 || claim_amount > total_supply {
            return Err(ExchangeError::InvalidAmount);
        }
        if self.claims.balance_of(caller) < claim_amount {
            return Err(ExchangeError::InsufficientClaimBalance);
        }

        let payout = self.quote_redemption(&ledgers.native, claim_amount)?;
        let staged_reserve = self.token_reserve - payout.token_out;
        debug!(
            "remove_liquidity: caller={} claims={} token_out={} native_out={}",
            caller, claim_amount, payout.token_out, payout.native_out
        );

        ledgers.token.transfer(&self.address, caller, payout.token_out)?;
        ledgers.native.transfer(&self.address, caller, payout.native_out)?;
        self.ensure_backing(&ledgers.token, staged_reserve)?;

        self.claims.burn(caller, claim_amount)?;
        self.token_reserve = staged_reserve;
        info!(
            "liquidity removed: caller={} claims={} tokens={} native={}",
            caller, claim_amount, payout.token_out, payout.native_out
        );
        Ok(payout)
    }

    // ========================================================================
    // Swaps
    // ========================================================================

    /// Sell `tokens_sold` tokens for native currency
    pub(crate) fn token_to_eth_swap<T: TokenLedger, N: NativeLedger>(
        &mut self,
        ledgers: &mut Ledgers<T, N>,
        caller: &Address,
        tokens_sold: u128,
        min_eth: u128,
    ) -> Result<u128> {
        self.ensure_token(&ledgers.token)?;
        let native_reserve = self.native_reserve(&ledgers.native);
        let eth_bought = get_output_amount(tokens_sold, self.token_reserve, native_reserve, self.fee()?)?;
        if eth_bought < min_eth {
            return Err(ExchangeError::SlippageExceeded { out: eth_bought, min: min_eth });
        }
        let staged_reserve = self
            .token_reserve
            .checked_add(tokens_sold)
            .ok_or(ExchangeError::Overflow)?;
        debug!(
            "token_to_eth: caller={} sold={} reserves=({}, {}) out={}",
            caller, tokens_sold, self.token_reserve, native_reserve, eth_bought
        );

        ledgers
            .token
            .transfer_from(&self.address, caller, &self.address, tokens_sold)?;
        ledgers.native.transfer(&self.address, caller, eth_bought)?;
        self.ensure_backing(&ledgers.token, staged_reserve)?;

        self.token_reserve = staged_reserve;
        info!("swap token->eth: caller={} tokens_in={} eth_out={}", caller, tokens_sold, eth_bought);
        Ok(eth_bought)
    }

    /// Sell the attached native value for tokens delivered to the caller
    pub(crate) fn eth_to_token_swap<T: TokenLedger, N: NativeLedger>(
        &mut self,
        ledgers: &mut Ledgers<T, N>,
        call: &Call,
        min_tokens: u128,
    ) -> Result<u128> {
        let recipient = call.caller.clone();
        self.eth_to_token_transfer(ledgers, call, min_tokens, &recipient)
    }

    /// Sell the attached native value for tokens delivered to `recipient`
    pub(crate) fn eth_to_token_transfer<T: TokenLedger, N: NativeLedger>(
        &mut self,
        ledgers: &mut Ledgers<T, N>,
        call: &Call,
        min_tokens: u128,
        recipient: &Address,
    ) -> Result<u128> {
        self.ensure_token(&ledgers.token)?;
        // The attached value is already in our balance; price against the reserve before it
        let native_before = self.native_reserve_before(&ledgers.native, call)?;
        let tokens_bought = get_output_amount(call.value, native_before, self.token_reserve, self.fee()?)?;
        if tokens_bought < min_tokens {
            return Err(ExchangeError::SlippageExceeded { out: tokens_bought, min: min_tokens });
        }
        let staged_reserve = self.token_reserve - tokens_bought;
        debug!(
            "eth_to_token: caller={} sold={} reserves=({}, {}) out={}",
            call.caller, call.value, native_before, self.token_reserve, tokens_bought
        );

        ledgers.token.transfer(&self.address, recipient, tokens_bought)?;
        self.ensure_backing(&ledgers.token, staged_reserve)?;

        self.token_reserve = staged_reserve;
        info!(
            "swap eth->token: caller={} recipient={} eth_in={} tokens_out={}",
            call.caller, recipient, call.value, tokens_bought
        );
        Ok(tokens_bought)
    }

    // ========================================================================
    // Claim Token
    // ========================================================================

    /// Move claims between holders; reserves are unaffected
    pub(crate) fn transfer(&mut self, caller: &Address, to: &Address, amount: u128) -> Result<()> {
        self.claims.transfer(caller, to, amount)
    }

    pub(crate) fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<()> {
        self.claims.approve(owner, spender, amount);
        Ok(())
    }

    pub(crate) fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<()> {
        self.claims.transfer_from(spender, owner, to, amount)
    }

    // ========================================================================
    // Reserve Accounting Helpers
    // ========================================================================

    fn native_reserve_before<N: NativeLedger>(&self, native: &N, call: &Call) -> Result<u128> {
        self.native_reserve(native)
            .checked_sub(call.value)
            .ok_or(ExchangeError::ValueNotCredited { value: call.value })
    }

    fn ensure_token<T: TokenLedger>(&self, token: &T) -> Result<()> {
        if token.address() != &self.token_address {
            return Err(ExchangeError::TokenMismatch);
        }
        Ok(())
    }

    /// Ledger balance may exceed the tracked reserve (donations) but never trail it
    fn ensure_backing<T: TokenLedger>(&self, token: &T, staged_reserve: u128) -> Result<()> {
        if token.balance_of(&self.address) < staged_reserve {
            return Err(ExchangeError::ReserveUnderfunded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{MemoryNativeLedger, MemoryTokenLedger};

    fn addr(id: &str) -> Address {
        Address::new(id)
    }

    /// Exchange plus ledgers with `alice` funded and the exchange approved
    fn setup() -> (Exchange, Ledgers<MemoryTokenLedger, MemoryNativeLedger>) {
        let mut token = MemoryTokenLedger::new(addr("tkn"), "Token", "TKN");
        token.mint(&addr("alice"), 10_000).unwrap();
        token.approve(&addr("alice"), &addr("pool"), u128::MAX).unwrap();
        let mut native = MemoryNativeLedger::new();
        native.deposit(&addr("alice"), 10_000).unwrap();
        let exchange = Exchange::new(addr("pool"), &token, ExchangeConfig::default()).unwrap();
        (exchange, Ledgers::new(token, native))
    }

    /// Credit the attached value the way the host does
    fn pay(ledgers: &mut Ledgers<MemoryTokenLedger, MemoryNativeLedger>, from: &str, value: u128) -> Call {
        ledgers.native.transfer(&addr(from), &addr("pool"), value).unwrap();
        Call::with_value(addr(from), value)
    }

    #[test]
    fn test_first_deposit_mints_native_amount() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1);
        let minted = ex.add_liquidity(&mut ledgers, &call, 100).unwrap();

        assert_eq!(minted, 1);
        assert_eq!(ex.get_reserve(), 100);
        assert_eq!(ex.native_reserve(&ledgers.native), 1);
        assert_eq!(ex.balance_of(&addr("alice")), 1);
        assert_eq!(ledgers.token.balance_of(&addr("pool")), 100);
    }

    #[test]
    fn test_subsequent_deposit_takes_exact_ratio() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        let call = pay(&mut ledgers, "alice", 100);
        let minted = ex.add_liquidity(&mut ledgers, &call, 5_000).unwrap();
        assert_eq!(minted, 100);
        assert_eq!(ex.get_reserve(), 2_200);
        assert_eq!(ledgers.token.balance_of(&addr("alice")), 10_000 - 2_200);
    }

    #[test]
    fn test_deposit_below_required_tokens_fails() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();
        let before = ex.clone();

        let call = pay(&mut ledgers, "alice", 100);
        let result = ex.add_liquidity(&mut ledgers, &call, 199);
        assert_eq!(
            result,
            Err(ExchangeError::InsufficientTokenAmount { required: 200, max: 199 })
        );
        assert_eq!(ex, before);
    }

    #[test]
    fn test_zero_amounts_rejected() {
        let (mut ex, mut ledgers) = setup();
        let call = Call::with_value(addr("alice"), 0);
        assert_eq!(ex.add_liquidity(&mut ledgers, &call, 100), Err(ExchangeError::InvalidAmount));
        let call = pay(&mut ledgers, "alice", 5);
        assert_eq!(ex.add_liquidity(&mut ledgers, &call, 0), Err(ExchangeError::InvalidAmount));
    }

    #[test]
    fn test_remove_liquidity_pays_pro_rata() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        let payout = ex.remove_liquidity(&mut ledgers, &addr("alice"), 250).unwrap();
        assert_eq!(payout, Redemption { token_out: 500, native_out: 250 });
        assert_eq!(ex.get_reserve(), 1_500);
        assert_eq!(ex.total_supply(), 750);
        assert_eq!(ex.native_reserve(&ledgers.native), 750);
    }

    #[test]
    fn test_remove_liquidity_bounds() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        assert_eq!(ex.remove_liquidity(&mut ledgers, &addr("alice"), 0), Err(ExchangeError::InvalidAmount));
        assert_eq!(
            ex.remove_liquidity(&mut ledgers, &addr("alice"), 1_001),
            Err(ExchangeError::InvalidAmount)
        );
        assert_eq!(
            ex.remove_liquidity(&mut ledgers, &addr("bob"), 1),
            Err(ExchangeError::InsufficientClaimBalance)
        );
    }

    #[test]
    fn test_token_to_eth_swap() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        let expected = ex.get_eth_amount(&ledgers.native, 200).unwrap();
        let out = ex.token_to_eth_swap(&mut ledgers, &addr("alice"), 200, expected).unwrap();
        assert_eq!(out, expected);
        assert_eq!(ex.get_reserve(), 2_200);
        assert_eq!(ex.native_reserve(&ledgers.native), 1_000 - out);
    }

    #[test]
    fn test_eth_to_token_prices_against_pre_call_reserve() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        let quote = ex.get_token_amount(&ledgers.native, 100).unwrap();
        let call = pay(&mut ledgers, "alice", 100);
        let out = ex.eth_to_token_swap(&mut ledgers, &call, 0).unwrap();

        // Pricing against 1100 native would have returned fewer tokens
        assert_eq!(out, quote);
        assert_eq!(out, get_output_amount(100, 1_000, 2_000, FeeConfig::default()).unwrap());
        assert_eq!(ex.get_reserve(), 2_000 - out);
    }

    #[test]
    fn test_slippage_guard() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();
        let before = ex.clone();

        let call = pay(&mut ledgers, "alice", 100);
        let result = ex.eth_to_token_swap(&mut ledgers, &call, 1_000);
        assert!(matches!(result, Err(ExchangeError::SlippageExceeded { min: 1_000, .. })));
        assert_eq!(ex, before);
    }

    #[test]
    fn test_swap_against_empty_pool() {
        let (mut ex, mut ledgers) = setup();
        assert_eq!(
            ex.token_to_eth_swap(&mut ledgers, &addr("alice"), 10, 0),
            Err(ExchangeError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_direct_token_transfer_does_not_move_reserve() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();

        ledgers.token.transfer(&addr("alice"), &addr("pool"), 500).unwrap();
        assert_eq!(ex.get_reserve(), 2_000);
        assert_eq!(ex.eth_price(&ledgers.native).unwrap(), 2 * amm_model::SCALE);
    }

    #[test]
    fn test_uncredited_value_rejected() {
        let (mut ex, mut ledgers) = setup();
        let call = pay(&mut ledgers, "alice", 1_000);
        ex.add_liquidity(&mut ledgers, &call, 2_000).unwrap();
        let before = ex.clone();

        // Value claimed on the call but never moved into the pool
        let call = Call::with_value(addr("alice"), 5_000);
        assert_eq!(
            ex.eth_to_token_swap(&mut ledgers, &call, 0),
            Err(ExchangeError::ValueNotCredited { value: 5_000 })
        );
        assert_eq!(
            ex.add_liquidity(&mut ledgers, &call, 10_000),
            Err(ExchangeError::ValueNotCredited { value: 5_000 })
        );
        assert_eq!(ex, before);
    }

    #[test]
    fn test_wrong_token_ledger_rejected() {
        let (mut ex, ledgers) = setup();
        let other = MemoryTokenLedger::new(addr("other"), "Other", "OTH");
        let mut mixed = Ledgers::new(other, ledgers.native);
        assert_eq!(
            ex.remove_liquidity(&mut mixed, &addr("alice"), 1),
            Err(ExchangeError::TokenMismatch)
        );
    }
}
