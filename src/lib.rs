//! Single-pair constant product exchange (x·y=k)
//!
//! One [`Exchange`] pairs a fungible token with the native settlement asset.
//! Liquidity providers deposit both sides and receive claim tokens; traders
//! swap either way against the reserves at a price set by their ratio.
//!
//! - Pricing and liquidity math come from the `amm_model` crate
//! - The token reserve is tracked explicitly; the native reserve is the
//!   exchange's balance on the native ledger
//! - Every call is all-or-nothing: [`Host`] snapshots the exchange and both
//!   ledgers and restores them when a call fails

#![forbid(unsafe_code)]

pub mod claims;
pub mod config;
pub mod error;
pub mod exchange;
pub mod host;
pub mod ledger;

pub use amm_model::{FeeConfig, Redemption, BPS_SCALE, DEFAULT_FEE_BPS, SCALE};
pub use claims::ClaimLedger;
pub use config::ExchangeConfig;
pub use error::{ExchangeError, LedgerError, Result};
pub use exchange::Exchange;
pub use host::{Host, MemoryHost, SharedHost};
pub use ledger::{
    Address, Allowances, Balances, Ledgers, MemoryNativeLedger, MemoryTokenLedger, NativeLedger,
    TokenLedger,
};
