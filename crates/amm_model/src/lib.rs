//! AMM Model - Pure constant product math (x·y=k) for formal verification
//!
//! This crate holds the pricing and liquidity formulas of the exchange as
//! total functions over `u128`. Intermediate products are widened to
//! `U256`/`U512`, so only a final result above `u128` reports `Overflow`.
//! Nothing here touches ledgers or state: the
//! `pairswap` crate imports these functions directly and the Kani harnesses
//! in `crates/proofs/kani` check them.

#![no_std]
#![forbid(unsafe_code)]

use primitive_types::{U256, U512};

pub mod liquidity;
pub mod math;

pub use liquidity::{liquidity_minted, redemption_amounts, required_token_deposit, Redemption};
pub use math::{get_input_amount, get_output_amount, spot_price, FeeConfig};

/// Price scaling factor (1e6)
pub const SCALE: u128 = 1_000_000;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Default swap fee: 30 bps (0.3%)
pub const DEFAULT_FEE_BPS: u64 = 30;

/// Error types for AMM operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmError {
    /// Invalid amount (zero where a positive amount is required)
    InvalidAmount,
    /// Zero reserve on a side the operation needs
    InsufficientLiquidity,
    /// Fee at or above 100%
    InvalidFee,
    /// Arithmetic overflow
    Overflow,
}

/// `floor(a * b / c)` over a 256-bit product; `Overflow` only if the quotient exceeds `u128`
pub(crate) fn mul_div_floor(a: u128, b: u128, c: u128) -> Result<u128, AmmError> {
    if c == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    let quotient = wide_mul(a, b)
        .checked_div(U256::from(c))
        .ok_or(AmmError::InsufficientLiquidity)?;
    narrow_u256(quotient)
}

/// Exact `a * b` for two `u128` values; the product always fits 256 bits
pub(crate) fn wide_mul(a: u128, b: u128) -> U256 {
    U256::from(a).overflowing_mul(U256::from(b)).0
}

pub(crate) fn narrow_u256(value: U256) -> Result<u128, AmmError> {
    if value.bits() > 128 {
        return Err(AmmError::Overflow);
    }
    Ok(value.low_u128())
}

pub(crate) fn narrow_u512(value: U512) -> Result<u128, AmmError> {
    if value.bits() > 128 {
        return Err(AmmError::Overflow);
    }
    Ok(value.low_u128())
}
