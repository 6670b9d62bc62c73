//! Proportional liquidity math
//!
//! Deposits after the first one must match the current reserve ratio, and
//! claims are minted and redeemed pro rata against the native reserve.
//! Every division floors, which always rounds in favour of the pool.

use crate::{mul_div_floor, AmmError};

/// Payout for redeeming a quantity of claim tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redemption {
    /// Tokens returned to the redeemer
    pub token_out: u128,
    /// Native currency returned to the redeemer
    pub native_out: u128,
}

/// Tokens a depositor must add alongside `native_in` to keep the ratio
///
/// `required = ⌊native_in · token_reserve / native_reserve⌋`
pub fn required_token_deposit(
    native_in: u128,
    token_reserve: u128,
    native_reserve: u128,
) -> Result<u128, AmmError> {
    if native_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if native_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div_floor(native_in, token_reserve, native_reserve)
}

/// Claim tokens minted for a proportional deposit of `native_in`
///
/// `minted = ⌊native_in · total_supply / native_reserve⌋`
pub fn liquidity_minted(
    native_in: u128,
    total_supply: u128,
    native_reserve: u128,
) -> Result<u128, AmmError> {
    if native_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if native_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div_floor(native_in, total_supply, native_reserve)
}

/// Pro-rata share of both reserves for `claim_amount` out of `total_supply`
///
/// # Returns
/// * `AmmError::InvalidAmount` if `claim_amount` is zero or exceeds the supply
pub fn redemption_amounts(
    claim_amount: u128,
    total_supply: u128,
    token_reserve: u128,
    native_reserve: u128,
) -> Result<Redemption, AmmError> {
    if claim_amount == 0 || claim_amount > total_supply {
        return Err(AmmError::InvalidAmount);
    }

    Ok(Redemption {
        token_out: mul_div_floor(token_reserve, claim_amount, total_supply)?,
        native_out: mul_div_floor(native_reserve, claim_amount, total_supply)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_deposit_matches_ratio() {
        // 2000 tokens / 1000 native: 10 native needs 20 tokens
        assert_eq!(required_token_deposit(10, 2_000, 1_000).unwrap(), 20);
        // Floors: 1 native against 3 tokens / 2 native needs 1 token
        assert_eq!(required_token_deposit(1, 3, 2).unwrap(), 1);
    }

    #[test]
    fn test_minted_is_proportional_to_supply() {
        assert_eq!(liquidity_minted(250, 1_000, 1_000).unwrap(), 250);
        assert_eq!(liquidity_minted(1, 1_000, 3_000).unwrap(), 0);
    }

    #[test]
    fn test_empty_native_reserve_rejected() {
        assert_eq!(required_token_deposit(5, 100, 0), Err(AmmError::InsufficientLiquidity));
        assert_eq!(liquidity_minted(5, 100, 0), Err(AmmError::InsufficientLiquidity));
        assert_eq!(liquidity_minted(0, 100, 10), Err(AmmError::InvalidAmount));
    }

    #[test]
    fn test_full_redemption_returns_everything() {
        let r = redemption_amounts(1_000, 1_000, 1_234, 567).unwrap();
        assert_eq!(r, Redemption { token_out: 1_234, native_out: 567 });
    }

    #[test]
    fn test_partial_redemption_floors() {
        let r = redemption_amounts(1, 3, 100, 10).unwrap();
        assert_eq!(r.token_out, 33);
        assert_eq!(r.native_out, 3);
    }

    #[test]
    fn test_redemption_bounds() {
        assert_eq!(redemption_amounts(0, 10, 10, 10), Err(AmmError::InvalidAmount));
        assert_eq!(redemption_amounts(11, 10, 10, 10), Err(AmmError::InvalidAmount));
    }
}
