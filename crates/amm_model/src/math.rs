//! Constant product swap pricing (x·y=k) with the fee taken on input

use primitive_types::{U256, U512};

use crate::{mul_div_floor, narrow_u512, wide_mul, AmmError, BPS_SCALE, DEFAULT_FEE_BPS, SCALE};

/// Swap fee expressed as a fraction `numerator / denominator` of the input
/// that participates in the trade.
///
/// Built from basis points: a 30 bps fee keeps 9970/10000 of every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeConfig {
    fee_bps: u64,
}

impl FeeConfig {
    /// Create a fee config, rejecting fees of 100% or more
    pub fn new(fee_bps: u64) -> Result<Self, AmmError> {
        if fee_bps >= BPS_SCALE {
            return Err(AmmError::InvalidFee);
        }
        Ok(Self { fee_bps })
    }

    /// Fee with no charge (pure x·y=k)
    pub const fn zero() -> Self {
        Self { fee_bps: 0 }
    }

    pub fn fee_bps(&self) -> u64 {
        self.fee_bps
    }

    /// Share of the input kept after the fee, over `denominator()`
    pub fn numerator(&self) -> u128 {
        (BPS_SCALE - self.fee_bps) as u128
    }

    pub fn denominator(&self) -> u128 {
        BPS_SCALE as u128
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self { fee_bps: DEFAULT_FEE_BPS }
    }
}

/// Output amount for selling `input_amount` into the pool
///
/// ```text
/// input_with_fee = Δin · num
/// Δout = ⌊(input_with_fee · y) / (x · den + input_with_fee)⌋
/// ```
///
/// Floor division keeps the rounding dust in the pool, so the product of
/// the reserves after the trade is never below the product before it, and
/// is strictly above it whenever the fee is non-zero. The result is always
/// strictly less than `output_reserve`.
///
/// # Arguments
/// * `input_amount` - Amount the trader sells (must be > 0)
/// * `input_reserve` - Pool reserve of the sold asset, before this trade
/// * `output_reserve` - Pool reserve of the bought asset, before this trade
/// * `fee` - Swap fee applied to the input
///
/// # Returns
/// * `AmmError::InsufficientLiquidity` if either reserve is zero
/// * `AmmError::InvalidAmount` if `input_amount` is zero
///
/// The result is below `output_reserve`, so it never overflows.
pub fn get_output_amount(
    input_amount: u128,
    input_reserve: u128,
    output_reserve: u128,
    fee: FeeConfig,
) -> Result<u128, AmmError> {
    if input_reserve == 0 || output_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    if input_amount == 0 {
        return Err(AmmError::InvalidAmount);
    }

    let input_with_fee = wide_mul(input_amount, fee.numerator());
    let numerator = input_with_fee.full_mul(U256::from(output_reserve));
    let denominator = wide_mul(input_reserve, fee.denominator())
        .checked_add(input_with_fee)
        .ok_or(AmmError::Overflow)?;

    let out = numerator
        .checked_div(U512::from(denominator))
        .ok_or(AmmError::InsufficientLiquidity)?;
    narrow_u512(out)
}

/// Input amount required to buy exactly `output_amount` from the pool
///
/// ```text
/// Δin = ⌊(x · Δout · den) / ((y - Δout) · num)⌋ + 1
/// ```
///
/// The `+ 1` rounds in the pool's favour: selling the returned amount
/// through [`get_output_amount`] yields at least `output_amount`.
/// `AmmError::Overflow` means the required input does not fit `u128`.
pub fn get_input_amount(
    output_amount: u128,
    input_reserve: u128,
    output_reserve: u128,
    fee: FeeConfig,
) -> Result<u128, AmmError> {
    if input_reserve == 0 || output_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    if output_amount == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if output_amount >= output_reserve {
        return Err(AmmError::InsufficientLiquidity);
    }

    let numerator = wide_mul(input_reserve, output_amount).full_mul(U256::from(fee.denominator()));
    let denominator = wide_mul(output_reserve - output_amount, fee.numerator());

    let quotient = numerator
        .checked_div(U512::from(denominator))
        .ok_or(AmmError::InsufficientLiquidity)?;
    narrow_u512(quotient)?
        .checked_add(1)
        .ok_or(AmmError::Overflow)
}

/// Marginal price of one unit of the denominator asset, in units of the
/// numerator asset, scaled by [`SCALE`]
pub fn spot_price(numerator_reserve: u128, denominator_reserve: u128) -> Result<u128, AmmError> {
    if numerator_reserve == 0 || denominator_reserve == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    mul_div_floor(numerator_reserve, SCALE, denominator_reserve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee30() -> FeeConfig {
        FeeConfig::new(30).unwrap()
    }

    #[test]
    fn test_output_amount_with_fee() {
        // 1000 in against 10k/10k: 906 with 0.3% fee, 909 without
        assert_eq!(get_output_amount(1000, 10_000, 10_000, fee30()).unwrap(), 906);
        assert_eq!(get_output_amount(1000, 10_000, 10_000, FeeConfig::zero()).unwrap(), 909);
    }

    #[test]
    fn test_output_below_one_unit_floors_to_zero() {
        // Pool of 100 tokens / 1 native: selling 100 tokens cannot buy a whole unit
        assert_eq!(get_output_amount(100, 100, 1, fee30()).unwrap(), 0);
    }

    #[test]
    fn test_output_never_drains_reserve() {
        let out = get_output_amount(u64::MAX as u128, 10, 1_000, fee30()).unwrap();
        assert!(out < 1_000);
    }

    #[test]
    fn test_invariant_increases_with_fees() {
        let (x0, y0) = (50_000u128, 2_000u128);
        let dx = 7_500;
        let dy = get_output_amount(dx, x0, y0, fee30()).unwrap();
        assert!((x0 + dx) * (y0 - dy) > x0 * y0);
    }

    #[test]
    fn test_zero_reserves_rejected() {
        assert_eq!(get_output_amount(10, 0, 100, fee30()), Err(AmmError::InsufficientLiquidity));
        assert_eq!(get_output_amount(10, 100, 0, fee30()), Err(AmmError::InsufficientLiquidity));
        assert_eq!(get_output_amount(0, 100, 100, fee30()), Err(AmmError::InvalidAmount));
    }

    #[test]
    fn test_wei_scale_reserves() {
        // 0.1 in against a 1/1 pool of 18-decimal units
        const ONE: u128 = 1_000_000_000_000_000_000;
        let out = get_output_amount(ONE / 10, ONE, ONE, fee30()).unwrap();
        // 1e17 · 9970 · 1e18 / (1e18 · 10000 + 1e17 · 9970)
        assert_eq!(out, 90_661_089_388_014_913);

        let needed = get_input_amount(out, ONE, ONE, fee30()).unwrap();
        assert!(needed <= ONE / 10);
        assert!(get_output_amount(needed, ONE, ONE, fee30()).unwrap() >= out);
    }

    #[test]
    fn test_extreme_reserves_stay_exact() {
        let out = get_output_amount(u128::MAX / 2, 1, u128::MAX / 2, fee30()).unwrap();
        assert!(out < u128::MAX / 2);
        assert!(get_output_amount(u128::MAX, u128::MAX, u128::MAX, FeeConfig::zero()).unwrap() == u128::MAX / 2);
    }

    #[test]
    fn test_input_amount_overflow_reported() {
        // Buying all but one unit of a huge reserve costs more than u128 holds
        let result = get_input_amount(u128::MAX - 1, u128::MAX, u128::MAX, fee30());
        assert_eq!(result, Err(AmmError::Overflow));
    }

    #[test]
    fn test_input_amount_inverts_output() {
        assert_eq!(get_input_amount(906, 10_000, 10_000, fee30()).unwrap(), 1000);
        let needed = get_input_amount(500, 7_000, 3_000, fee30()).unwrap();
        assert!(get_output_amount(needed, 7_000, 3_000, fee30()).unwrap() >= 500);
    }

    #[test]
    fn test_input_amount_cannot_buy_whole_reserve() {
        assert_eq!(
            get_input_amount(1_000, 10_000, 1_000, fee30()),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn test_fee_bounds() {
        assert_eq!(FeeConfig::new(10_000), Err(AmmError::InvalidFee));
        let fee = FeeConfig::new(9_999).unwrap();
        assert_eq!(fee.numerator(), 1);
        assert_eq!(FeeConfig::default().fee_bps(), DEFAULT_FEE_BPS);
    }

    #[test]
    fn test_spot_price() {
        assert_eq!(spot_price(2_000, 1_000).unwrap(), 2 * SCALE);
        assert_eq!(spot_price(1_000, 2_000).unwrap(), SCALE / 2);
        assert_eq!(spot_price(0, 2_000), Err(AmmError::InsufficientLiquidity));
        assert_eq!(spot_price(u128::MAX, u128::MAX).unwrap(), SCALE);
    }
}
