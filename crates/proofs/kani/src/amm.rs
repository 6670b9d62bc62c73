//! Kani proofs for the constant-product exchange math
//!
//! - **P1: Product Non-Decreasing** - a swap never shrinks x·y
//! - **P2: Output Bounded** - a swap never pays out the whole reserve
//! - **P3: Exact Output Covers** - the quoted input buys at least the output
//! - **P4: Redemption Bounded** - claims never redeem more than their share
//! - **P5: Deposit Ratio** - proportional deposits never dilute the ratio

use amm_model::{
    get_input_amount, get_output_amount, liquidity_minted, redemption_amounts, required_token_deposit,
    FeeConfig,
};

/// Reserves small enough that the harness-side products fit `u128` and the solver stays fast
const MAX_RESERVE: u128 = 1 << 40;

fn any_fee() -> FeeConfig {
    let fee_bps: u64 = kani::any();
    kani::assume(fee_bps < 10_000);
    FeeConfig::new(fee_bps).unwrap()
}

/// P1: x·y after a swap is at least x·y before
#[kani::proof]
#[kani::unwind(17)]
fn p1_product_non_decreasing() {
    let x: u128 = kani::any();
    let y: u128 = kani::any();
    let dx: u128 = kani::any();
    kani::assume(x > 0 && x < MAX_RESERVE);
    kani::assume(y > 0 && y < MAX_RESERVE);
    kani::assume(dx > 0 && dx < MAX_RESERVE);
    let fee = any_fee();

    if let Ok(dy) = get_output_amount(dx, x, y, fee) {
        assert!((x + dx) * (y - dy) >= x * y, "P1: product must not decrease");
    }
}

/// P2: output is strictly less than the output reserve
#[kani::proof]
#[kani::unwind(17)]
fn p2_output_bounded() {
    let x: u128 = kani::any();
    let y: u128 = kani::any();
    let dx: u128 = kani::any();
    kani::assume(x > 0 && x < MAX_RESERVE);
    kani::assume(y > 0 && y < MAX_RESERVE);
    kani::assume(dx > 0 && dx < MAX_RESERVE);
    let fee = any_fee();

    if let Ok(dy) = get_output_amount(dx, x, y, fee) {
        assert!(dy < y, "P2: swap must leave output reserve non-empty");
    }
}

/// P3: paying the exact-output quote yields at least the requested output
#[kani::proof]
#[kani::unwind(17)]
fn p3_exact_output_covers() {
    let x: u128 = kani::any();
    let y: u128 = kani::any();
    let dy: u128 = kani::any();
    kani::assume(x > 0 && x < MAX_RESERVE);
    kani::assume(y > 0 && y < MAX_RESERVE);
    kani::assume(dy > 0 && dy < y);
    let fee = any_fee();

    if let Ok(dx) = get_input_amount(dy, x, y, fee) {
        if let Ok(out) = get_output_amount(dx, x, y, fee) {
            assert!(out >= dy, "P3: quoted input must buy the output");
        }
    }
}

/// P4: redeeming part of the supply never exceeds the pro-rata share
#[kani::proof]
#[kani::unwind(17)]
fn p4_redemption_bounded() {
    let claim: u128 = kani::any();
    let supply: u128 = kani::any();
    let tokens: u128 = kani::any();
    let native: u128 = kani::any();
    kani::assume(supply > 0 && supply < MAX_RESERVE);
    kani::assume(claim > 0 && claim <= supply);
    kani::assume(tokens < MAX_RESERVE && native < MAX_RESERVE);

    if let Ok(payout) = redemption_amounts(claim, supply, tokens, native) {
        assert!(payout.token_out <= tokens, "P4: token payout within reserve");
        assert!(payout.native_out <= native, "P4: native payout within reserve");
        assert!(payout.token_out * supply <= tokens * claim, "P4: token payout pro rata");
        assert!(payout.native_out * supply <= native * claim, "P4: native payout pro rata");
        if claim == supply {
            assert!(payout.token_out == tokens && payout.native_out == native);
        }
    }
}

/// P5: a deposit adds at least its share of tokens and mints at most its share of claims
#[kani::proof]
#[kani::unwind(17)]
fn p5_deposit_ratio() {
    let native_in: u128 = kani::any();
    let tokens: u128 = kani::any();
    let native: u128 = kani::any();
    let supply: u128 = kani::any();
    kani::assume(native_in > 0 && native_in < MAX_RESERVE);
    kani::assume(tokens > 0 && tokens < MAX_RESERVE);
    kani::assume(native > 0 && native < MAX_RESERVE);
    kani::assume(supply > 0 && supply < MAX_RESERVE);

    if let (Ok(required), Ok(minted)) = (
        required_token_deposit(native_in, tokens, native),
        liquidity_minted(native_in, supply, native),
    ) {
        assert!(minted * native <= native_in * supply, "P5: mint never exceeds share");
        assert!((required + 1) * native > native_in * tokens, "P5: required is the floor");
    }
}
