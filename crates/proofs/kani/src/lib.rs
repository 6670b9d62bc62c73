//! Kani harnesses for the exchange math
//!
//! Run with: cargo kani -p proofs-kani

#![no_std]

#[cfg(kani)]
mod amm;
