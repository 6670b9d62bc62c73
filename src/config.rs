//! Exchange configuration

use amm_model::{FeeConfig, DEFAULT_FEE_BPS};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunable parameters fixed at exchange construction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Swap fee in basis points, kept entirely by the pool
    pub fee_bps: u64,
}

impl ExchangeConfig {
    pub fn with_fee_bps(fee_bps: u64) -> Self {
        Self { fee_bps }
    }

    /// Validated fee; rejects 100% or more
    pub fn fee(&self) -> Result<FeeConfig> {
        Ok(FeeConfig::new(self.fee_bps)?)
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self { fee_bps: DEFAULT_FEE_BPS }
    }
}
