//! Error taxonomy for exchange and ledger operations

use amm_model::AmmError;
use thiserror::Error;

/// Failure reported by a token or native-currency ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Debited account holds less than the transfer amount
    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    /// Spender's allowance is below the transfer amount
    #[error("insufficient allowance: needed {needed}, available {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    /// Credit would overflow the recipient balance or the supply
    #[error("ledger balance overflow")]
    Overflow,
}

/// Errors surfaced by the exchange; any of them aborts the whole call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Zero amount where a positive amount is required
    #[error("invalid amount")]
    InvalidAmount,

    /// Pool has no reserves on a side the operation needs
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Caller's token maximum is below the proportional requirement
    #[error("insufficient token amount: required {required}, max {max}")]
    InsufficientTokenAmount { required: u128, max: u128 },

    /// Computed output is below the caller's minimum
    #[error("slippage exceeded: output {out} below minimum {min}")]
    SlippageExceeded { out: u128, min: u128 },

    /// Underlying token or native transfer failed
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] LedgerError),

    /// Caller holds fewer claim tokens than requested
    #[error("insufficient claim balance")]
    InsufficientClaimBalance,

    /// Spender's claim-token allowance is too small
    #[error("insufficient claim allowance")]
    InsufficientClaimAllowance,

    /// Fee at or above 100%
    #[error("invalid fee")]
    InvalidFee,

    /// Ledger passed to the exchange is not the paired token
    #[error("token ledger does not match the exchange's token")]
    TokenMismatch,

    /// Payable call whose attached value was never credited to the exchange
    #[error("attached value {value} was not credited to the exchange")]
    ValueNotCredited { value: u128 },

    /// Token ledger balance of the exchange fell below the tracked reserve
    #[error("token reserve is not backed by the ledger balance")]
    ReserveUnderfunded,

    /// Arithmetic overflow
    #[error("arithmetic overflow")]
    Overflow,
}

impl From<AmmError> for ExchangeError {
    fn from(err: AmmError) -> Self {
        match err {
            AmmError::InvalidAmount => ExchangeError::InvalidAmount,
            AmmError::InsufficientLiquidity => ExchangeError::InsufficientLiquidity,
            AmmError::InvalidFee => ExchangeError::InvalidFee,
            AmmError::Overflow => ExchangeError::Overflow,
        }
    }
}

pub type Result<T> = core::result::Result<T, ExchangeError>;
