/// Error types for quote and conversion math

use thiserror::Error;

/// Errors surfaced by the math crate
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("Math overflow")]
    MathOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Amount exceeds the maximum token amount")]
    AmountExceedsMax,

    #[error("Tick index out of bounds")]
    TickIndexOutOfBounds,

    #[error("Tick index not aligned to the pool tick spacing")]
    TickIndexNotAligned,

    #[error("Invalid tick range")]
    InvalidTickRange,

    #[error("Sqrt price out of bounds")]
    SqrtPriceOutOfBounds,

    #[error("Slippage tolerance exceeds 10000 bps")]
    InvalidSlippageTolerance,

    #[error("Tick array sequence is not contiguous")]
    InvalidTickArraySequence,

    #[error("Swap crossed past the fetched tick arrays")]
    TickArraySequenceExhausted,

    #[error("Invalid reward index")]
    InvalidRewardIndex,

    #[error("Zero tradable amount")]
    ZeroTradableAmount,
}

pub type CoreResult<T> = Result<T, CoreError>;
