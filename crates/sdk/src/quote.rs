/// Liquidity parameter dispatch
///
/// Callers size a liquidity change by whichever quantity they actually
/// hold; the assemblers dispatch to the matching quote function exactly
/// once, here.

use tidepool_math::{
    decrease_liquidity_quote_by_liquidity, decrease_liquidity_quote_by_token_a,
    decrease_liquidity_quote_by_token_b, increase_liquidity_quote_by_liquidity,
    increase_liquidity_quote_by_token_a, increase_liquidity_quote_by_token_b,
    DecreaseLiquidityQuote, IncreaseLiquidityQuote, TransferFee,
};

use crate::errors::SdkResult;

/// How the caller sizes a liquidity change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityParam {
    /// An explicit liquidity delta
    Liquidity(u128),
    /// The amount of token A to spend (increase) or receive (decrease)
    TokenA(u64),
    /// The amount of token B to spend (increase) or receive (decrease)
    TokenB(u64),
}

#[allow(clippy::too_many_arguments)]
pub fn increase_quote(
    param: LiquidityParam,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> SdkResult<IncreaseLiquidityQuote> {
    let quote = match param {
        LiquidityParam::Liquidity(delta) => increase_liquidity_quote_by_liquidity(
            delta,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
        LiquidityParam::TokenA(amount) => increase_liquidity_quote_by_token_a(
            amount,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
        LiquidityParam::TokenB(amount) => increase_liquidity_quote_by_token_b(
            amount,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
    };
    Ok(quote)
}

#[allow(clippy::too_many_arguments)]
pub fn decrease_quote(
    param: LiquidityParam,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> SdkResult<DecreaseLiquidityQuote> {
    let quote = match param {
        LiquidityParam::Liquidity(delta) => decrease_liquidity_quote_by_liquidity(
            delta,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
        LiquidityParam::TokenA(amount) => decrease_liquidity_quote_by_token_a(
            amount,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
        LiquidityParam::TokenB(amount) => decrease_liquidity_quote_by_token_b(
            amount,
            slippage_tolerance_bps,
            current_sqrt_price,
            tick_lower_index,
            tick_upper_index,
            transfer_fee_a,
            transfer_fee_b,
        )?,
    };
    Ok(quote)
}
