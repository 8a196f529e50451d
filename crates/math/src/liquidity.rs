/// Liquidity-delta quotes for opening, increasing, and decreasing positions
///
/// All token amounts are Q64.64-derived integer amounts. Deposit-side
/// amounts round up and get widened by slippage (maximum-in bounds);
/// withdrawal-side amounts round down and get narrowed (minimum-out
/// bounds).

use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::slippage::{adjust_amount_down, adjust_amount_up};
use crate::sqrt_price::tick_index_to_sqrt_price;
use crate::transfer_fee::{apply_transfer_fee, reverse_transfer_fee};
use crate::types::TransferFee;

// ============================================================================
// Token-amount deltas
// ============================================================================

fn sorted(a: u128, b: u128) -> (u128, u128) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Amount of token A held between two sqrt prices at the given liquidity
pub fn amount_delta_a(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u64> {
    let (lower, upper) = sorted(sqrt_price_0, sqrt_price_1);
    if lower == 0 {
        return Err(CoreError::DivisionByZero);
    }
    let numerator = (U256::from(liquidity) * U256::from(upper - lower)) << 64usize;
    let denominator = U256::from(lower) * U256::from(upper);
    let (quotient, remainder) = numerator.div_rem(denominator);
    let quotient = if round_up && remainder != U256::ZERO {
        quotient + U256::from(1u8)
    } else {
        quotient
    };
    u64::try_from(quotient).map_err(|_| CoreError::AmountExceedsMax)
}

/// Amount of token B held between two sqrt prices at the given liquidity
pub fn amount_delta_b(
    sqrt_price_0: u128,
    sqrt_price_1: u128,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<u64> {
    let (lower, upper) = sorted(sqrt_price_0, sqrt_price_1);
    let product = U256::from(liquidity) * U256::from(upper - lower);
    let quotient = product >> 64;
    let has_remainder = product & U256::from(u64::MAX) != U256::ZERO;
    let quotient = if round_up && has_remainder {
        quotient + U256::from(1u8)
    } else {
        quotient
    };
    u64::try_from(quotient).map_err(|_| CoreError::AmountExceedsMax)
}

/// Liquidity purchasable with `amount` of token A between two sqrt prices
pub fn liquidity_from_token_a(
    amount: u64,
    sqrt_price_0: u128,
    sqrt_price_1: u128,
) -> CoreResult<u128> {
    let (lower, upper) = sorted(sqrt_price_0, sqrt_price_1);
    if upper == lower {
        return Err(CoreError::DivisionByZero);
    }
    let numerator = (U256::from(amount) * U256::from(lower) * U256::from(upper)) >> 64;
    let denominator = U256::from(upper - lower);
    u128::try_from(numerator / denominator).map_err(|_| CoreError::MathOverflow)
}

/// Liquidity purchasable with `amount` of token B between two sqrt prices
pub fn liquidity_from_token_b(
    amount: u64,
    sqrt_price_0: u128,
    sqrt_price_1: u128,
) -> CoreResult<u128> {
    let (lower, upper) = sorted(sqrt_price_0, sqrt_price_1);
    if upper == lower {
        return Err(CoreError::DivisionByZero);
    }
    let numerator = U256::from(amount) << 64usize;
    u128::try_from(numerator / U256::from(upper - lower)).map_err(|_| CoreError::MathOverflow)
}

/// Raw token amounts a liquidity delta represents for a position range at
/// the current pool price
pub fn position_token_amounts(
    current_sqrt_price: u128,
    sqrt_price_lower: u128,
    sqrt_price_upper: u128,
    liquidity_delta: u128,
    round_up: bool,
) -> CoreResult<(u64, u64)> {
    if sqrt_price_lower >= sqrt_price_upper {
        return Err(CoreError::InvalidTickRange);
    }
    if current_sqrt_price <= sqrt_price_lower {
        // Price below range: all token A
        let a = amount_delta_a(sqrt_price_lower, sqrt_price_upper, liquidity_delta, round_up)?;
        Ok((a, 0))
    } else if current_sqrt_price >= sqrt_price_upper {
        // Price above range: all token B
        let b = amount_delta_b(sqrt_price_lower, sqrt_price_upper, liquidity_delta, round_up)?;
        Ok((0, b))
    } else {
        let a = amount_delta_a(current_sqrt_price, sqrt_price_upper, liquidity_delta, round_up)?;
        let b = amount_delta_b(sqrt_price_lower, current_sqrt_price, liquidity_delta, round_up)?;
        Ok((a, b))
    }
}

// ============================================================================
// Increase-liquidity quotes
// ============================================================================

/// Quote for adding liquidity to a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseLiquidityQuote {
    pub liquidity_delta: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_max_a: u64,
    pub token_max_b: u64,
}

#[allow(clippy::too_many_arguments)]
fn increase_quote_from_liquidity(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    sqrt_lower: u128,
    sqrt_upper: u128,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<IncreaseLiquidityQuote> {
    let (raw_a, raw_b) = position_token_amounts(
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        liquidity_delta,
        true,
    )?;
    // The user pays the transfer fee on top of what the pool must receive
    let token_est_a = reverse_transfer_fee(raw_a, transfer_fee_a)?;
    let token_est_b = reverse_transfer_fee(raw_b, transfer_fee_b)?;
    Ok(IncreaseLiquidityQuote {
        liquidity_delta,
        token_est_a,
        token_est_b,
        token_max_a: adjust_amount_up(token_est_a, slippage_tolerance_bps)?,
        token_max_b: adjust_amount_up(token_est_b, slippage_tolerance_bps)?,
    })
}

/// Quote an increase by an explicit liquidity delta
pub fn increase_liquidity_quote_by_liquidity(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<IncreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    increase_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote an increase by the amount of token A the caller will spend
pub fn increase_liquidity_quote_by_token_a(
    token_amount_a: u64,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<IncreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    // Token A only backs the part of the range above the current price
    if current_sqrt_price >= sqrt_upper {
        return Ok(IncreaseLiquidityQuote::default());
    }
    let net_a = apply_transfer_fee(token_amount_a, transfer_fee_a);
    let segment_lower = current_sqrt_price.max(sqrt_lower);
    let liquidity_delta = liquidity_from_token_a(net_a, segment_lower, sqrt_upper)?;
    increase_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote an increase by the amount of token B the caller will spend
pub fn increase_liquidity_quote_by_token_b(
    token_amount_b: u64,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<IncreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    // Token B only backs the part of the range below the current price
    if current_sqrt_price <= sqrt_lower {
        return Ok(IncreaseLiquidityQuote::default());
    }
    let net_b = apply_transfer_fee(token_amount_b, transfer_fee_b);
    let segment_upper = current_sqrt_price.min(sqrt_upper);
    let liquidity_delta = liquidity_from_token_b(net_b, sqrt_lower, segment_upper)?;
    increase_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}

// ============================================================================
// Decrease-liquidity quotes
// ============================================================================

/// Quote for removing liquidity from a position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseLiquidityQuote {
    pub liquidity_delta: u128,
    pub token_est_a: u64,
    pub token_est_b: u64,
    pub token_min_a: u64,
    pub token_min_b: u64,
}

#[allow(clippy::too_many_arguments)]
fn decrease_quote_from_liquidity(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    sqrt_lower: u128,
    sqrt_upper: u128,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<DecreaseLiquidityQuote> {
    let (raw_a, raw_b) = position_token_amounts(
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        liquidity_delta,
        false,
    )?;
    // The transfer fee comes out of what reaches the owner
    let token_est_a = apply_transfer_fee(raw_a, transfer_fee_a);
    let token_est_b = apply_transfer_fee(raw_b, transfer_fee_b);
    Ok(DecreaseLiquidityQuote {
        liquidity_delta,
        token_est_a,
        token_est_b,
        token_min_a: adjust_amount_down(token_est_a, slippage_tolerance_bps)?,
        token_min_b: adjust_amount_down(token_est_b, slippage_tolerance_bps)?,
    })
}

/// Quote a decrease by an explicit liquidity delta
pub fn decrease_liquidity_quote_by_liquidity(
    liquidity_delta: u128,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<DecreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    decrease_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote a decrease by the amount of token A the caller wants back
pub fn decrease_liquidity_quote_by_token_a(
    token_amount_a: u64,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<DecreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    if current_sqrt_price >= sqrt_upper {
        return Ok(DecreaseLiquidityQuote::default());
    }
    let gross_a = reverse_transfer_fee(token_amount_a, transfer_fee_a)?;
    let segment_lower = current_sqrt_price.max(sqrt_lower);
    let liquidity_delta = liquidity_from_token_a(gross_a, segment_lower, sqrt_upper)?;
    decrease_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}

/// Quote a decrease by the amount of token B the caller wants back
pub fn decrease_liquidity_quote_by_token_b(
    token_amount_b: u64,
    slippage_tolerance_bps: u16,
    current_sqrt_price: u128,
    tick_lower_index: i32,
    tick_upper_index: i32,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<DecreaseLiquidityQuote> {
    let sqrt_lower = tick_index_to_sqrt_price(tick_lower_index)?;
    let sqrt_upper = tick_index_to_sqrt_price(tick_upper_index)?;
    if current_sqrt_price <= sqrt_lower {
        return Ok(DecreaseLiquidityQuote::default());
    }
    let gross_b = reverse_transfer_fee(token_amount_b, transfer_fee_b)?;
    let segment_upper = current_sqrt_price.min(sqrt_upper);
    let liquidity_delta = liquidity_from_token_b(gross_b, sqrt_lower, segment_upper)?;
    decrease_quote_from_liquidity(
        liquidity_delta,
        slippage_tolerance_bps,
        current_sqrt_price,
        sqrt_lower,
        sqrt_upper,
        transfer_fee_a,
        transfer_fee_b,
    )
}
