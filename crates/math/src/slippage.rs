/// Slippage-tolerance bounds for amounts and sqrt prices
///
/// All bounds that gate fund-moving instructions are computed with integer
/// arithmetic only. Price bounds scale the sqrt price by the integer square
/// root of the scaled tolerance factor (Newton iteration via the
/// `integer-sqrt` crate), never by floating-point multiplication.

use integer_sqrt::IntegerSquareRoot;
use ruint::aliases::U256;

use crate::constants::{BPS_DENOMINATOR, MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::error::{CoreError, CoreResult};

fn check_bps(slippage_tolerance_bps: u16) -> CoreResult<()> {
    if u64::from(slippage_tolerance_bps) > BPS_DENOMINATOR {
        return Err(CoreError::InvalidSlippageTolerance);
    }
    Ok(())
}

/// Widen an amount upward by the tolerance: the maximum a caller is willing
/// to pay. Saturates at u64::MAX; a saturated maximum never over-gates.
pub fn adjust_amount_up(amount: u64, slippage_tolerance_bps: u16) -> CoreResult<u64> {
    check_bps(slippage_tolerance_bps)?;
    let scaled = u128::from(amount) * (BPS_DENOMINATOR + u64::from(slippage_tolerance_bps)) as u128;
    let widened = (scaled + BPS_DENOMINATOR as u128 - 1) / BPS_DENOMINATOR as u128;
    Ok(u64::try_from(widened).unwrap_or(u64::MAX))
}

/// Narrow an amount downward by the tolerance: the minimum a caller will
/// accept
pub fn adjust_amount_down(amount: u64, slippage_tolerance_bps: u16) -> CoreResult<u64> {
    check_bps(slippage_tolerance_bps)?;
    let scaled = u128::from(amount) * (BPS_DENOMINATOR - u64::from(slippage_tolerance_bps)) as u128;
    Ok((scaled / BPS_DENOMINATOR as u128) as u64)
}

/// Scale a Q64.64 sqrt price by sqrt(1 + tolerance) or sqrt(1 - tolerance).
///
/// The factor (10000 +/- bps)/10000 is lifted to x64 scale, square-rooted
/// with integer Newton iteration to x32, and multiplied back in. The result
/// is clamped to the representable sqrt-price range.
pub fn adjust_sqrt_price(
    sqrt_price: u128,
    slippage_tolerance_bps: u16,
    round_up: bool,
) -> CoreResult<u128> {
    check_bps(slippage_tolerance_bps)?;
    let factor = if round_up {
        BPS_DENOMINATOR + u64::from(slippage_tolerance_bps)
    } else {
        BPS_DENOMINATOR - u64::from(slippage_tolerance_bps)
    };
    let factor_x64 = (u128::from(factor) << 64) / u128::from(BPS_DENOMINATOR);
    let sqrt_factor_x32 = factor_x64.integer_sqrt();
    let scaled = (U256::from(sqrt_price) * U256::from(sqrt_factor_x32)) >> 32;
    let adjusted = u128::try_from(scaled).unwrap_or(MAX_SQRT_PRICE);
    Ok(adjusted.clamp(MIN_SQRT_PRICE, MAX_SQRT_PRICE))
}
