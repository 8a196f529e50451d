/// Conversions between tick indexes, Q64.64 sqrt prices, and UI prices

use ruint::aliases::U256;

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK_INDEX, MIN_SQRT_PRICE, MIN_TICK_INDEX};
use crate::error::{CoreError, CoreResult};
use crate::tick::is_tick_index_in_bounds;

/// Per-bit multipliers for sqrt(1.0001)^(-2^k), Q128.128
const TICK_BIT_FACTORS: [u128; 19] = [
    0xfffcb933bd6fad37aa2d162d1a594001,
    0xfff97272373d413259a46990580e2139,
    0xfff2e50f5f656932ef12357cf3c7fdcb,
    0xffe5caca7e10e4e61c3624eaa0941ccf,
    0xffcb9843d60f6159c9db58835c926643,
    0xff973b41fa98c081472e6896dfb254bf,
    0xff2ea16466c96a3843ec78b326b52860,
    0xfe5dee046a99a2a811c461f1969c3052,
    0xfcbe86c7900a88aedcffc83b479aa3a3,
    0xf987a7253ac413176f2b074cf7815e53,
    0xf3392b0822b70005940c7a398e4b70f2,
    0xe7159475a2c29b7443b29c7fa6e889d8,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e4,
    0x70d869a156d2a1b890bb3df62baf32f6,
    0x31be135f97d08fd981231505542fcfa5,
    0x09aa508b5b7a84e1c677de54f3e99bc8,
    0x005d6af8dedb81196699c329225ee604,
    0x00002216e584f5fa1ea926041bedfe97,
];

/// Sqrt price at an exact tick index, Q64.64
pub fn tick_index_to_sqrt_price(tick_index: i32) -> CoreResult<u128> {
    if !is_tick_index_in_bounds(tick_index) {
        return Err(CoreError::TickIndexOutOfBounds);
    }
    let magnitude = tick_index.unsigned_abs();
    // Accumulate in Q128.128 and shift down at the end, rounding up
    let mut ratio: U256 = U256::from(1u8) << 128;
    for (bit, factor) in TICK_BIT_FACTORS.iter().enumerate() {
        if magnitude & (1 << bit) != 0 {
            ratio = (ratio * U256::from(*factor)) >> 128;
        }
    }
    if tick_index > 0 {
        ratio = U256::MAX / ratio;
    }
    let round_up = ratio & (U256::from(u64::MAX)) != U256::ZERO;
    let shifted = ratio >> 64;
    let sqrt_price =
        u128::try_from(shifted).map_err(|_| CoreError::SqrtPriceOutOfBounds)?;
    Ok(sqrt_price + u128::from(round_up))
}

/// Largest tick index whose sqrt price does not exceed `sqrt_price`
pub fn sqrt_price_to_tick_index(sqrt_price: u128) -> CoreResult<i32> {
    if !(MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price) {
        return Err(CoreError::SqrtPriceOutOfBounds);
    }
    let mut lo = MIN_TICK_INDEX;
    let mut hi = MAX_TICK_INDEX;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if tick_index_to_sqrt_price(mid)? <= sqrt_price {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Convert a UI price (token B per token A) into a Q64.64 sqrt price,
/// adjusting for the two mint decimal scales. Floating point is acceptable
/// here: the result seeds a brand-new pool and gates no existing funds.
pub fn price_to_sqrt_price(price: f64, decimals_a: u8, decimals_b: u8) -> CoreResult<u128> {
    if !price.is_finite() || price <= 0.0 {
        return Err(CoreError::SqrtPriceOutOfBounds);
    }
    let scale = 10f64.powi(decimals_b as i32 - decimals_a as i32);
    let sqrt_price = (price * scale).sqrt() * (u64::MAX as f64 + 1.0);
    if !sqrt_price.is_finite() || sqrt_price < MIN_SQRT_PRICE as f64 {
        return Err(CoreError::SqrtPriceOutOfBounds);
    }
    if sqrt_price > MAX_SQRT_PRICE as f64 {
        return Err(CoreError::SqrtPriceOutOfBounds);
    }
    Ok(sqrt_price as u128)
}

/// Convert a Q64.64 sqrt price back into a UI price (token B per token A)
pub fn sqrt_price_to_price(sqrt_price: u128, decimals_a: u8, decimals_b: u8) -> f64 {
    let ratio = sqrt_price as f64 / (u64::MAX as f64 + 1.0);
    let scale = 10f64.powi(decimals_a as i32 - decimals_b as i32);
    ratio * ratio * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_sqrt_prices() {
        // Values precomputed with the same Q128.128 bit decomposition
        assert_eq!(tick_index_to_sqrt_price(0).unwrap(), 1 << 64);
        assert_eq!(tick_index_to_sqrt_price(1).unwrap(), 18447666387855959851);
        assert_eq!(tick_index_to_sqrt_price(-1).unwrap(), 18445821805675392312);
        assert_eq!(tick_index_to_sqrt_price(64).unwrap(), 18505865242158250042);
        assert_eq!(tick_index_to_sqrt_price(128).unwrap(), 18565175891880433523);
        assert_eq!(tick_index_to_sqrt_price(-128).unwrap(), 18329067761203520169);
        assert_eq!(tick_index_to_sqrt_price(MIN_TICK_INDEX).unwrap(), MIN_SQRT_PRICE);
        assert_eq!(tick_index_to_sqrt_price(MAX_TICK_INDEX).unwrap(), MAX_SQRT_PRICE);
    }

    #[test]
    fn test_sqrt_price_is_monotonic() {
        let mut prev = 0u128;
        for tick in (MIN_TICK_INDEX..=MAX_TICK_INDEX).step_by(997) {
            let price = tick_index_to_sqrt_price(tick).unwrap();
            assert!(price > prev, "not monotonic at tick {tick}");
            prev = price;
        }
    }

    #[test]
    fn test_tick_round_trip() {
        for tick in [-443_636, -100_000, -64, -1, 0, 1, 64, 100_000, 443_636] {
            let price = tick_index_to_sqrt_price(tick).unwrap();
            assert_eq!(sqrt_price_to_tick_index(price).unwrap(), tick);
        }
        // A price strictly between two ticks maps to the lower one
        let between = tick_index_to_sqrt_price(10).unwrap() + 1;
        assert_eq!(sqrt_price_to_tick_index(between).unwrap(), 10);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        assert!(tick_index_to_sqrt_price(MAX_TICK_INDEX + 1).is_err());
        assert!(sqrt_price_to_tick_index(MIN_SQRT_PRICE - 1).is_err());
        assert!(sqrt_price_to_tick_index(MAX_SQRT_PRICE + 1).is_err());
    }

    #[test]
    fn test_price_conversions() {
        // Equal decimals, price 1.0 sits at tick 0
        let sqrt = price_to_sqrt_price(1.0, 6, 6).unwrap();
        let tick = sqrt_price_to_tick_index(sqrt).unwrap();
        assert!(tick.abs() <= 1);
        let back = sqrt_price_to_price(sqrt, 6, 6);
        assert!((back - 1.0).abs() < 1e-9);

        // Decimal asymmetry shifts the raw price
        let sqrt = price_to_sqrt_price(1.0, 9, 6).unwrap();
        let back = sqrt_price_to_price(sqrt, 9, 6);
        assert!((back - 1.0).abs() < 1e-9);

        assert!(price_to_sqrt_price(0.0, 6, 6).is_err());
        assert!(price_to_sqrt_price(f64::NAN, 6, 6).is_err());
    }
}
