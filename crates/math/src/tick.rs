/// Tick index arithmetic: alignment, rounding, and tick-array geometry

use crate::constants::{MAX_TICK_INDEX, MIN_TICK_INDEX, TICK_ARRAY_SIZE};
use crate::error::{CoreError, CoreResult};

/// Whether a tick index lies inside the protocol bounds
pub fn is_tick_index_in_bounds(tick_index: i32) -> bool {
    (MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick_index)
}

/// Whether a tick index can be initialized for the given spacing
pub fn is_tick_initializable(tick_index: i32, tick_spacing: u16) -> bool {
    tick_index % tick_spacing as i32 == 0
}

/// Round a raw tick index to the nearest initializable tick.
///
/// Lower bounds round toward negative infinity, upper bounds toward
/// positive infinity, so a raw range never shrinks past the caller's
/// intent. Applying the rounding twice is a no-op.
pub fn get_initializable_tick_index(tick_index: i32, tick_spacing: u16, round_up: bool) -> i32 {
    let spacing = tick_spacing as i32;
    let floored = tick_index.div_euclid(spacing) * spacing;
    if round_up && floored < tick_index {
        floored + spacing
    } else {
        floored
    }
}

/// Start index of the tick array containing `tick_index`
pub fn get_tick_array_start_tick_index(tick_index: i32, tick_spacing: u16) -> i32 {
    let ticks_per_array = tick_spacing as i32 * TICK_ARRAY_SIZE as i32;
    tick_index.div_euclid(ticks_per_array) * ticks_per_array
}

/// The widest initializable tick range for a given spacing
pub fn full_range_tick_indexes(tick_spacing: u16) -> (i32, i32) {
    let spacing = tick_spacing as i32;
    let lower = (MIN_TICK_INDEX / spacing) * spacing;
    let upper = (MAX_TICK_INDEX / spacing) * spacing;
    (lower, upper)
}

/// Validate a position tick range: in bounds, aligned, lower < upper
pub fn check_tick_range(lower: i32, upper: i32, tick_spacing: u16) -> CoreResult<()> {
    if !is_tick_index_in_bounds(lower) || !is_tick_index_in_bounds(upper) {
        return Err(CoreError::TickIndexOutOfBounds);
    }
    if !is_tick_initializable(lower, tick_spacing) || !is_tick_initializable(upper, tick_spacing) {
        return Err(CoreError::TickIndexNotAligned);
    }
    if lower >= upper {
        return Err(CoreError::InvalidTickRange);
    }
    Ok(())
}

/// Offset of a tick inside its array, if the tick belongs to the array
/// starting at `start_tick_index`
pub fn tick_offset_in_array(
    tick_index: i32,
    start_tick_index: i32,
    tick_spacing: u16,
) -> CoreResult<usize> {
    let delta = tick_index - start_tick_index;
    let spacing = tick_spacing as i32;
    if delta < 0 || delta % spacing != 0 {
        return Err(CoreError::TickIndexNotAligned);
    }
    let offset = (delta / spacing) as usize;
    if offset >= TICK_ARRAY_SIZE {
        return Err(CoreError::TickIndexOutOfBounds);
    }
    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initializable_tick_rounding() {
        // Lower bounds round down, upper bounds round up
        assert_eq!(get_initializable_tick_index(95, 64, false), 64);
        assert_eq!(get_initializable_tick_index(95, 64, true), 128);
        assert_eq!(get_initializable_tick_index(-95, 64, false), -128);
        assert_eq!(get_initializable_tick_index(-95, 64, true), -64);
        // Aligned ticks are untouched in either direction
        assert_eq!(get_initializable_tick_index(128, 64, true), 128);
        assert_eq!(get_initializable_tick_index(-128, 64, false), -128);
    }

    #[test]
    fn test_initializable_tick_rounding_is_idempotent() {
        for raw in [-443_636, -1_000_001, -95, -1, 0, 1, 95, 1_000_001, 443_636] {
            for round_up in [false, true] {
                let once = get_initializable_tick_index(raw, 64, round_up);
                let twice = get_initializable_tick_index(once, 64, round_up);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_tick_array_start_contains_tick() {
        for spacing in [1u16, 8, 64, 128] {
            for raw in [-443_000, -12_345, -1, 0, 1, 12_345, 443_000] {
                let start = get_tick_array_start_tick_index(raw, spacing);
                let span = spacing as i32 * TICK_ARRAY_SIZE as i32;
                assert!(start <= raw && raw < start + span);
                assert_eq!(start % span, 0);
                // Start computation is stable under re-application
                assert_eq!(get_tick_array_start_tick_index(start, spacing), start);
            }
        }
    }

    #[test]
    fn test_full_range_is_in_bounds_and_aligned() {
        for spacing in [1u16, 64, 128, 32_896] {
            let (lower, upper) = full_range_tick_indexes(spacing);
            assert!(is_tick_index_in_bounds(lower));
            assert!(is_tick_index_in_bounds(upper));
            check_tick_range(lower, upper, spacing).unwrap();
        }
    }

    #[test]
    fn test_check_tick_range_rejections() {
        assert_eq!(
            check_tick_range(-443_700, 0, 64).unwrap_err(),
            CoreError::TickIndexOutOfBounds
        );
        assert_eq!(
            check_tick_range(-65, 64, 64).unwrap_err(),
            CoreError::TickIndexNotAligned
        );
        assert_eq!(
            check_tick_range(128, 128, 64).unwrap_err(),
            CoreError::InvalidTickRange
        );
    }

    #[test]
    fn test_tick_offset_in_array() {
        assert_eq!(tick_offset_in_array(0, 0, 64).unwrap(), 0);
        assert_eq!(tick_offset_in_array(64 * 87, 0, 64).unwrap(), 87);
        assert!(tick_offset_in_array(64 * 88, 0, 64).is_err());
        assert!(tick_offset_in_array(-64, 0, 64).is_err());
        assert!(tick_offset_in_array(33, 0, 64).is_err());
    }
}
