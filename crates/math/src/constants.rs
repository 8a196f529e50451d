/// Protocol-wide numeric constants

/// Smallest tick index a pool can reach
pub const MIN_TICK_INDEX: i32 = -443_636;

/// Largest tick index a pool can reach
pub const MAX_TICK_INDEX: i32 = 443_636;

/// Number of ticks stored in one tick array account
pub const TICK_ARRAY_SIZE: usize = 88;

/// Sqrt price at MIN_TICK_INDEX, Q64.64
pub const MIN_SQRT_PRICE: u128 = 4_295_048_017;

/// Sqrt price at MAX_TICK_INDEX, Q64.64
pub const MAX_SQRT_PRICE: u128 = 79_226_673_515_401_279_992_447_579_062;

/// Pools with a tick spacing at or above this value only accept
/// full-range positions
pub const FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD: u16 = 32_768;

/// Number of reward slots per pool
pub const NUM_REWARDS: usize = 3;

/// Denominator for pool fee rates (hundredths of a basis point)
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

/// Denominator for basis-point quantities (slippage, transfer fees)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Number of tick arrays a swap quote operates over: the array holding the
/// current tick plus two neighbors on each side
pub const SWAP_TICK_ARRAY_COUNT: usize = 5;
