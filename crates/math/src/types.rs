/// Facade structs decoupling the math from on-chain account layouts
///
/// The SDK converts decoded accounts into these before calling any quote
/// function; a tick array that does not exist on chain is represented by
/// `TickArrayFacade::uninitialized`, never by an error.

use serde::{Deserialize, Serialize};

use crate::constants::{NUM_REWARDS, TICK_ARRAY_SIZE};

/// Pool state relevant to quoting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFacade {
    pub tick_spacing: u16,
    /// Fee rate in hundredths of a basis point
    pub fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
    pub reward_infos: [PoolRewardFacade; NUM_REWARDS],
}

/// One pool reward slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRewardFacade {
    pub growth_global_x64: u128,
    pub emissions_per_second_x64: u128,
}

/// Position state relevant to quoting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionFacade {
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardFacade; NUM_REWARDS],
}

/// One position reward slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRewardFacade {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

/// A single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickFacade {
    pub initialized: bool,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub reward_growths_outside: [u128; NUM_REWARDS],
}

/// A fixed-capacity block of ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickArrayFacade {
    pub start_tick_index: i32,
    pub ticks: [TickFacade; TICK_ARRAY_SIZE],
}

impl TickArrayFacade {
    /// A fully uninitialized array: zero liquidity-net and zero growth in
    /// every slot. Stands in for arrays absent from chain state.
    pub fn uninitialized(start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: [TickFacade::default(); TICK_ARRAY_SIZE],
        }
    }
}

/// Epoch-resolved transfer fee for a fee-on-transfer mint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFee {
    pub basis_points: u16,
    pub maximum_fee: u64,
}

impl TransferFee {
    pub fn new(basis_points: u16) -> Self {
        Self {
            basis_points,
            maximum_fee: u64::MAX,
        }
    }
}
