/// Owed-fee and owed-reward quotes for a position
///
/// Growth accumulators are wrapping u128 Q64.64 values, so all deltas use
/// wrapping subtraction, matching the on-chain accounting.

use ruint::aliases::U256;
use serde::{Deserialize, Serialize};

use crate::constants::NUM_REWARDS;
use crate::error::CoreResult;
use crate::transfer_fee::apply_transfer_fee;
use crate::types::{PoolFacade, PositionFacade, TickFacade, TransferFee};

/// Fees owed to a position, after transfer fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectFeesQuote {
    pub fee_owed_a: u64,
    pub fee_owed_b: u64,
}

/// Rewards owed to a position, after transfer fees
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectRewardsQuote {
    pub rewards: [CollectRewardQuote; NUM_REWARDS],
}

/// One reward slot of a rewards quote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectRewardQuote {
    pub rewards_owed: u64,
}

/// Growth accumulated inside the position range, given the growth recorded
/// outside each bounding tick
fn growth_inside(
    growth_global: u128,
    outside_lower: u128,
    outside_upper: u128,
    tick_current_index: i32,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> u128 {
    let below = if tick_current_index >= tick_lower_index {
        outside_lower
    } else {
        growth_global.wrapping_sub(outside_lower)
    };
    let above = if tick_current_index < tick_upper_index {
        outside_upper
    } else {
        growth_global.wrapping_sub(outside_upper)
    };
    growth_global.wrapping_sub(below).wrapping_sub(above)
}

/// Tokens owed for a growth delta at the position's liquidity
fn owed_from_growth(growth_delta: u128, liquidity: u128) -> u64 {
    let scaled = (U256::from(growth_delta) * U256::from(liquidity)) >> 64;
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Fees owed to a position right now
pub fn collect_fees_quote(
    pool: &PoolFacade,
    position: &PositionFacade,
    lower_tick: &TickFacade,
    upper_tick: &TickFacade,
    transfer_fee_a: Option<TransferFee>,
    transfer_fee_b: Option<TransferFee>,
) -> CoreResult<CollectFeesQuote> {
    let inside_a = growth_inside(
        pool.fee_growth_global_a,
        lower_tick.fee_growth_outside_a,
        upper_tick.fee_growth_outside_a,
        pool.tick_current_index,
        position.tick_lower_index,
        position.tick_upper_index,
    );
    let inside_b = growth_inside(
        pool.fee_growth_global_b,
        lower_tick.fee_growth_outside_b,
        upper_tick.fee_growth_outside_b,
        pool.tick_current_index,
        position.tick_lower_index,
        position.tick_upper_index,
    );
    let delta_a = inside_a.wrapping_sub(position.fee_growth_checkpoint_a);
    let delta_b = inside_b.wrapping_sub(position.fee_growth_checkpoint_b);
    let raw_a = position
        .fee_owed_a
        .saturating_add(owed_from_growth(delta_a, position.liquidity));
    let raw_b = position
        .fee_owed_b
        .saturating_add(owed_from_growth(delta_b, position.liquidity));
    Ok(CollectFeesQuote {
        fee_owed_a: apply_transfer_fee(raw_a, transfer_fee_a),
        fee_owed_b: apply_transfer_fee(raw_b, transfer_fee_b),
    })
}

/// Rewards owed to a position right now, per reward slot
pub fn collect_rewards_quote(
    pool: &PoolFacade,
    position: &PositionFacade,
    lower_tick: &TickFacade,
    upper_tick: &TickFacade,
    reward_transfer_fees: [Option<TransferFee>; NUM_REWARDS],
) -> CoreResult<CollectRewardsQuote> {
    let mut rewards = [CollectRewardQuote::default(); NUM_REWARDS];
    for (index, quote) in rewards.iter_mut().enumerate() {
        let inside = growth_inside(
            pool.reward_infos[index].growth_global_x64,
            lower_tick.reward_growths_outside[index],
            upper_tick.reward_growths_outside[index],
            pool.tick_current_index,
            position.tick_lower_index,
            position.tick_upper_index,
        );
        let delta = inside.wrapping_sub(position.reward_infos[index].growth_inside_checkpoint);
        let raw = position.reward_infos[index]
            .amount_owed
            .saturating_add(owed_from_growth(delta, position.liquidity));
        quote.rewards_owed = apply_transfer_fee(raw, reward_transfer_fees[index]);
    }
    Ok(CollectRewardsQuote { rewards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoolRewardFacade, PositionRewardFacade};

    fn pool_with_growth(growth_a: u128, growth_b: u128) -> PoolFacade {
        PoolFacade {
            tick_spacing: 64,
            fee_rate: 3000,
            liquidity: 0,
            sqrt_price: 1 << 64,
            tick_current_index: 0,
            fee_growth_global_a: growth_a,
            fee_growth_global_b: growth_b,
            reward_infos: [PoolRewardFacade::default(); NUM_REWARDS],
        }
    }

    fn position_with_liquidity(liquidity: u128) -> PositionFacade {
        PositionFacade {
            liquidity,
            tick_lower_index: -128,
            tick_upper_index: 128,
            fee_growth_checkpoint_a: 0,
            fee_owed_a: 0,
            fee_growth_checkpoint_b: 0,
            fee_owed_b: 0,
            reward_infos: [PositionRewardFacade::default(); NUM_REWARDS],
        }
    }

    #[test]
    fn test_fees_accrue_from_inside_growth() {
        // 2 units of fee per unit of liquidity, Q64.64
        let pool = pool_with_growth(2 << 64, 1 << 64);
        let position = position_with_liquidity(500);
        let quote = collect_fees_quote(
            &pool,
            &position,
            &TickFacade::default(),
            &TickFacade::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(quote.fee_owed_a, 1000);
        assert_eq!(quote.fee_owed_b, 500);
    }

    #[test]
    fn test_zero_liquidity_only_returns_stored_owed() {
        let pool = pool_with_growth(5 << 64, 0);
        let mut position = position_with_liquidity(0);
        position.fee_owed_a = 77;
        let quote = collect_fees_quote(
            &pool,
            &position,
            &TickFacade::default(),
            &TickFacade::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(quote.fee_owed_a, 77);
        assert_eq!(quote.fee_owed_b, 0);
    }

    #[test]
    fn test_growth_outside_range_does_not_accrue() {
        // Current tick below the range: growth below the lower tick is
        // global minus the tick's outside value, so a zero outside value
        // puts all accumulated growth below the range
        let mut pool = pool_with_growth(9 << 64, 0);
        pool.tick_current_index = -500;
        let position = position_with_liquidity(1_000);
        let quote = collect_fees_quote(
            &pool,
            &position,
            &TickFacade::default(),
            &TickFacade::default(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(quote.fee_owed_a, 0);
    }

    #[test]
    fn test_rewards_per_slot_with_transfer_fee() {
        let mut pool = pool_with_growth(0, 0);
        pool.reward_infos[1].growth_global_x64 = 4 << 64;
        let position = position_with_liquidity(250);
        let fees = [None, Some(TransferFee::new(100)), None];
        let quote = collect_rewards_quote(
            &pool,
            &position,
            &TickFacade::default(),
            &TickFacade::default(),
            fees,
        )
        .unwrap();
        assert_eq!(quote.rewards[0].rewards_owed, 0);
        // 250 * 4 = 1000, minus the 1% transfer fee
        assert_eq!(quote.rewards[1].rewards_owed, 990);
        assert_eq!(quote.rewards[2].rewards_owed, 0);
    }
}
