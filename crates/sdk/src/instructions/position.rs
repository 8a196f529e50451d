/// Opening and closing positions

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tidepool_client::accounts::{Pool, Position, TickArray};
use tidepool_client::instructions::{
    close_position, collect_fees, collect_reward, decrease_liquidity, increase_liquidity,
    initialize_tick_array, open_position, update_fees_and_rewards, LiquidityAccounts,
};
use tidepool_client::pdas::position_address;
use tidepool_math::{
    check_tick_range, collect_fees_quote, collect_rewards_quote, full_range_tick_indexes,
    get_initializable_tick_index, price_to_sqrt_price, sqrt_price_to_tick_index,
    tick_offset_in_array, CollectFeesQuote, CollectRewardsQuote, DecreaseLiquidityQuote,
    IncreaseLiquidityQuote, FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD, NUM_REWARDS,
};

use crate::config::SdkConfig;
use crate::errors::{SdkError, SdkResult};
use crate::prober::{
    fetch_existence, fetch_mints, fetch_pool, fetch_position, fetch_tick_arrays_or_default,
    pool_facade, position_facade, MintInfo,
};
use crate::quote::{decrease_quote, increase_quote, LiquidityParam};
use crate::rent::rent_for_sizes;
use crate::rpc::LedgerReader;
use crate::token::{prepare_token_accounts, TokenRequirement};

use super::{fetch_pool_mints, position_accounts, position_tick_arrays};

// ============================================================================
// Open
// ============================================================================

/// Plan for opening a position, optionally seeded with liquidity
pub struct OpenPositionInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    /// Mint of the freshly generated position NFT
    pub position_mint: Pubkey,
    pub quote: IncreaseLiquidityQuote,
    /// Rent for the position account plus any tick arrays the plan creates
    pub initialization_cost: u64,
}

/// Open a position spanning the widest initializable range of the pool
pub async fn open_full_range_position_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    pool_address: Pubkey,
    param: LiquidityParam,
) -> SdkResult<OpenPositionInstructions> {
    let pool = fetch_pool(reader, &pool_address).await?;
    let (mint_a, mint_b, _) = fetch_pool_mints(reader, &pool).await?;
    let (lower, upper) = full_range_tick_indexes(pool.tick_spacing);
    open_with_ticks(reader, config, pool_address, &pool, mint_a, mint_b, lower, upper, param).await
}

/// Open a position over a decimal-adjusted price range. The lower bound
/// rounds down and the upper bound rounds up to initializable ticks, so
/// the resulting range never shrinks past the caller's intent.
pub async fn open_position_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    pool_address: Pubkey,
    lower_price: f64,
    upper_price: f64,
    param: LiquidityParam,
) -> SdkResult<OpenPositionInstructions> {
    let pool = fetch_pool(reader, &pool_address).await?;
    if pool.tick_spacing >= FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD {
        return Err(SdkError::FullRangeOnlyPool);
    }
    let (mint_a, mint_b, _) = fetch_pool_mints(reader, &pool).await?;
    let lower_sqrt = price_to_sqrt_price(lower_price, mint_a.decimals, mint_b.decimals)?;
    let upper_sqrt = price_to_sqrt_price(upper_price, mint_a.decimals, mint_b.decimals)?;
    let lower = get_initializable_tick_index(
        sqrt_price_to_tick_index(lower_sqrt)?,
        pool.tick_spacing,
        false,
    );
    let upper = get_initializable_tick_index(
        sqrt_price_to_tick_index(upper_sqrt)?,
        pool.tick_spacing,
        true,
    );
    open_with_ticks(reader, config, pool_address, &pool, mint_a, mint_b, lower, upper, param).await
}

#[allow(clippy::too_many_arguments)]
async fn open_with_ticks(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    pool_address: Pubkey,
    pool: &Pool,
    mint_a: MintInfo,
    mint_b: MintInfo,
    tick_lower_index: i32,
    tick_upper_index: i32,
    param: LiquidityParam,
) -> SdkResult<OpenPositionInstructions> {
    let funder = config.funder()?;
    check_tick_range(tick_lower_index, tick_upper_index, pool.tick_spacing)?;

    let quote = increase_quote(
        param,
        config.slippage_tolerance_bps,
        pool.sqrt_price,
        tick_lower_index,
        tick_upper_index,
        mint_a.transfer_fee,
        mint_b.transfer_fee,
    )?;

    let prepared = prepare_token_accounts(
        reader,
        config,
        funder,
        &[
            TokenRequirement::with_amount(mint_a.address, mint_a.token_program, quote.token_max_a),
            TokenRequirement::with_amount(mint_b.address, mint_b.token_program, quote.token_max_b),
        ],
    )
    .await?;

    let ((lower_start, lower_array), (upper_start, upper_array)) = position_tick_arrays(
        &pool_address,
        tick_lower_index,
        tick_upper_index,
        pool.tick_spacing,
    );
    let array_exists = fetch_existence(reader, &[lower_array, upper_array]).await?;
    let mut init_instructions = Vec::new();
    let mut created_arrays = 0usize;
    if !array_exists[0] {
        init_instructions.push(initialize_tick_array(
            &pool_address,
            &funder,
            &lower_array,
            lower_start,
        ));
        created_arrays += 1;
    }
    // Both bounds can live in the same array; initialize it once
    if !array_exists[1] && upper_start != lower_start {
        init_instructions.push(initialize_tick_array(
            &pool_address,
            &funder,
            &upper_array,
            upper_start,
        ));
        created_arrays += 1;
    }

    let position_mint = Keypair::new();
    let (position, _) = position_address(&position_mint.pubkey());
    let position_token_account =
        super::position_token_account_address(&funder, &position_mint.pubkey());

    let mut instructions = prepared.setup_instructions;
    instructions.extend(init_instructions);
    instructions.push(open_position(
        &funder,
        &funder,
        &position,
        &position_mint.pubkey(),
        &position_token_account,
        &pool_address,
        tick_lower_index,
        tick_upper_index,
    ));
    if quote.liquidity_delta > 0 {
        instructions.push(increase_liquidity(
            &LiquidityAccounts {
                pool: pool_address,
                position_authority: funder,
                position,
                position_token_account,
                token_mint_a: pool.token_mint_a,
                token_mint_b: pool.token_mint_b,
                token_owner_account_a: prepared.addresses[&pool.token_mint_a],
                token_owner_account_b: prepared.addresses[&pool.token_mint_b],
                token_vault_a: pool.token_vault_a,
                token_vault_b: pool.token_vault_b,
                token_program_a: mint_a.token_program,
                token_program_b: mint_b.token_program,
                tick_array_lower: lower_array,
                tick_array_upper: upper_array,
            },
            quote.liquidity_delta,
            quote.token_max_a,
            quote.token_max_b,
        ));
    }
    instructions.extend(prepared.cleanup_instructions);

    let mut sizes = vec![Position::LEN];
    sizes.extend(std::iter::repeat(TickArray::LEN).take(created_arrays));
    let initialization_cost = rent_for_sizes(reader, &sizes).await?;

    let mut additional_signers = prepared.additional_signers;
    let position_mint_address = position_mint.pubkey();
    additional_signers.push(position_mint);

    Ok(OpenPositionInstructions {
        instructions,
        additional_signers,
        position_mint: position_mint_address,
        quote,
        initialization_cost,
    })
}

// ============================================================================
// Close
// ============================================================================

/// Plan that empties a position and closes it
pub struct ClosePositionInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    pub quote: DecreaseLiquidityQuote,
    pub fees_quote: CollectFeesQuote,
    pub rewards_quote: CollectRewardsQuote,
}

/// Assemble the plan that withdraws all liquidity, collects everything
/// owed, and closes the position identified by its mint
pub async fn close_position_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    position_mint: Pubkey,
) -> SdkResult<ClosePositionInstructions> {
    let authority = config.funder()?;
    let (position_addr, position_token_account) = position_accounts(&authority, &position_mint);
    let position = fetch_position(reader, &position_addr).await?;
    let pool = fetch_pool(reader, &position.pool).await?;
    let (mint_a, mint_b, epoch) = fetch_pool_mints(reader, &pool).await?;

    let ((lower_start, lower_array), (upper_start, upper_array)) = position_tick_arrays(
        &position.pool,
        position.tick_lower_index,
        position.tick_upper_index,
        pool.tick_spacing,
    );
    let arrays = fetch_tick_arrays_or_default(
        reader,
        &[lower_array, upper_array],
        &[lower_start, upper_start],
    )
    .await?;
    let lower_tick = arrays[0].ticks[tick_offset_in_array(
        position.tick_lower_index,
        lower_start,
        pool.tick_spacing,
    )?];
    let upper_tick = arrays[1].ticks[tick_offset_in_array(
        position.tick_upper_index,
        upper_start,
        pool.tick_spacing,
    )?];

    let pool_state = pool_facade(&pool);
    let position_state = position_facade(&position);

    let quote = if position.liquidity > 0 {
        decrease_quote(
            LiquidityParam::Liquidity(position.liquidity),
            config.slippage_tolerance_bps,
            pool.sqrt_price,
            position.tick_lower_index,
            position.tick_upper_index,
            mint_a.transfer_fee,
            mint_b.transfer_fee,
        )?
    } else {
        DecreaseLiquidityQuote::default()
    };
    let fees_quote = collect_fees_quote(
        &pool_state,
        &position_state,
        &lower_tick,
        &upper_tick,
        mint_a.transfer_fee,
        mint_b.transfer_fee,
    )?;

    // Reward transfer fees only matter for initialized slots with owed
    // amounts; resolve those mints in one fetch
    let reward_mints: Vec<Pubkey> = pool
        .reward_infos
        .iter()
        .filter(|info| info.initialized())
        .map(|info| info.mint)
        .collect();
    let reward_mint_infos = fetch_mints(reader, &reward_mints, epoch).await?;
    let mut reward_transfer_fees = [None; NUM_REWARDS];
    for (slot, info) in pool.reward_infos.iter().enumerate() {
        if let Some(mint) = reward_mint_infos.iter().find(|m| m.address == info.mint) {
            reward_transfer_fees[slot] = mint.transfer_fee;
        }
    }
    let rewards_quote = collect_rewards_quote(
        &pool_state,
        &position_state,
        &lower_tick,
        &upper_tick,
        reward_transfer_fees,
    )?;

    let has_fees = fees_quote.fee_owed_a > 0 || fees_quote.fee_owed_b > 0;
    let needs_pair_accounts = position.liquidity > 0 || has_fees;
    let mut requirements = Vec::new();
    if needs_pair_accounts {
        requirements.push(TokenRequirement::present(mint_a.address, mint_a.token_program));
        requirements.push(TokenRequirement::present(mint_b.address, mint_b.token_program));
    }
    for (slot, info) in pool.reward_infos.iter().enumerate() {
        if rewards_quote.rewards[slot].rewards_owed > 0
            && !requirements.iter().any(|r| r.mint == info.mint)
        {
            if let Some(mint) = reward_mint_infos.iter().find(|m| m.address == info.mint) {
                requirements.push(TokenRequirement::present(mint.address, mint.token_program));
            }
        }
    }
    let prepared = prepare_token_accounts(reader, config, authority, &requirements).await?;

    let mut instructions = prepared.setup_instructions;
    if position.liquidity > 0 {
        instructions.push(update_fees_and_rewards(
            &position.pool,
            &position_addr,
            &lower_array,
            &upper_array,
        ));
        instructions.push(decrease_liquidity(
            &LiquidityAccounts {
                pool: position.pool,
                position_authority: authority,
                position: position_addr,
                position_token_account,
                token_mint_a: pool.token_mint_a,
                token_mint_b: pool.token_mint_b,
                token_owner_account_a: prepared.addresses[&pool.token_mint_a],
                token_owner_account_b: prepared.addresses[&pool.token_mint_b],
                token_vault_a: pool.token_vault_a,
                token_vault_b: pool.token_vault_b,
                token_program_a: mint_a.token_program,
                token_program_b: mint_b.token_program,
                tick_array_lower: lower_array,
                tick_array_upper: upper_array,
            },
            quote.liquidity_delta,
            quote.token_min_a,
            quote.token_min_b,
        ));
    }
    if has_fees {
        instructions.push(collect_fees(
            &position.pool,
            &authority,
            &position_addr,
            &position_token_account,
            &pool.token_mint_a,
            &pool.token_mint_b,
            &prepared.addresses[&pool.token_mint_a],
            &prepared.addresses[&pool.token_mint_b],
            &pool.token_vault_a,
            &pool.token_vault_b,
            &mint_a.token_program,
            &mint_b.token_program,
        ));
    }
    for (slot, info) in pool.reward_infos.iter().enumerate() {
        if rewards_quote.rewards[slot].rewards_owed == 0 {
            continue;
        }
        if let Some(mint) = reward_mint_infos.iter().find(|m| m.address == info.mint) {
            instructions.push(collect_reward(
                &position.pool,
                &authority,
                &position_addr,
                &position_token_account,
                &info.mint,
                &prepared.addresses[&info.mint],
                &info.vault,
                &mint.token_program,
                slot as u8,
            ));
        }
    }
    instructions.push(close_position(
        &authority,
        &authority,
        &position_addr,
        &position_mint,
        &position_token_account,
    ));
    instructions.extend(prepared.cleanup_instructions);

    Ok(ClosePositionInstructions {
        instructions,
        additional_signers: prepared.additional_signers,
        quote,
        fees_quote,
        rewards_quote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_pool, MockLedger};
    use tidepool_client::accounts::{PoolRewardInfo, PositionRewardInfo};
    use tidepool_client::pdas::pool_address;

    const OPEN_POSITION_DISC: [u8; 8] = [135, 128, 47, 77, 15, 152, 240, 49];
    const INIT_TICK_ARRAY_DISC: [u8; 8] = [11, 188, 193, 214, 141, 91, 149, 184];
    const INCREASE_DISC: [u8; 8] = [46, 156, 243, 118, 13, 205, 251, 178];
    const DECREASE_DISC: [u8; 8] = [160, 38, 208, 111, 104, 91, 44, 1];
    const UPDATE_DISC: [u8; 8] = [154, 230, 250, 13, 236, 209, 75, 223];
    const COLLECT_FEES_DISC: [u8; 8] = [164, 152, 207, 99, 30, 186, 19, 182];
    const COLLECT_REWARD_DISC: [u8; 8] = [70, 5, 132, 87, 86, 235, 177, 34];
    const CLOSE_DISC: [u8; 8] = [123, 134, 81, 0, 49, 68, 98, 98];

    fn discs(instructions: &[Instruction]) -> Vec<[u8; 8]> {
        instructions
            .iter()
            .filter(|ix| ix.program_id == tidepool_client::TIDEPOOL_ID)
            .map(|ix| {
                let mut disc = [0u8; 8];
                disc.copy_from_slice(&ix.data[..8]);
                disc
            })
            .collect()
    }

    fn seeded_pool(ledger: &mut MockLedger, config: &SdkConfig) -> (Pubkey, Pool) {
        let mut pool = test_pool(0, 1 << 64, 64);
        pool.pools_config = config.pools_config;
        let (mint_a, mint_b) = if pool.token_mint_a < pool.token_mint_b {
            (pool.token_mint_a, pool.token_mint_b)
        } else {
            (pool.token_mint_b, pool.token_mint_a)
        };
        pool.token_mint_a = mint_a;
        pool.token_mint_b = mint_b;
        ledger.add_mint(mint_a, 9);
        ledger.add_mint(mint_b, 6);
        let (address, _) = pool_address(&config.pools_config, &mint_a, &mint_b, 64);
        ledger.add_pool(address, &pool);
        (address, pool)
    }

    #[tokio::test]
    async fn test_open_full_range_orders_segments() {
        let config = SdkConfig::new().with_funder(Pubkey::new_unique());
        let mut ledger = MockLedger::new();
        let (pool_address, _) = seeded_pool(&mut ledger, &config);

        let plan = open_full_range_position_instructions(
            &ledger,
            &config,
            pool_address,
            LiquidityParam::Liquidity(1_000_000_000),
        )
        .await
        .unwrap();

        // Two ATA creations precede the program instructions
        assert_eq!(plan.instructions.len(), 6);
        assert_eq!(
            plan.instructions[0].program_id,
            spl_associated_token_account::ID
        );
        assert_eq!(
            discs(&plan.instructions),
            vec![
                INIT_TICK_ARRAY_DISC,
                INIT_TICK_ARRAY_DISC,
                OPEN_POSITION_DISC,
                INCREASE_DISC,
            ]
        );
        // The position mint co-signs
        assert!(plan
            .additional_signers
            .iter()
            .any(|k| k.pubkey() == plan.position_mint));
        assert!(plan.quote.liquidity_delta > 0);
        // Rent covers the position plus two tick arrays
        assert!(plan.initialization_cost > 0);
    }

    #[tokio::test]
    async fn test_open_skips_existing_tick_arrays() {
        let config = SdkConfig::new().with_funder(Pubkey::new_unique());
        let mut ledger = MockLedger::new();
        let (pool_address, pool) = seeded_pool(&mut ledger, &config);

        let (lower, upper) = full_range_tick_indexes(pool.tick_spacing);
        let ((lower_start, lower_array), (upper_start, upper_array)) =
            position_tick_arrays(&pool_address, lower, upper, pool.tick_spacing);
        let mut array = tidepool_client::accounts::TickArray {
            start_tick_index: lower_start,
            ticks: [Default::default(); 88],
            pool: pool_address,
        };
        ledger.add_tick_array(lower_array, &array);
        array.start_tick_index = upper_start;
        ledger.add_tick_array(upper_array, &array);

        let plan = open_full_range_position_instructions(
            &ledger,
            &config,
            pool_address,
            LiquidityParam::TokenA(1_000_000),
        )
        .await
        .unwrap();
        assert_eq!(
            discs(&plan.instructions),
            vec![OPEN_POSITION_DISC, INCREASE_DISC]
        );
    }

    #[tokio::test]
    async fn test_bounded_open_rejected_on_full_range_only_pool() {
        let config = SdkConfig::new().with_funder(Pubkey::new_unique());
        let mut ledger = MockLedger::new();
        let mut pool = test_pool(0, 1 << 64, FULL_RANGE_ONLY_TICK_SPACING_THRESHOLD);
        pool.pools_config = config.pools_config;
        ledger.add_mint(pool.token_mint_a, 6);
        ledger.add_mint(pool.token_mint_b, 6);
        let address = Pubkey::new_unique();
        ledger.add_pool(address, &pool);

        let result = open_position_instructions(
            &ledger,
            &config,
            address,
            0.5,
            2.0,
            LiquidityParam::Liquidity(1),
        )
        .await;
        assert!(matches!(result, Err(SdkError::FullRangeOnlyPool)));
    }

    #[tokio::test]
    async fn test_close_with_liquidity_and_rewards() {
        let funder = Pubkey::new_unique();
        let config = SdkConfig::new().with_funder(funder);
        let mut ledger = MockLedger::new();
        let (pool_address, mut pool) = seeded_pool(&mut ledger, &config);

        let reward_mint = Pubkey::new_unique();
        ledger.add_mint(reward_mint, 6);
        pool.reward_infos[0] = PoolRewardInfo {
            mint: reward_mint,
            vault: Pubkey::new_unique(),
            emissions_per_second_x64: 0,
            growth_global_x64: 0,
        };
        ledger.add_pool(pool_address, &pool);

        let position_mint = Pubkey::new_unique();
        let (position_addr, _) = position_address(&position_mint);
        let mut reward_infos = [PositionRewardInfo::default(); NUM_REWARDS];
        reward_infos[0].amount_owed = 777;
        ledger.add_position(
            position_addr,
            &Position {
                pool: pool_address,
                position_mint,
                liquidity: 1_000_000,
                tick_lower_index: -128,
                tick_upper_index: 128,
                fee_growth_checkpoint_a: 0,
                fee_owed_a: 42,
                fee_growth_checkpoint_b: 0,
                fee_owed_b: 0,
                reward_infos,
            },
        );

        let plan = close_position_instructions(&ledger, &config, position_mint)
            .await
            .unwrap();
        assert_eq!(
            discs(&plan.instructions),
            vec![
                UPDATE_DISC,
                DECREASE_DISC,
                COLLECT_FEES_DISC,
                COLLECT_REWARD_DISC,
                CLOSE_DISC,
            ]
        );
        assert_eq!(plan.fees_quote.fee_owed_a, 42);
        assert_eq!(plan.rewards_quote.rewards[0].rewards_owed, 777);
        assert!(plan.quote.token_est_a > 0);
        assert!(plan.quote.token_est_b > 0);
    }

    #[tokio::test]
    async fn test_close_empty_position_only_closes() {
        let config = SdkConfig::new().with_funder(Pubkey::new_unique());
        let mut ledger = MockLedger::new();
        let (pool_address, _) = seeded_pool(&mut ledger, &config);

        let position_mint = Pubkey::new_unique();
        let (position_addr, _) = position_address(&position_mint);
        ledger.add_position(
            position_addr,
            &Position {
                pool: pool_address,
                position_mint,
                liquidity: 0,
                tick_lower_index: -128,
                tick_upper_index: 128,
                fee_growth_checkpoint_a: 0,
                fee_owed_a: 0,
                fee_growth_checkpoint_b: 0,
                fee_owed_b: 0,
                reward_infos: [PositionRewardInfo::default(); NUM_REWARDS],
            },
        );

        let plan = close_position_instructions(&ledger, &config, position_mint)
            .await
            .unwrap();
        assert_eq!(discs(&plan.instructions), vec![CLOSE_DISC]);
        assert_eq!(plan.instructions.len(), 1);
        assert_eq!(plan.quote, DecreaseLiquidityQuote::default());
    }
}
