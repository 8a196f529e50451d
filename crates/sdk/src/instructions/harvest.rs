/// Harvesting fees and rewards without touching liquidity

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use tidepool_client::instructions::{collect_fees, collect_reward, update_fees_and_rewards};
use tidepool_math::{
    collect_fees_quote, collect_rewards_quote, tick_offset_in_array, CollectFeesQuote,
    CollectRewardsQuote, NUM_REWARDS,
};

use crate::config::SdkConfig;
use crate::errors::SdkResult;
use crate::prober::{
    fetch_mints, fetch_pool, fetch_position, fetch_tick_arrays_or_default, pool_facade,
    position_facade,
};
use crate::rpc::LedgerReader;
use crate::token::{prepare_token_accounts, TokenRequirement};

use super::{fetch_pool_mints, position_accounts, position_tick_arrays};

/// Plan that collects everything currently owed to a position
pub struct HarvestPositionInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    pub fees_quote: CollectFeesQuote,
    pub rewards_quote: CollectRewardsQuote,
}

/// Assemble the plan that checkpoints and collects owed fees and rewards
/// for the position identified by its mint, leaving liquidity in place
pub async fn harvest_position_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    position_mint: Pubkey,
) -> SdkResult<HarvestPositionInstructions> {
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
    let fees_quote = collect_fees_quote(
        &pool_state,
        &position_state,
        &lower_tick,
        &upper_tick,
        mint_a.transfer_fee,
        mint_b.transfer_fee,
    )?;

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

    // Provision only accounts that will actually receive something
    let has_fees = fees_quote.fee_owed_a > 0 || fees_quote.fee_owed_b > 0;
    let mut requirements = Vec::new();
    if has_fees {
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
    // Owed amounts are stale until growth is checkpointed, which only
    // matters while liquidity is nonzero
    if position.liquidity > 0 {
        instructions.push(update_fees_and_rewards(
            &position.pool,
            &position_addr,
            &lower_array,
            &upper_array,
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
    instructions.extend(prepared.cleanup_instructions);

    Ok(HarvestPositionInstructions {
        instructions,
        additional_signers: prepared.additional_signers,
        fees_quote,
        rewards_quote,
    })
}
