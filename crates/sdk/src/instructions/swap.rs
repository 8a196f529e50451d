/// Swap assembly

use serde::{Deserialize, Serialize};
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use tidepool_client::instructions::{swap, SwapAccounts};
use tidepool_client::pdas::{oracle_address, tick_array_address};
use tidepool_math::{
    adjust_sqrt_price, get_tick_array_start_tick_index, swap_quote_by_input_token,
    swap_quote_by_output_token, ExactInSwapQuote, ExactOutSwapQuote, TickArraySequence,
    TICK_ARRAY_SIZE, SWAP_TICK_ARRAY_COUNT,
};

use crate::config::SdkConfig;
use crate::errors::SdkResult;
use crate::prober::{fetch_pool, fetch_tick_arrays_or_default, pool_facade};
use crate::rpc::LedgerReader;
use crate::token::{prepare_token_accounts, TokenRequirement};

use super::{fetch_pool_mints, mint_side};

/// Which side of the trade the caller fixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapKind {
    /// `amount` is the input spent; output is estimated
    ExactIn,
    /// `amount` is the output received; input is estimated
    ExactOut,
}

/// Quote attached to a swap plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapQuote {
    ExactIn(ExactInSwapQuote),
    ExactOut(ExactOutSwapQuote),
}

/// Plan executing a single swap against a pool
pub struct SwapInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    pub quote: SwapQuote,
}

/// Assemble the plan that swaps against `pool_address`. `specified_mint`
/// names the token whose amount is fixed; the five tick arrays around the
/// current tick are resolved in one fetch, with absent arrays treated as
/// empty.
pub async fn swap_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    pool_address: Pubkey,
    amount: u64,
    specified_mint: Pubkey,
    kind: SwapKind,
) -> SdkResult<SwapInstructions> {
    let authority = config.funder()?;
    let pool = fetch_pool(reader, &pool_address).await?;
    let specified_is_a = mint_side(&pool, &specified_mint)?;
    let (mint_a, mint_b, _) = fetch_pool_mints(reader, &pool).await?;

    let span = pool.tick_spacing as i32 * TICK_ARRAY_SIZE as i32;
    let current_start = get_tick_array_start_tick_index(pool.tick_current_index, pool.tick_spacing);
    let mut starts = [0i32; SWAP_TICK_ARRAY_COUNT];
    let mut addresses = [Pubkey::default(); SWAP_TICK_ARRAY_COUNT];
    for (slot, offset) in (-2i32..=2).enumerate() {
        starts[slot] = current_start + offset * span;
        addresses[slot] = tick_array_address(&pool_address, starts[slot]).0;
    }
    let arrays = fetch_tick_arrays_or_default(reader, &addresses, &starts).await?;
    let mut sequence_arrays = [arrays[0]; SWAP_TICK_ARRAY_COUNT];
    sequence_arrays.copy_from_slice(&arrays);
    let sequence = TickArraySequence::new(sequence_arrays, pool.tick_spacing)?;

    let a_to_b = match kind {
        SwapKind::ExactIn => specified_is_a,
        SwapKind::ExactOut => !specified_is_a,
    };
    let (input_mint, output_mint) = if a_to_b {
        (mint_a, mint_b)
    } else {
        (mint_b, mint_a)
    };

    let pool_state = pool_facade(&pool);
    let (quote, input_amount, other_amount_threshold) = match kind {
        SwapKind::ExactIn => {
            let quote = swap_quote_by_input_token(
                amount,
                specified_is_a,
                config.slippage_tolerance_bps,
                &pool_state,
                &sequence,
                input_mint.transfer_fee,
                output_mint.transfer_fee,
            )?;
            (SwapQuote::ExactIn(quote), amount, quote.token_min_out)
        }
        SwapKind::ExactOut => {
            let quote = swap_quote_by_output_token(
                amount,
                specified_is_a,
                config.slippage_tolerance_bps,
                &pool_state,
                &sequence,
                input_mint.transfer_fee,
                output_mint.transfer_fee,
            )?;
            (SwapQuote::ExactOut(quote), quote.token_max_in, quote.token_max_in)
        }
    };

    let prepared = prepare_token_accounts(
        reader,
        config,
        authority,
        &[
            TokenRequirement::with_amount(
                input_mint.address,
                input_mint.token_program,
                input_amount,
            ),
            TokenRequirement::present(output_mint.address, output_mint.token_program),
        ],
    )
    .await?;

    // Selling A pushes the price down, selling B pushes it up; the limit
    // sits one slippage tolerance away from the current price
    let sqrt_price_limit =
        adjust_sqrt_price(pool.sqrt_price, config.slippage_tolerance_bps, !a_to_b)?;

    let mut instructions = prepared.setup_instructions;
    instructions.push(swap(
        &SwapAccounts {
            pool: pool_address,
            token_authority: authority,
            token_mint_a: pool.token_mint_a,
            token_mint_b: pool.token_mint_b,
            token_owner_account_a: prepared.addresses[&pool.token_mint_a],
            token_owner_account_b: prepared.addresses[&pool.token_mint_b],
            token_vault_a: pool.token_vault_a,
            token_vault_b: pool.token_vault_b,
            token_program_a: mint_a.token_program,
            token_program_b: mint_b.token_program,
            tick_arrays: addresses,
            oracle: oracle_address(&pool_address).0,
        },
        amount,
        other_amount_threshold,
        sqrt_price_limit,
        matches!(kind, SwapKind::ExactIn),
        a_to_b,
    ));
    instructions.extend(prepared.cleanup_instructions);

    Ok(SwapInstructions {
        instructions,
        additional_signers: prepared.additional_signers,
        quote,
    })
}
