/// Action assemblers
///
/// Each assembler turns one user intent into an ordered instruction list:
/// token setup, structural initialization, the core program action, then
/// token cleanup. Assemblers read the ledger through `LedgerReader`, fail
/// fast on violated preconditions, and never emit a partial plan.

mod harvest;
mod liquidity;
mod lock;
mod pool;
mod position;
mod swap;

pub use harvest::{harvest_position_instructions, HarvestPositionInstructions};
pub use liquidity::{
    decrease_liquidity_instructions, increase_liquidity_instructions,
    DecreaseLiquidityInstructions, IncreaseLiquidityInstructions,
};
pub use lock::{transfer_locked_position_instructions, TransferLockedPositionInstructions};
pub use pool::{create_concentrated_pool_instructions, CreatePoolInstructions};
pub use position::{
    close_position_instructions, open_full_range_position_instructions,
    open_position_instructions, ClosePositionInstructions, OpenPositionInstructions,
};
pub use swap::{swap_instructions, SwapInstructions, SwapKind, SwapQuote};

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use tidepool_client::accounts::Pool;
use tidepool_client::pdas::{position_address, tick_array_address};
use tidepool_math::get_tick_array_start_tick_index;

use crate::errors::{SdkError, SdkResult};
use crate::prober::{fetch_mints, MintInfo};
use crate::rpc::LedgerReader;

/// Position NFTs are always Token-2022 mints
pub(crate) fn position_token_account_address(owner: &Pubkey, position_mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, position_mint, &spl_token_2022::ID)
}

/// Position PDA and its owner's token account for the position NFT
pub(crate) fn position_accounts(owner: &Pubkey, position_mint: &Pubkey) -> (Pubkey, Pubkey) {
    let (position, _) = position_address(position_mint);
    (position, position_token_account_address(owner, position_mint))
}

/// Tick array start index and PDA for each position bound
pub(crate) fn position_tick_arrays(
    pool_address: &Pubkey,
    tick_lower_index: i32,
    tick_upper_index: i32,
    tick_spacing: u16,
) -> ((i32, Pubkey), (i32, Pubkey)) {
    let lower_start = get_tick_array_start_tick_index(tick_lower_index, tick_spacing);
    let upper_start = get_tick_array_start_tick_index(tick_upper_index, tick_spacing);
    let (lower_address, _) = tick_array_address(pool_address, lower_start);
    let (upper_address, _) = tick_array_address(pool_address, upper_start);
    ((lower_start, lower_address), (upper_start, upper_address))
}

/// The pool's two mints, decoded, plus the epoch they were resolved at
pub(crate) async fn fetch_pool_mints(
    reader: &dyn LedgerReader,
    pool: &Pool,
) -> SdkResult<(MintInfo, MintInfo, u64)> {
    let epoch = reader.get_epoch().await?;
    let mints = fetch_mints(reader, &[pool.token_mint_a, pool.token_mint_b], epoch).await?;
    Ok((mints[0], mints[1], epoch))
}

/// Resolve which side of the pool a caller-specified mint sits on
pub(crate) fn mint_side(pool: &Pool, mint: &Pubkey) -> SdkResult<bool> {
    if *mint == pool.token_mint_a {
        Ok(true)
    } else if *mint == pool.token_mint_b {
        Ok(false)
    } else {
        Err(SdkError::MintNotInPool(*mint))
    }
}
