/// Deterministic address derivations
///
/// Every address the pipeline queries or references in an instruction is
/// obtained here, so probing and instruction assembly can never disagree
/// about which account they mean.

use solana_sdk::pubkey::Pubkey;

use crate::TIDEPOOL_ID;

/// Derive a pool PDA for a canonical (A < B) mint pair and tick spacing
pub fn pool_address(
    pools_config: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    tick_spacing: u16,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"pool",
            pools_config.as_ref(),
            token_mint_a.as_ref(),
            token_mint_b.as_ref(),
            &tick_spacing.to_le_bytes(),
        ],
        &TIDEPOOL_ID,
    )
}

/// Derive the fee tier PDA for a tick spacing
pub fn fee_tier_address(pools_config: &Pubkey, tick_spacing: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"fee_tier",
            pools_config.as_ref(),
            &tick_spacing.to_le_bytes(),
        ],
        &TIDEPOOL_ID,
    )
}

/// Derive a tick array PDA from its pool and start tick index
pub fn tick_array_address(pool: &Pubkey, start_tick_index: i32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"tick_array",
            pool.as_ref(),
            &start_tick_index.to_le_bytes(),
        ],
        &TIDEPOOL_ID,
    )
}

/// Derive a position PDA from its position mint
pub fn position_address(position_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"position", position_mint.as_ref()], &TIDEPOOL_ID)
}

/// Derive the oracle PDA for a pool
pub fn oracle_address(pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"oracle", pool.as_ref()], &TIDEPOOL_ID)
}

/// Derive the lock-config PDA for a position
pub fn lock_config_address(position: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"lock_config", position.as_ref()], &TIDEPOOL_ID)
}
