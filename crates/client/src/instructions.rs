/// Instruction builders for every Tidepool program instruction
///
/// Builders are pure: they encode the given accounts and parameters and
/// never consult chain state. Argument encoding is borsh (little-endian
/// scalars) behind an 8-byte anchor-style discriminator.

use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::TIDEPOOL_ID;

/// Number of tick arrays referenced by a swap instruction
pub const SWAP_TICK_ARRAY_COUNT: usize = 5;

fn data_with(discriminator: [u8; 8], capacity: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(8 + capacity);
    data.extend_from_slice(&discriminator);
    data
}

/// Initialize a pool for a canonically ordered mint pair
#[allow(clippy::too_many_arguments)]
pub fn initialize_pool(
    pools_config: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    funder: &Pubkey,
    pool: &Pubkey,
    token_vault_a: &Pubkey,
    token_vault_b: &Pubkey,
    fee_tier: &Pubkey,
    token_program_a: &Pubkey,
    token_program_b: &Pubkey,
    tick_spacing: u16,
    initial_sqrt_price: u128,
) -> Instruction {
    let mut data = data_with([95, 180, 10, 172, 84, 174, 232, 40], 18);
    data.extend_from_slice(&tick_spacing.to_le_bytes());
    data.extend_from_slice(&initial_sqrt_price.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new_readonly(*pools_config, false),
            AccountMeta::new_readonly(*token_mint_a, false),
            AccountMeta::new_readonly(*token_mint_b, false),
            AccountMeta::new(*funder, true),
            AccountMeta::new(*pool, false),
            AccountMeta::new(*token_vault_a, true),
            AccountMeta::new(*token_vault_b, true),
            AccountMeta::new_readonly(*fee_tier, false),
            AccountMeta::new_readonly(*token_program_a, false),
            AccountMeta::new_readonly(*token_program_b, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(solana_sdk::sysvar::rent::ID, false),
        ],
        data,
    }
}

/// Initialize the tick array starting at `start_tick_index`
pub fn initialize_tick_array(
    pool: &Pubkey,
    funder: &Pubkey,
    tick_array: &Pubkey,
    start_tick_index: i32,
) -> Instruction {
    let mut data = data_with([11, 188, 193, 214, 141, 91, 149, 184], 4);
    data.extend_from_slice(&start_tick_index.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new_readonly(*pool, false),
            AccountMeta::new(*funder, true),
            AccountMeta::new(*tick_array, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    }
}

/// Open a position over the given tick range
#[allow(clippy::too_many_arguments)]
pub fn open_position(
    funder: &Pubkey,
    owner: &Pubkey,
    position: &Pubkey,
    position_mint: &Pubkey,
    position_token_account: &Pubkey,
    pool: &Pubkey,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> Instruction {
    let mut data = data_with([135, 128, 47, 77, 15, 152, 240, 49], 8);
    data.extend_from_slice(&tick_lower_index.to_le_bytes());
    data.extend_from_slice(&tick_upper_index.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new(*position, false),
            AccountMeta::new(*position_mint, true),
            AccountMeta::new(*position_token_account, false),
            AccountMeta::new_readonly(*pool, false),
            AccountMeta::new_readonly(spl_token_2022::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(spl_associated_token_account::ID, false),
        ],
        data,
    }
}

/// Open a position and attach token-extension metadata to its mint
#[allow(clippy::too_many_arguments)]
pub fn open_position_with_metadata(
    funder: &Pubkey,
    owner: &Pubkey,
    position: &Pubkey,
    position_mint: &Pubkey,
    position_token_account: &Pubkey,
    pool: &Pubkey,
    metadata_update_auth: &Pubkey,
    tick_lower_index: i32,
    tick_upper_index: i32,
) -> Instruction {
    let mut data = data_with([242, 29, 134, 48, 58, 110, 14, 60], 8);
    data.extend_from_slice(&tick_lower_index.to_le_bytes());
    data.extend_from_slice(&tick_upper_index.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new(*funder, true),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new(*position, false),
            AccountMeta::new(*position_mint, true),
            AccountMeta::new(*position_token_account, false),
            AccountMeta::new_readonly(*pool, false),
            AccountMeta::new_readonly(*metadata_update_auth, false),
            AccountMeta::new_readonly(spl_token_2022::ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(spl_associated_token_account::ID, false),
        ],
        data,
    }
}

/// Accounts shared by the liquidity-modification instructions
#[derive(Debug, Clone)]
pub struct LiquidityAccounts {
    pub pool: Pubkey,
    pub position_authority: Pubkey,
    pub position: Pubkey,
    pub position_token_account: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
    pub tick_array_lower: Pubkey,
    pub tick_array_upper: Pubkey,
}

impl LiquidityAccounts {
    fn to_metas(&self) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool, false),
            AccountMeta::new_readonly(self.position_authority, true),
            AccountMeta::new(self.position, false),
            AccountMeta::new_readonly(self.position_token_account, false),
            AccountMeta::new_readonly(self.token_mint_a, false),
            AccountMeta::new_readonly(self.token_mint_b, false),
            AccountMeta::new(self.token_owner_account_a, false),
            AccountMeta::new(self.token_owner_account_b, false),
            AccountMeta::new(self.token_vault_a, false),
            AccountMeta::new(self.token_vault_b, false),
            AccountMeta::new_readonly(self.token_program_a, false),
            AccountMeta::new_readonly(self.token_program_b, false),
            AccountMeta::new(self.tick_array_lower, false),
            AccountMeta::new(self.tick_array_upper, false),
        ]
    }
}

/// Deposit liquidity into a position
pub fn increase_liquidity(
    accounts: &LiquidityAccounts,
    liquidity_amount: u128,
    token_max_a: u64,
    token_max_b: u64,
) -> Instruction {
    let mut data = data_with([46, 156, 243, 118, 13, 205, 251, 178], 32);
    data.extend_from_slice(&liquidity_amount.to_le_bytes());
    data.extend_from_slice(&token_max_a.to_le_bytes());
    data.extend_from_slice(&token_max_b.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: accounts.to_metas(),
        data,
    }
}

/// Withdraw liquidity from a position
pub fn decrease_liquidity(
    accounts: &LiquidityAccounts,
    liquidity_amount: u128,
    token_min_a: u64,
    token_min_b: u64,
) -> Instruction {
    let mut data = data_with([160, 38, 208, 111, 104, 91, 44, 1], 32);
    data.extend_from_slice(&liquidity_amount.to_le_bytes());
    data.extend_from_slice(&token_min_a.to_le_bytes());
    data.extend_from_slice(&token_min_b.to_le_bytes());

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: accounts.to_metas(),
        data,
    }
}

/// Checkpoint a position's owed fees and rewards against current growth
pub fn update_fees_and_rewards(
    pool: &Pubkey,
    position: &Pubkey,
    tick_array_lower: &Pubkey,
    tick_array_upper: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new(*pool, false),
            AccountMeta::new(*position, false),
            AccountMeta::new_readonly(*tick_array_lower, false),
            AccountMeta::new_readonly(*tick_array_upper, false),
        ],
        data: data_with([154, 230, 250, 13, 236, 209, 75, 223], 0),
    }
}

/// Collect the fees owed to a position
#[allow(clippy::too_many_arguments)]
pub fn collect_fees(
    pool: &Pubkey,
    position_authority: &Pubkey,
    position: &Pubkey,
    position_token_account: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    token_owner_account_a: &Pubkey,
    token_owner_account_b: &Pubkey,
    token_vault_a: &Pubkey,
    token_vault_b: &Pubkey,
    token_program_a: &Pubkey,
    token_program_b: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new(*pool, false),
            AccountMeta::new_readonly(*position_authority, true),
            AccountMeta::new(*position, false),
            AccountMeta::new_readonly(*position_token_account, false),
            AccountMeta::new_readonly(*token_mint_a, false),
            AccountMeta::new_readonly(*token_mint_b, false),
            AccountMeta::new(*token_owner_account_a, false),
            AccountMeta::new(*token_owner_account_b, false),
            AccountMeta::new(*token_vault_a, false),
            AccountMeta::new(*token_vault_b, false),
            AccountMeta::new_readonly(*token_program_a, false),
            AccountMeta::new_readonly(*token_program_b, false),
        ],
        data: data_with([164, 152, 207, 99, 30, 186, 19, 182], 0),
    }
}

/// Collect one reward slot owed to a position
#[allow(clippy::too_many_arguments)]
pub fn collect_reward(
    pool: &Pubkey,
    position_authority: &Pubkey,
    position: &Pubkey,
    position_token_account: &Pubkey,
    reward_mint: &Pubkey,
    reward_owner_account: &Pubkey,
    reward_vault: &Pubkey,
    reward_token_program: &Pubkey,
    reward_index: u8,
) -> Instruction {
    let mut data = data_with([70, 5, 132, 87, 86, 235, 177, 34], 1);
    data.push(reward_index);

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new(*pool, false),
            AccountMeta::new_readonly(*position_authority, true),
            AccountMeta::new(*position, false),
            AccountMeta::new_readonly(*position_token_account, false),
            AccountMeta::new_readonly(*reward_mint, false),
            AccountMeta::new(*reward_owner_account, false),
            AccountMeta::new(*reward_vault, false),
            AccountMeta::new_readonly(*reward_token_program, false),
        ],
        data,
    }
}

/// Burn the position token and close the position account
pub fn close_position(
    position_authority: &Pubkey,
    receiver: &Pubkey,
    position: &Pubkey,
    position_mint: &Pubkey,
    position_token_account: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new_readonly(*position_authority, true),
            AccountMeta::new(*receiver, false),
            AccountMeta::new(*position, false),
            AccountMeta::new(*position_mint, false),
            AccountMeta::new(*position_token_account, false),
            AccountMeta::new_readonly(spl_token_2022::ID, false),
        ],
        data: data_with([123, 134, 81, 0, 49, 68, 98, 98], 0),
    }
}

/// Accounts for a swap instruction
#[derive(Debug, Clone)]
pub struct SwapAccounts {
    pub pool: Pubkey,
    pub token_authority: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_owner_account_a: Pubkey,
    pub token_owner_account_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub token_program_a: Pubkey,
    pub token_program_b: Pubkey,
    pub tick_arrays: [Pubkey; SWAP_TICK_ARRAY_COUNT],
    pub oracle: Pubkey,
}

/// Execute a swap against a pool
pub fn swap(
    accounts: &SwapAccounts,
    amount: u64,
    other_amount_threshold: u64,
    sqrt_price_limit: u128,
    amount_specified_is_input: bool,
    a_to_b: bool,
) -> Instruction {
    let mut data = data_with([248, 198, 158, 145, 225, 117, 135, 200], 34);
    data.extend_from_slice(&amount.to_le_bytes());
    data.extend_from_slice(&other_amount_threshold.to_le_bytes());
    data.extend_from_slice(&sqrt_price_limit.to_le_bytes());
    data.push(amount_specified_is_input as u8);
    data.push(a_to_b as u8);

    let mut metas = vec![
        AccountMeta::new(accounts.pool, false),
        AccountMeta::new_readonly(accounts.token_authority, true),
        AccountMeta::new_readonly(accounts.token_mint_a, false),
        AccountMeta::new_readonly(accounts.token_mint_b, false),
        AccountMeta::new(accounts.token_owner_account_a, false),
        AccountMeta::new(accounts.token_owner_account_b, false),
        AccountMeta::new(accounts.token_vault_a, false),
        AccountMeta::new(accounts.token_vault_b, false),
        AccountMeta::new_readonly(accounts.token_program_a, false),
        AccountMeta::new_readonly(accounts.token_program_b, false),
    ];
    for tick_array in &accounts.tick_arrays {
        metas.push(AccountMeta::new(*tick_array, false));
    }
    metas.push(AccountMeta::new(accounts.oracle, false));

    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: metas,
        data,
    }
}

/// Move a locked position to a new owner's token account
#[allow(clippy::too_many_arguments)]
pub fn transfer_locked_position(
    position_authority: &Pubkey,
    receiver: &Pubkey,
    position: &Pubkey,
    position_mint: &Pubkey,
    position_token_account: &Pubkey,
    destination_token_account: &Pubkey,
    lock_config: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: TIDEPOOL_ID,
        accounts: vec![
            AccountMeta::new_readonly(*position_authority, true),
            AccountMeta::new(*receiver, false),
            AccountMeta::new_readonly(*position, false),
            AccountMeta::new_readonly(*position_mint, false),
            AccountMeta::new(*position_token_account, false),
            AccountMeta::new(*destination_token_account, false),
            AccountMeta::new(*lock_config, false),
            AccountMeta::new_readonly(spl_token_2022::ID, false),
        ],
        data: data_with([179, 121, 229, 46, 67, 138, 194, 138], 0),
    }
}
