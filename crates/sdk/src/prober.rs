/// Batched ledger probes and account decoding
///
/// Everything the assemblers know about chain state flows through here:
/// existence probes, typed fetches of protocol accounts, mint inspection,
/// and the conversion of decoded accounts into the math facades.

use solana_sdk::account::Account;
use solana_sdk::pubkey::Pubkey;
use spl_token_2022::extension::transfer_fee::TransferFeeConfig;
use spl_token_2022::extension::{BaseStateWithExtensions, StateWithExtensions};
use spl_token_2022::state::Mint;
use tidepool_client::accounts::{LockConfig, Pool, Position, TickArray};
use tidepool_math::{
    PoolFacade, PoolRewardFacade, PositionFacade, PositionRewardFacade, TickArrayFacade,
    TickFacade, TransferFee,
};

use crate::errors::{SdkError, SdkResult};
use crate::rpc::LedgerReader;

// ============================================================================
// Existence probes
// ============================================================================

/// Which of `addresses` currently exist on the ledger, in order
pub async fn fetch_existence(
    reader: &dyn LedgerReader,
    addresses: &[Pubkey],
) -> SdkResult<Vec<bool>> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }
    let accounts = reader.get_multiple_accounts(addresses).await?;
    Ok(accounts.iter().map(Option::is_some).collect())
}

// ============================================================================
// Typed fetches
// ============================================================================

fn decode_error(kind: &'static str, address: Pubkey, err: std::io::Error) -> SdkError {
    SdkError::AccountDecode {
        kind,
        address,
        reason: err.to_string(),
    }
}

pub async fn fetch_pool(reader: &dyn LedgerReader, address: &Pubkey) -> SdkResult<Pool> {
    let account = reader
        .get_account(address)
        .await?
        .ok_or(SdkError::AccountNotFound {
            kind: "Pool",
            address: *address,
        })?;
    Pool::from_bytes(&account.data).map_err(|e| decode_error("Pool", *address, e))
}

pub async fn fetch_position(reader: &dyn LedgerReader, address: &Pubkey) -> SdkResult<Position> {
    let account = reader
        .get_account(address)
        .await?
        .ok_or(SdkError::AccountNotFound {
            kind: "Position",
            address: *address,
        })?;
    Position::from_bytes(&account.data).map_err(|e| decode_error("Position", *address, e))
}

pub async fn fetch_lock_config(
    reader: &dyn LedgerReader,
    address: &Pubkey,
) -> SdkResult<LockConfig> {
    let account = reader
        .get_account(address)
        .await?
        .ok_or(SdkError::AccountNotFound {
            kind: "LockConfig",
            address: *address,
        })?;
    LockConfig::from_bytes(&account.data).map_err(|e| decode_error("LockConfig", *address, e))
}

/// Fetch tick arrays for `addresses`, substituting a fully uninitialized
/// facade for any array absent from the ledger. `starts` must parallel
/// `addresses` and name each array's first tick.
pub async fn fetch_tick_arrays_or_default(
    reader: &dyn LedgerReader,
    addresses: &[Pubkey],
    starts: &[i32],
) -> SdkResult<Vec<TickArrayFacade>> {
    let accounts = reader.get_multiple_accounts(addresses).await?;
    let mut arrays = Vec::with_capacity(addresses.len());
    for ((account, address), start) in accounts.iter().zip(addresses).zip(starts) {
        match account {
            Some(account) => {
                let decoded = TickArray::from_bytes(&account.data)
                    .map_err(|e| decode_error("TickArray", *address, e))?;
                arrays.push(tick_array_facade(&decoded));
            }
            None => arrays.push(TickArrayFacade::uninitialized(*start)),
        }
    }
    Ok(arrays)
}

// ============================================================================
// Mint inspection
// ============================================================================

/// Decoded mint state the assemblers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintInfo {
    pub address: Pubkey,
    /// Token program that owns the mint
    pub token_program: Pubkey,
    pub decimals: u8,
    /// Transfer fee in effect for the current epoch, if the mint levies one
    pub transfer_fee: Option<TransferFee>,
}

fn decode_mint(address: Pubkey, account: &Account, epoch: u64) -> SdkResult<MintInfo> {
    if account.owner != spl_token::ID && account.owner != spl_token_2022::ID {
        return Err(SdkError::UnsupportedTokenProgram {
            account: address,
            program: account.owner,
        });
    }
    let state = StateWithExtensions::<Mint>::unpack(&account.data).map_err(|e| {
        SdkError::AccountDecode {
            kind: "Mint",
            address,
            reason: e.to_string(),
        }
    })?;
    let transfer_fee = state
        .get_extension::<TransferFeeConfig>()
        .ok()
        .map(|config| {
            let fee = config.get_epoch_fee(epoch);
            TransferFee {
                basis_points: u16::from(fee.transfer_fee_basis_points),
                maximum_fee: u64::from(fee.maximum_fee),
            }
        });
    Ok(MintInfo {
        address,
        token_program: account.owner,
        decimals: state.base.decimals,
        transfer_fee,
    })
}

/// Fetch and decode the given mints in one round trip
pub async fn fetch_mints(
    reader: &dyn LedgerReader,
    addresses: &[Pubkey],
    epoch: u64,
) -> SdkResult<Vec<MintInfo>> {
    if addresses.is_empty() {
        return Ok(Vec::new());
    }
    let accounts = reader.get_multiple_accounts(addresses).await?;
    let mut mints = Vec::with_capacity(addresses.len());
    for (account, address) in accounts.iter().zip(addresses) {
        let account = account.as_ref().ok_or(SdkError::AccountNotFound {
            kind: "Mint",
            address: *address,
        })?;
        mints.push(decode_mint(*address, account, epoch)?);
    }
    Ok(mints)
}

// ============================================================================
// Facade conversions
// ============================================================================

pub fn pool_facade(pool: &Pool) -> PoolFacade {
    PoolFacade {
        tick_spacing: pool.tick_spacing,
        fee_rate: pool.fee_rate,
        liquidity: pool.liquidity,
        sqrt_price: pool.sqrt_price,
        tick_current_index: pool.tick_current_index,
        fee_growth_global_a: pool.fee_growth_global_a,
        fee_growth_global_b: pool.fee_growth_global_b,
        reward_infos: pool.reward_infos.map(|info| PoolRewardFacade {
            growth_global_x64: info.growth_global_x64,
            emissions_per_second_x64: info.emissions_per_second_x64,
        }),
    }
}

pub fn position_facade(position: &Position) -> PositionFacade {
    PositionFacade {
        liquidity: position.liquidity,
        tick_lower_index: position.tick_lower_index,
        tick_upper_index: position.tick_upper_index,
        fee_growth_checkpoint_a: position.fee_growth_checkpoint_a,
        fee_owed_a: position.fee_owed_a,
        fee_growth_checkpoint_b: position.fee_growth_checkpoint_b,
        fee_owed_b: position.fee_owed_b,
        reward_infos: position.reward_infos.map(|info| PositionRewardFacade {
            growth_inside_checkpoint: info.growth_inside_checkpoint,
            amount_owed: info.amount_owed,
        }),
    }
}

pub fn tick_array_facade(array: &TickArray) -> TickArrayFacade {
    TickArrayFacade {
        start_tick_index: array.start_tick_index,
        ticks: array.ticks.map(|tick| TickFacade {
            initialized: tick.initialized,
            liquidity_net: tick.liquidity_net,
            liquidity_gross: tick.liquidity_gross,
            fee_growth_outside_a: tick.fee_growth_outside_a,
            fee_growth_outside_b: tick.fee_growth_outside_b,
            reward_growths_outside: tick.reward_growths_outside,
        }),
    }
}
