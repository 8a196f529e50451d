/// On-chain account layouts and decoders
///
/// Accounts are anchor-style: an 8-byte discriminator followed by the
/// borsh-encoded body. `from_bytes` tolerates trailing bytes so layouts
/// can grow; the discriminator check is strict.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::pubkey::Pubkey;
use std::io::{Error, ErrorKind, Result};

/// Number of reward slots per pool
pub const NUM_REWARDS: usize = 3;

/// Number of ticks per tick array account
pub const TICK_ARRAY_SIZE: usize = 88;

fn check_discriminator(data: &[u8], expected: [u8; 8], name: &str) -> Result<()> {
    if data.len() < 8 || data[..8] != expected {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("account data is not a {name}"),
        ));
    }
    Ok(())
}

// ============================================================================
// Pool
// ============================================================================

/// One reward slot of a pool
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolRewardInfo {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub emissions_per_second_x64: u128,
    pub growth_global_x64: u128,
}

impl PoolRewardInfo {
    /// Whether this reward slot has been initialized with a mint
    pub fn initialized(&self) -> bool {
        self.mint != Pubkey::default()
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool {
    pub pools_config: Pubkey,
    pub token_mint_a: Pubkey,
    pub token_mint_b: Pubkey,
    pub token_vault_a: Pubkey,
    pub token_vault_b: Pubkey,
    pub tick_spacing: u16,
    /// Fee rate in hundredths of a basis point
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub fee_growth_global_a: u128,
    pub fee_growth_global_b: u128,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [PoolRewardInfo; NUM_REWARDS],
}

impl Pool {
    pub const DISCRIMINATOR: [u8; 8] = [241, 154, 109, 4, 17, 177, 109, 188];
    pub const LEN: usize = 554;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_discriminator(data, Self::DISCRIMINATOR, "Pool")?;
        Self::deserialize(&mut &data[8..])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

// ============================================================================
// Position
// ============================================================================

/// One reward slot of a position
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionRewardInfo {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub pool: Pubkey,
    pub position_mint: Pubkey,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

impl Position {
    pub const DISCRIMINATOR: [u8; 8] = [170, 188, 143, 228, 122, 64, 247, 208];
    pub const LEN: usize = 216;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_discriminator(data, Self::DISCRIMINATOR, "Position")?;
        Self::deserialize(&mut &data[8..])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

// ============================================================================
// Tick array
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick {
    pub initialized: bool,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub reward_growths_outside: [u128; NUM_REWARDS],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICK_ARRAY_SIZE],
    pub pool: Pubkey,
}

impl TickArray {
    pub const DISCRIMINATOR: [u8; 8] = [69, 97, 189, 190, 110, 7, 66, 187];
    pub const LEN: usize = 9988;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_discriminator(data, Self::DISCRIMINATOR, "TickArray")?;
        Self::deserialize(&mut &data[8..])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

// ============================================================================
// Fee tier
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTier {
    pub pools_config: Pubkey,
    pub tick_spacing: u16,
    pub default_fee_rate: u16,
}

impl FeeTier {
    pub const DISCRIMINATOR: [u8; 8] = [56, 75, 159, 76, 142, 68, 190, 105];
    pub const LEN: usize = 44;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_discriminator(data, Self::DISCRIMINATOR, "FeeTier")?;
        Self::deserialize(&mut &data[8..])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

// ============================================================================
// Lock config
// ============================================================================

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Permanent,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    pub position: Pubkey,
    pub position_owner: Pubkey,
    pub pool: Pubkey,
    pub locked_timestamp: u64,
    pub lock_kind: LockKind,
}

impl LockConfig {
    pub const DISCRIMINATOR: [u8; 8] = [106, 47, 238, 159, 124, 12, 160, 192];
    pub const LEN: usize = 113;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_discriminator(data, Self::DISCRIMINATOR, "LockConfig")?;
        Self::deserialize(&mut &data[8..])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> Pool {
        Pool {
            pools_config: Pubkey::new_unique(),
            token_mint_a: Pubkey::new_unique(),
            token_mint_b: Pubkey::new_unique(),
            token_vault_a: Pubkey::new_unique(),
            token_vault_b: Pubkey::new_unique(),
            tick_spacing: 64,
            fee_rate: 3000,
            protocol_fee_rate: 300,
            liquidity: 123,
            sqrt_price: 1 << 64,
            tick_current_index: -5,
            fee_growth_global_a: 1,
            fee_growth_global_b: 2,
            protocol_fee_owed_a: 3,
            protocol_fee_owed_b: 4,
            reward_last_updated_timestamp: 5,
            reward_infos: [PoolRewardInfo::default(); NUM_REWARDS],
        }
    }

    #[test]
    fn test_pool_round_trip_and_len() {
        let pool = sample_pool();
        let bytes = pool.to_bytes().unwrap();
        assert_eq!(bytes.len(), Pool::LEN);
        assert_eq!(Pool::from_bytes(&bytes).unwrap(), pool);
    }

    #[test]
    fn test_discriminator_is_enforced() {
        let mut bytes = sample_pool().to_bytes().unwrap();
        bytes[0] ^= 0xff;
        assert!(Pool::from_bytes(&bytes).is_err());
        // A pool is not a position either
        let bytes = sample_pool().to_bytes().unwrap();
        assert!(Position::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_tick_array_len() {
        let array = TickArray {
            start_tick_index: -5632,
            ticks: [Tick::default(); TICK_ARRAY_SIZE],
            pool: Pubkey::new_unique(),
        };
        let bytes = array.to_bytes().unwrap();
        assert_eq!(bytes.len(), TickArray::LEN);
        let decoded = TickArray::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.start_tick_index, -5632);
    }

    #[test]
    fn test_position_and_lock_config_round_trip() {
        let position = Position {
            pool: Pubkey::new_unique(),
            position_mint: Pubkey::new_unique(),
            liquidity: 42,
            tick_lower_index: -128,
            tick_upper_index: 128,
            fee_growth_checkpoint_a: 0,
            fee_owed_a: 7,
            fee_growth_checkpoint_b: 0,
            fee_owed_b: 9,
            reward_infos: [PositionRewardInfo::default(); NUM_REWARDS],
        };
        let bytes = position.to_bytes().unwrap();
        assert_eq!(bytes.len(), Position::LEN);
        assert_eq!(Position::from_bytes(&bytes).unwrap(), position);

        let lock = LockConfig {
            position: Pubkey::new_unique(),
            position_owner: Pubkey::new_unique(),
            pool: Pubkey::new_unique(),
            locked_timestamp: 1_700_000_000,
            lock_kind: LockKind::Permanent,
        };
        let bytes = lock.to_bytes().unwrap();
        assert_eq!(bytes.len(), LockConfig::LEN);
        assert_eq!(LockConfig::from_bytes(&bytes).unwrap(), lock);
    }
}
