/// Assembly configuration
///
/// Every assembler takes an explicit, immutable `SdkConfig`; the only
/// process-wide state is a set of defaults behind narrow setters, so tests
/// can always inject a fixed configuration instead of mutating globals.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use tidepool_client::MAINNET_POOLS_CONFIG;

use crate::errors::{SdkError, SdkResult};

/// How the native currency is wrapped into a token account for the
/// duration of a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeMintWrappingStrategy {
    /// Fresh single-use account from a generated keypair; always created
    /// and always closed
    #[default]
    Keypair,
    /// Like `Keypair`, but the account address is derived from a
    /// timestamp seed so no extra key needs managing
    Seed,
    /// The owner's associated token account; closed afterwards only if it
    /// did not already exist
    Ata,
    /// The associated token account, untouched; the caller funds it
    None,
}

/// Immutable per-call configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Account that pays rent and fees and owns the resulting positions
    pub funder: Option<Pubkey>,
    /// Global pools-config account the protocol deployment hangs off
    pub pools_config: Pubkey,
    /// Slippage tolerance in basis points, 0..=10000
    pub slippage_tolerance_bps: u16,
    pub native_mint_wrapping: NativeMintWrappingStrategy,
}

impl SdkConfig {
    pub fn new() -> Self {
        Self {
            funder: None,
            pools_config: MAINNET_POOLS_CONFIG,
            slippage_tolerance_bps: 100,
            native_mint_wrapping: NativeMintWrappingStrategy::default(),
        }
    }

    /// Snapshot the process-wide defaults
    pub fn from_defaults() -> Self {
        Self {
            funder: *read(&DEFAULT_FUNDER),
            pools_config: *read(&DEFAULT_POOLS_CONFIG),
            slippage_tolerance_bps: *read(&DEFAULT_SLIPPAGE_TOLERANCE_BPS),
            native_mint_wrapping: *read(&DEFAULT_NATIVE_MINT_WRAPPING),
        }
    }

    pub fn with_funder(mut self, funder: Pubkey) -> Self {
        self.funder = Some(funder);
        self
    }

    pub fn with_pools_config(mut self, pools_config: Pubkey) -> Self {
        self.pools_config = pools_config;
        self
    }

    pub fn with_slippage_tolerance_bps(mut self, bps: u16) -> Self {
        self.slippage_tolerance_bps = bps;
        self
    }

    pub fn with_native_mint_wrapping(mut self, strategy: NativeMintWrappingStrategy) -> Self {
        self.native_mint_wrapping = strategy;
        self
    }

    /// The configured funder, or the fail-fast precondition error
    pub fn funder(&self) -> SdkResult<Pubkey> {
        self.funder.ok_or(SdkError::MissingFunder)
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Process-wide defaults
// ============================================================================

static DEFAULT_FUNDER: RwLock<Option<Pubkey>> = RwLock::new(None);
static DEFAULT_POOLS_CONFIG: RwLock<Pubkey> = RwLock::new(MAINNET_POOLS_CONFIG);
static DEFAULT_SLIPPAGE_TOLERANCE_BPS: RwLock<u16> = RwLock::new(100);
static DEFAULT_NATIVE_MINT_WRAPPING: RwLock<NativeMintWrappingStrategy> =
    RwLock::new(NativeMintWrappingStrategy::Keypair);

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>, value: T) {
    *lock.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
}

pub fn set_default_funder(funder: Pubkey) {
    write(&DEFAULT_FUNDER, Some(funder));
}

pub fn set_default_pools_config(pools_config: Pubkey) {
    write(&DEFAULT_POOLS_CONFIG, pools_config);
}

pub fn set_default_slippage_tolerance_bps(bps: u16) {
    write(&DEFAULT_SLIPPAGE_TOLERANCE_BPS, bps);
}

pub fn set_default_native_mint_wrapping(strategy: NativeMintWrappingStrategy) {
    write(&DEFAULT_NATIVE_MINT_WRAPPING, strategy);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_funder_fails_fast() {
        let config = SdkConfig::new();
        assert!(matches!(config.funder(), Err(SdkError::MissingFunder)));
        let funded = config.with_funder(Pubkey::new_unique());
        assert!(funded.funder().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = SdkConfig::new()
            .with_slippage_tolerance_bps(250)
            .with_native_mint_wrapping(NativeMintWrappingStrategy::Ata);
        assert_eq!(config.slippage_tolerance_bps, 250);
        assert_eq!(
            config.native_mint_wrapping,
            NativeMintWrappingStrategy::Ata
        );
    }
}
