/// Program bindings for the Tidepool concentrated-liquidity protocol
///
/// Account layouts, PDA derivations, and instruction builders. Everything
/// here is a direct mapping of the on-chain program interface; the
/// higher-level assembly pipeline lives in `tidepool-sdk`.

pub mod accounts;
pub mod instructions;
pub mod pdas;

pub use accounts::*;
pub use instructions::*;
pub use pdas::*;

use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

/// The Tidepool program
pub const TIDEPOOL_ID: Pubkey = pubkey!("2CuP3WA7R8pYgutu1j3BjKQJ5N4kEvkXntmBU94aPf1C");

/// Global pools-config account on mainnet
pub const MAINNET_POOLS_CONFIG: Pubkey = pubkey!("8QhDSSmPDiB7H7oGLcLaooSpXXWfJ8tcrWGcx6mPJFVo");

/// Global pools-config account on devnet
pub const DEVNET_POOLS_CONFIG: Pubkey = pubkey!("A9pgmiuFyjzdo1jFBJ2w8CKBFaBjNe56412tDt2erB9B");

/// Authority allowed to update position metadata
pub const METADATA_UPDATE_AUTH: Pubkey = pubkey!("zmvwRz4EjC8bVyu5EgFubZxYkEHUExKspMhEKeGutTp");
