/// Tidepool SDK
///
/// High-level instruction assembly for the Tidepool concentrated-liquidity
/// protocol. Each entry point turns one user intent into an ordered,
/// ready-to-sign instruction list:
/// - Pool creation
/// - Opening, resizing, and closing positions
/// - Harvesting fees and rewards
/// - Swaps
/// - Transferring locked positions
///
/// Plans are assembled client-side from a read-only view of the ledger;
/// signing and submission stay with the caller.

pub mod config;
pub mod errors;
pub mod instructions;
pub mod prober;
pub mod quote;
pub mod rent;
pub mod rpc;
pub mod token;

#[cfg(test)]
mod testing;

pub use config::*;
pub use errors::*;
pub use instructions::*;
pub use quote::LiquidityParam;
pub use rpc::LedgerReader;
pub use token::{PreparedTokenAccounts, TokenRequirement};

// Re-export the program bindings and math the assemblers are built on
pub use tidepool_client::{
    DEVNET_POOLS_CONFIG, MAINNET_POOLS_CONFIG, METADATA_UPDATE_AUTH, TIDEPOOL_ID,
};
pub use tidepool_math as math;
