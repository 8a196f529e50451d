/// Concentrated-liquidity math for the Tidepool protocol
///
/// Pure quote and conversion functions shared by the SDK and any other
/// off-chain component. Everything in this crate operates on plain facade
/// structs; there are no chain or transport dependencies, so all of it is
/// directly unit-testable.

pub mod constants;
pub mod error;
pub mod fees;
pub mod liquidity;
pub mod slippage;
pub mod sqrt_price;
pub mod swap;
pub mod tick;
pub mod transfer_fee;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use error::*;
pub use fees::*;
pub use liquidity::*;
pub use slippage::*;
pub use sqrt_price::*;
pub use swap::*;
pub use tick::*;
pub use transfer_fee::*;
pub use types::*;
