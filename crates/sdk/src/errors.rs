/// SDK error types
///
/// Three families matter to callers: precondition violations (rejected
/// before any network call), missing required state (`AccountNotFound`,
/// distinct so callers can branch on it), and fatal configuration errors
/// that indicate a programming mistake rather than bad user input.

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;
use tidepool_math::CoreError;

#[derive(Error, Debug)]
pub enum SdkError {
    // ========================================================================
    // Precondition violations
    // ========================================================================
    #[error("No funder configured")]
    MissingFunder,

    #[error("Token mints must be passed in canonical byte order")]
    MintsNotInCanonicalOrder,

    #[error("Duplicate token requirement for mint {0}")]
    DuplicateTokenRequirement(Pubkey),

    #[error("Pool only accepts full-range positions")]
    FullRangeOnlyPool,

    #[error("Mint {0} does not belong to the pool")]
    MintNotInPool(Pubkey),

    // ========================================================================
    // Missing required state
    // ========================================================================
    #[error("{kind} not found: {address}")]
    AccountNotFound { kind: &'static str, address: Pubkey },

    #[error("Failed to decode {kind} {address}: {reason}")]
    AccountDecode {
        kind: &'static str,
        address: Pubkey,
        reason: String,
    },

    // ========================================================================
    // Fatal configuration
    // ========================================================================
    #[error("Account {account} is owned by unsupported token program {program}")]
    UnsupportedTokenProgram { account: Pubkey, program: Pubkey },

    // ========================================================================
    // Propagated failures
    // ========================================================================
    #[error("Math error: {0}")]
    Math(#[from] CoreError),

    #[error("Token instruction build failed: {0}")]
    TokenInstruction(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl SdkError {
    /// Whether this failure is the distinct "required account missing"
    /// condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::AccountNotFound { .. })
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
