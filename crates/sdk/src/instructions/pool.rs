/// Pool creation

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use tidepool_client::accounts::Pool;
use tidepool_client::instructions::initialize_pool;
use tidepool_client::pdas::{fee_tier_address, pool_address};
use tidepool_math::price_to_sqrt_price;

use crate::config::SdkConfig;
use crate::errors::{SdkError, SdkResult};
use crate::prober::fetch_mints;
use crate::rent::{rent_for_sizes, TOKEN_ACCOUNT_LEN};
use crate::rpc::LedgerReader;

/// Plan for initializing a new pool
pub struct CreatePoolInstructions {
    pub instructions: Vec<Instruction>,
    /// The two vault keypairs, which must co-sign
    pub additional_signers: Vec<Keypair>,
    pub pool_address: Pubkey,
    pub initial_sqrt_price: u128,
    /// Upfront rent in lamports for the pool account and its two vaults
    pub initialization_cost: u64,
}

/// Assemble the plan that initializes a pool for a canonically ordered
/// mint pair at the given decimal-adjusted price
pub async fn create_concentrated_pool_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    token_mint_a: Pubkey,
    token_mint_b: Pubkey,
    tick_spacing: u16,
    initial_price: f64,
) -> SdkResult<CreatePoolInstructions> {
    let funder = config.funder()?;
    // Mint order determines the PDA; a reversed pair is a caller bug,
    // never silently corrected
    if token_mint_a >= token_mint_b {
        return Err(SdkError::MintsNotInCanonicalOrder);
    }

    let epoch = reader.get_epoch().await?;
    let mints = fetch_mints(reader, &[token_mint_a, token_mint_b], epoch).await?;
    let initial_sqrt_price =
        price_to_sqrt_price(initial_price, mints[0].decimals, mints[1].decimals)?;

    let (pool, _) = pool_address(
        &config.pools_config,
        &token_mint_a,
        &token_mint_b,
        tick_spacing,
    );
    let (fee_tier, _) = fee_tier_address(&config.pools_config, tick_spacing);
    let token_vault_a = Keypair::new();
    let token_vault_b = Keypair::new();

    let instruction = initialize_pool(
        &config.pools_config,
        &token_mint_a,
        &token_mint_b,
        &funder,
        &pool,
        &token_vault_a.pubkey(),
        &token_vault_b.pubkey(),
        &fee_tier,
        &mints[0].token_program,
        &mints[1].token_program,
        tick_spacing,
        initial_sqrt_price,
    );

    let initialization_cost = rent_for_sizes(
        reader,
        &[Pool::LEN, TOKEN_ACCOUNT_LEN, TOKEN_ACCOUNT_LEN],
    )
    .await?;

    Ok(CreatePoolInstructions {
        instructions: vec![instruction],
        additional_signers: vec![token_vault_a, token_vault_b],
        pool_address: pool,
        initial_sqrt_price,
        initialization_cost,
    })
}
