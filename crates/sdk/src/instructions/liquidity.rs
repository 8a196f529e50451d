/// Adjusting liquidity on an existing position

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use tidepool_client::accounts::Pool;
use tidepool_client::instructions::{decrease_liquidity, increase_liquidity, LiquidityAccounts};
use tidepool_math::{DecreaseLiquidityQuote, IncreaseLiquidityQuote};

use crate::config::SdkConfig;
use crate::errors::SdkResult;
use crate::prober::{fetch_pool, fetch_position, MintInfo};
use crate::quote::{decrease_quote, increase_quote, LiquidityParam};
use crate::rpc::LedgerReader;
use crate::token::{prepare_token_accounts, PreparedTokenAccounts, TokenRequirement};

use super::{fetch_pool_mints, position_accounts, position_tick_arrays};

/// Plan that deposits liquidity into an existing position
pub struct IncreaseLiquidityInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    pub quote: IncreaseLiquidityQuote,
}

/// Plan that withdraws liquidity from an existing position
pub struct DecreaseLiquidityInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    pub quote: DecreaseLiquidityQuote,
}

struct PositionContext {
    pool_address: Pubkey,
    pool: Pool,
    mint_a: MintInfo,
    mint_b: MintInfo,
    position_addr: Pubkey,
    position: tidepool_client::accounts::Position,
    position_token_account: Pubkey,
    lower_array: Pubkey,
    upper_array: Pubkey,
}

async fn load_position_context(
    reader: &dyn LedgerReader,
    authority: &Pubkey,
    position_mint: &Pubkey,
) -> SdkResult<PositionContext> {
    let (position_addr, position_token_account) = position_accounts(authority, position_mint);
    let position = fetch_position(reader, &position_addr).await?;
    let pool = fetch_pool(reader, &position.pool).await?;
    let (mint_a, mint_b, _) = fetch_pool_mints(reader, &pool).await?;
    let ((_, lower_array), (_, upper_array)) = position_tick_arrays(
        &position.pool,
        position.tick_lower_index,
        position.tick_upper_index,
        pool.tick_spacing,
    );
    Ok(PositionContext {
        pool_address: position.pool,
        pool,
        mint_a,
        mint_b,
        position_addr,
        position,
        position_token_account,
        lower_array,
        upper_array,
    })
}

fn liquidity_accounts(
    context: &PositionContext,
    authority: Pubkey,
    prepared: &PreparedTokenAccounts,
) -> LiquidityAccounts {
    LiquidityAccounts {
        pool: context.pool_address,
        position_authority: authority,
        position: context.position_addr,
        position_token_account: context.position_token_account,
        token_mint_a: context.pool.token_mint_a,
        token_mint_b: context.pool.token_mint_b,
        token_owner_account_a: prepared.addresses[&context.pool.token_mint_a],
        token_owner_account_b: prepared.addresses[&context.pool.token_mint_b],
        token_vault_a: context.pool.token_vault_a,
        token_vault_b: context.pool.token_vault_b,
        token_program_a: context.mint_a.token_program,
        token_program_b: context.mint_b.token_program,
        tick_array_lower: context.lower_array,
        tick_array_upper: context.upper_array,
    }
}

/// Assemble the plan that adds liquidity to the position identified by
/// its mint
pub async fn increase_liquidity_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    position_mint: Pubkey,
    param: LiquidityParam,
) -> SdkResult<IncreaseLiquidityInstructions> {
    let authority = config.funder()?;
    let context = load_position_context(reader, &authority, &position_mint).await?;

    let quote = increase_quote(
        param,
        config.slippage_tolerance_bps,
        context.pool.sqrt_price,
        context.position.tick_lower_index,
        context.position.tick_upper_index,
        context.mint_a.transfer_fee,
        context.mint_b.transfer_fee,
    )?;

    let prepared = prepare_token_accounts(
        reader,
        config,
        authority,
        &[
            TokenRequirement::with_amount(
                context.mint_a.address,
                context.mint_a.token_program,
                quote.token_max_a,
            ),
            TokenRequirement::with_amount(
                context.mint_b.address,
                context.mint_b.token_program,
                quote.token_max_b,
            ),
        ],
    )
    .await?;

    let accounts = liquidity_accounts(&context, authority, &prepared);
    let mut instructions = prepared.setup_instructions;
    instructions.push(increase_liquidity(
        &accounts,
        quote.liquidity_delta,
        quote.token_max_a,
        quote.token_max_b,
    ));
    instructions.extend(prepared.cleanup_instructions);

    Ok(IncreaseLiquidityInstructions {
        instructions,
        additional_signers: prepared.additional_signers,
        quote,
    })
}

/// Assemble the plan that withdraws liquidity from the position
/// identified by its mint
pub async fn decrease_liquidity_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    position_mint: Pubkey,
    param: LiquidityParam,
) -> SdkResult<DecreaseLiquidityInstructions> {
    let authority = config.funder()?;
    let context = load_position_context(reader, &authority, &position_mint).await?;

    let quote = decrease_quote(
        param,
        config.slippage_tolerance_bps,
        context.pool.sqrt_price,
        context.position.tick_lower_index,
        context.position.tick_upper_index,
        context.mint_a.transfer_fee,
        context.mint_b.transfer_fee,
    )?;

    let prepared = prepare_token_accounts(
        reader,
        config,
        authority,
        &[
            TokenRequirement::present(context.mint_a.address, context.mint_a.token_program),
            TokenRequirement::present(context.mint_b.address, context.mint_b.token_program),
        ],
    )
    .await?;

    let accounts = liquidity_accounts(&context, authority, &prepared);
    let mut instructions = prepared.setup_instructions;
    instructions.push(decrease_liquidity(
        &accounts,
        quote.liquidity_delta,
        quote.token_min_a,
        quote.token_min_b,
    ));
    instructions.extend(prepared.cleanup_instructions);

    Ok(DecreaseLiquidityInstructions {
        instructions,
        additional_signers: prepared.additional_signers,
        quote,
    })
}
