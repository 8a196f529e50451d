/// Transferring locked positions

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;
use tidepool_client::instructions::transfer_locked_position;
use tidepool_client::pdas::lock_config_address;

use crate::config::SdkConfig;
use crate::errors::SdkResult;
use crate::prober::{fetch_existence, fetch_lock_config, fetch_position};
use crate::rpc::LedgerReader;

use super::{position_accounts, position_token_account_address};

/// Plan that moves a permanently locked position to a new owner
pub struct TransferLockedPositionInstructions {
    pub instructions: Vec<Instruction>,
    pub additional_signers: Vec<Keypair>,
    /// The receiver's token account that ends up holding the position NFT
    pub destination_token_account: Pubkey,
}

/// Assemble the plan that transfers the locked position identified by its
/// mint to `receiver`, creating the receiver's token account if needed
pub async fn transfer_locked_position_instructions(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    position_mint: Pubkey,
    receiver: Pubkey,
) -> SdkResult<TransferLockedPositionInstructions> {
    let authority = config.funder()?;
    let (position_addr, position_token_account) = position_accounts(&authority, &position_mint);
    fetch_position(reader, &position_addr).await?;
    let (lock_config, _) = lock_config_address(&position_addr);
    fetch_lock_config(reader, &lock_config).await?;

    let destination_token_account = position_token_account_address(&receiver, &position_mint);
    let destination_exists = fetch_existence(reader, &[destination_token_account]).await?[0];

    let mut instructions = Vec::new();
    if !destination_exists {
        instructions.push(create_associated_token_account_idempotent(
            &authority,
            &receiver,
            &position_mint,
            &spl_token_2022::ID,
        ));
    }
    instructions.push(transfer_locked_position(
        &authority,
        &receiver,
        &position_addr,
        &position_mint,
        &position_token_account,
        &destination_token_account,
        &lock_config,
    ));

    Ok(TransferLockedPositionInstructions {
        instructions,
        additional_signers: Vec::new(),
        destination_token_account,
    })
}
