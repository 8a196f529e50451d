/// Token account provisioning
///
/// Given the set of mints a plan touches, this module emits the setup and
/// cleanup instructions that make the owner's token accounts exist for the
/// duration of the plan. Ordinary mints resolve to associated token
/// accounts created idempotently; the native mint follows the configured
/// wrapping strategy.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::system_instruction;
use spl_associated_token_account::get_associated_token_address_with_program_id;
use spl_associated_token_account::instruction::create_associated_token_account_idempotent;

use crate::config::{NativeMintWrappingStrategy, SdkConfig};
use crate::errors::{SdkError, SdkResult};
use crate::prober::fetch_existence;
use crate::rent::TOKEN_ACCOUNT_LEN;
use crate::rpc::LedgerReader;

/// A mint the plan needs a token account for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRequirement {
    pub mint: Pubkey,
    /// Token program that owns the mint
    pub token_program: Pubkey,
    /// Lamports to wrap when the mint is the native mint; ignored otherwise
    pub amount: u64,
}

impl TokenRequirement {
    /// The account only needs to exist, nothing gets wrapped into it
    pub fn present(mint: Pubkey, token_program: Pubkey) -> Self {
        Self {
            mint,
            token_program,
            amount: 0,
        }
    }

    /// The account must hold at least `amount`, wrapped from the owner's
    /// balance when the mint is native
    pub fn with_amount(mint: Pubkey, token_program: Pubkey, amount: u64) -> Self {
        Self {
            mint,
            token_program,
            amount,
        }
    }
}

/// Result of provisioning: bracketing instructions plus the resolved
/// token account address per mint
pub struct PreparedTokenAccounts {
    pub setup_instructions: Vec<Instruction>,
    pub cleanup_instructions: Vec<Instruction>,
    /// Mint to token account
    pub addresses: HashMap<Pubkey, Pubkey>,
    /// Ephemeral keypairs that must co-sign the transaction
    pub additional_signers: Vec<Keypair>,
}

fn token_instruction_error(e: impl ToString) -> SdkError {
    SdkError::TokenInstruction(e.to_string())
}

fn millis_seed() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    millis.to_string()
}

/// Resolve token accounts for every requirement, emitting creation,
/// wrapping, and teardown instructions as the configured strategy demands.
/// Rejects duplicate mints; a plan that needs the same mint twice is a
/// caller bug.
pub async fn prepare_token_accounts(
    reader: &dyn LedgerReader,
    config: &SdkConfig,
    owner: Pubkey,
    requirements: &[TokenRequirement],
) -> SdkResult<PreparedTokenAccounts> {
    let funder = config.funder()?;

    let mut seen: Vec<Pubkey> = Vec::with_capacity(requirements.len());
    for requirement in requirements {
        if seen.contains(&requirement.mint) {
            return Err(SdkError::DuplicateTokenRequirement(requirement.mint));
        }
        seen.push(requirement.mint);
    }

    let mut prepared = PreparedTokenAccounts {
        setup_instructions: Vec::new(),
        cleanup_instructions: Vec::new(),
        addresses: HashMap::with_capacity(requirements.len()),
        additional_signers: Vec::new(),
    };

    // One existence probe covers every associated account the plan may use
    let ata_addresses: Vec<Pubkey> = requirements
        .iter()
        .map(|r| get_associated_token_address_with_program_id(&owner, &r.mint, &r.token_program))
        .collect();
    let ata_exists = fetch_existence(reader, &ata_addresses).await?;

    let has_native = requirements
        .iter()
        .any(|r| r.mint == spl_token::native_mint::ID);
    let needs_rent = has_native
        && matches!(
            config.native_mint_wrapping,
            NativeMintWrappingStrategy::Keypair | NativeMintWrappingStrategy::Seed
        );
    let token_account_rent = if needs_rent {
        reader
            .get_minimum_balance_for_rent_exemption(TOKEN_ACCOUNT_LEN)
            .await?
    } else {
        0
    };

    for ((requirement, ata), exists) in requirements.iter().zip(&ata_addresses).zip(&ata_exists) {
        if requirement.mint != spl_token::native_mint::ID {
            prepared.addresses.insert(requirement.mint, *ata);
            if !exists {
                prepared.setup_instructions.push(
                    create_associated_token_account_idempotent(
                        &funder,
                        &owner,
                        &requirement.mint,
                        &requirement.token_program,
                    ),
                );
            }
            continue;
        }

        let account = match config.native_mint_wrapping {
            NativeMintWrappingStrategy::Keypair => {
                let keypair = Keypair::new();
                let account = keypair.pubkey();
                prepared.setup_instructions.push(system_instruction::create_account(
                    &funder,
                    &account,
                    token_account_rent,
                    TOKEN_ACCOUNT_LEN as u64,
                    &spl_token::ID,
                ));
                prepared.setup_instructions.push(
                    spl_token::instruction::initialize_account3(
                        &spl_token::ID,
                        &account,
                        &spl_token::native_mint::ID,
                        &owner,
                    )
                    .map_err(token_instruction_error)?,
                );
                prepared.cleanup_instructions.push(
                    spl_token::instruction::close_account(
                        &spl_token::ID,
                        &account,
                        &owner,
                        &owner,
                        &[],
                    )
                    .map_err(token_instruction_error)?,
                );
                prepared.additional_signers.push(keypair);
                account
            }
            NativeMintWrappingStrategy::Seed => {
                let seed = millis_seed();
                let account = Pubkey::create_with_seed(&owner, &seed, &spl_token::ID)
                    .map_err(token_instruction_error)?;
                prepared
                    .setup_instructions
                    .push(system_instruction::create_account_with_seed(
                        &funder,
                        &account,
                        &owner,
                        &seed,
                        token_account_rent,
                        TOKEN_ACCOUNT_LEN as u64,
                        &spl_token::ID,
                    ));
                prepared.setup_instructions.push(
                    spl_token::instruction::initialize_account3(
                        &spl_token::ID,
                        &account,
                        &spl_token::native_mint::ID,
                        &owner,
                    )
                    .map_err(token_instruction_error)?,
                );
                prepared.cleanup_instructions.push(
                    spl_token::instruction::close_account(
                        &spl_token::ID,
                        &account,
                        &owner,
                        &owner,
                        &[],
                    )
                    .map_err(token_instruction_error)?,
                );
                account
            }
            NativeMintWrappingStrategy::Ata => {
                if !exists {
                    prepared.setup_instructions.push(
                        create_associated_token_account_idempotent(
                            &funder,
                            &owner,
                            &spl_token::native_mint::ID,
                            &spl_token::ID,
                        ),
                    );
                    // Only tear down what this plan brought into existence
                    prepared.cleanup_instructions.push(
                        spl_token::instruction::close_account(
                            &spl_token::ID,
                            ata,
                            &owner,
                            &owner,
                            &[],
                        )
                        .map_err(token_instruction_error)?,
                    );
                }
                *ata
            }
            NativeMintWrappingStrategy::None => *ata,
        };

        if config.native_mint_wrapping != NativeMintWrappingStrategy::None
            && requirement.amount > 0
        {
            prepared
                .setup_instructions
                .push(system_instruction::transfer(
                    &owner,
                    &account,
                    requirement.amount,
                ));
            prepared.setup_instructions.push(
                spl_token::instruction::sync_native(&spl_token::ID, &account)
                    .map_err(token_instruction_error)?,
            );
        }

        prepared.addresses.insert(requirement.mint, account);
    }

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLedger;

    fn config_with_funder(strategy: NativeMintWrappingStrategy) -> SdkConfig {
        SdkConfig::new()
            .with_funder(Pubkey::new_unique())
            .with_native_mint_wrapping(strategy)
    }

    #[tokio::test]
    async fn test_existing_ata_needs_no_instructions() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut ledger = MockLedger::new();
        let ata = get_associated_token_address_with_program_id(&owner, &mint, &spl_token::ID);
        ledger.add_token_account(ata, mint, owner, 0);

        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Keypair),
            owner,
            &[TokenRequirement::present(mint, spl_token::ID)],
        )
        .await
        .unwrap();
        assert!(prepared.setup_instructions.is_empty());
        assert!(prepared.cleanup_instructions.is_empty());
        assert_eq!(prepared.addresses[&mint], ata);
    }

    #[tokio::test]
    async fn test_missing_ata_is_created_idempotently() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ledger = MockLedger::new();

        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Keypair),
            owner,
            &[TokenRequirement::present(mint, spl_token::ID)],
        )
        .await
        .unwrap();
        assert_eq!(prepared.setup_instructions.len(), 1);
        assert_eq!(
            prepared.setup_instructions[0].program_id,
            spl_associated_token_account::ID
        );
        assert!(prepared.cleanup_instructions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_requirement_is_rejected() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let ledger = MockLedger::new();

        let result = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Keypair),
            owner,
            &[
                TokenRequirement::present(mint, spl_token::ID),
                TokenRequirement::with_amount(mint, spl_token::ID, 5),
            ],
        )
        .await;
        assert!(matches!(
            result,
            Err(SdkError::DuplicateTokenRequirement(m)) if m == mint
        ));
    }

    #[tokio::test]
    async fn test_native_keypair_strategy_creates_and_closes() {
        let owner = Pubkey::new_unique();
        let ledger = MockLedger::new();

        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Keypair),
            owner,
            &[TokenRequirement::with_amount(
                spl_token::native_mint::ID,
                spl_token::ID,
                1_000_000,
            )],
        )
        .await
        .unwrap();
        // create, initialize, transfer, sync
        assert_eq!(prepared.setup_instructions.len(), 4);
        assert_eq!(prepared.cleanup_instructions.len(), 1);
        assert_eq!(prepared.additional_signers.len(), 1);
        let account = prepared.addresses[&spl_token::native_mint::ID];
        assert_eq!(account, prepared.additional_signers[0].pubkey());
    }

    #[tokio::test]
    async fn test_native_seed_strategy_needs_no_extra_signer() {
        let owner = Pubkey::new_unique();
        let ledger = MockLedger::new();

        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Seed),
            owner,
            &[TokenRequirement::with_amount(
                spl_token::native_mint::ID,
                spl_token::ID,
                1_000_000,
            )],
        )
        .await
        .unwrap();
        assert_eq!(prepared.setup_instructions.len(), 4);
        assert_eq!(prepared.cleanup_instructions.len(), 1);
        assert!(prepared.additional_signers.is_empty());
    }

    #[tokio::test]
    async fn test_native_ata_strategy_closes_only_fresh_accounts() {
        let owner = Pubkey::new_unique();
        let native = spl_token::native_mint::ID;
        let ata = get_associated_token_address_with_program_id(&owner, &native, &spl_token::ID);

        // Absent: create then close
        let ledger = MockLedger::new();
        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Ata),
            owner,
            &[TokenRequirement::present(native, spl_token::ID)],
        )
        .await
        .unwrap();
        assert_eq!(prepared.setup_instructions.len(), 1);
        assert_eq!(prepared.cleanup_instructions.len(), 1);

        // Already present: leave it alone
        let mut ledger = MockLedger::new();
        ledger.add_token_account(ata, native, owner, 0);
        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::Ata),
            owner,
            &[TokenRequirement::present(native, spl_token::ID)],
        )
        .await
        .unwrap();
        assert!(prepared.setup_instructions.is_empty());
        assert!(prepared.cleanup_instructions.is_empty());
    }

    #[tokio::test]
    async fn test_native_none_strategy_touches_nothing() {
        let owner = Pubkey::new_unique();
        let ledger = MockLedger::new();

        let prepared = prepare_token_accounts(
            &ledger,
            &config_with_funder(NativeMintWrappingStrategy::None),
            owner,
            &[TokenRequirement::with_amount(
                spl_token::native_mint::ID,
                spl_token::ID,
                1_000_000,
            )],
        )
        .await
        .unwrap();
        assert!(prepared.setup_instructions.is_empty());
        assert!(prepared.cleanup_instructions.is_empty());
        assert!(prepared.additional_signers.is_empty());
    }

    #[tokio::test]
    async fn test_missing_funder_fails_before_any_probe() {
        let owner = Pubkey::new_unique();
        let ledger = MockLedger::new();
        let config = SdkConfig::new();

        let result = prepare_token_accounts(
            &ledger,
            &config,
            owner,
            &[TokenRequirement::present(Pubkey::new_unique(), spl_token::ID)],
        )
        .await;
        assert!(matches!(result, Err(SdkError::MissingFunder)));
    }
}
