/// In-memory ledger and fixtures for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use solana_sdk::account::Account;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use spl_token_2022::extension::transfer_fee::TransferFeeConfig;
use spl_token_2022::extension::{
    BaseStateWithExtensionsMut, ExtensionType, StateWithExtensionsMut,
};
use tidepool_client::accounts::{LockConfig, Pool, Position, TickArray};
use tidepool_client::TIDEPOOL_ID;

use crate::errors::SdkResult;
use crate::rpc::LedgerReader;

/// A ledger backed by a map; rent follows the default rent schedule
pub struct MockLedger {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    epoch: u64,
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            epoch: 0,
        }
    }

    pub fn with_epoch(mut self, epoch: u64) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn add_account(&mut self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let lamports = Rent::default().minimum_balance(data.len());
        self.accounts.lock().unwrap().insert(
            address,
            Account {
                lamports,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn add_pool(&mut self, address: Pubkey, pool: &Pool) {
        self.add_account(address, TIDEPOOL_ID, pool.to_bytes().unwrap());
    }

    pub fn add_position(&mut self, address: Pubkey, position: &Position) {
        self.add_account(address, TIDEPOOL_ID, position.to_bytes().unwrap());
    }

    pub fn add_tick_array(&mut self, address: Pubkey, array: &TickArray) {
        self.add_account(address, TIDEPOOL_ID, array.to_bytes().unwrap());
    }

    pub fn add_lock_config(&mut self, address: Pubkey, lock: &LockConfig) {
        self.add_account(address, TIDEPOOL_ID, lock.to_bytes().unwrap());
    }

    /// A plain token account holding `amount` of `mint` for `owner`
    pub fn add_token_account(&mut self, address: Pubkey, mint: Pubkey, owner: Pubkey, amount: u64) {
        let state = spl_token::state::Account {
            mint,
            owner,
            amount,
            state: spl_token::state::AccountState::Initialized,
            ..Default::default()
        };
        let mut data = vec![0u8; spl_token::state::Account::LEN];
        spl_token::state::Account::pack(state, &mut data).unwrap();
        self.add_account(address, spl_token::ID, data);
    }

    /// A classic SPL mint with the given decimals
    pub fn add_mint(&mut self, address: Pubkey, decimals: u8) {
        let state = spl_token::state::Mint {
            decimals,
            is_initialized: true,
            ..Default::default()
        };
        let mut data = vec![0u8; spl_token::state::Mint::LEN];
        spl_token::state::Mint::pack(state, &mut data).unwrap();
        self.add_account(address, spl_token::ID, data);
    }

    /// A token-2022 mint carrying a transfer-fee schedule
    pub fn add_mint_with_transfer_fee(
        &mut self,
        address: Pubkey,
        decimals: u8,
        older_bps: u16,
        newer_bps: u16,
        newer_epoch: u64,
        maximum_fee: u64,
    ) {
        let len = ExtensionType::try_calculate_account_len::<spl_token_2022::state::Mint>(&[
            ExtensionType::TransferFeeConfig,
        ])
        .unwrap();
        let mut data = vec![0u8; len];
        let mut state =
            StateWithExtensionsMut::<spl_token_2022::state::Mint>::unpack_uninitialized(&mut data)
                .unwrap();
        let config = state.init_extension::<TransferFeeConfig>(true).unwrap();
        config.older_transfer_fee.epoch = 0u64.into();
        config.older_transfer_fee.transfer_fee_basis_points = older_bps.into();
        config.older_transfer_fee.maximum_fee = maximum_fee.into();
        config.newer_transfer_fee.epoch = newer_epoch.into();
        config.newer_transfer_fee.transfer_fee_basis_points = newer_bps.into();
        config.newer_transfer_fee.maximum_fee = maximum_fee.into();
        state.base = spl_token_2022::state::Mint {
            decimals,
            is_initialized: true,
            ..Default::default()
        };
        state.pack_base();
        state.init_account_type().unwrap();
        self.add_account(address, spl_token_2022::ID, data);
    }
}

#[async_trait]
impl LedgerReader for MockLedger {
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> SdkResult<Vec<Option<Account>>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(addresses.iter().map(|a| accounts.get(a).cloned()).collect())
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        Ok(Rent::default().minimum_balance(data_len))
    }

    async fn get_epoch(&self) -> SdkResult<u64> {
        Ok(self.epoch)
    }
}

/// A pool fixture at the given price with sensible defaults
pub fn test_pool(tick_current_index: i32, sqrt_price: u128, tick_spacing: u16) -> Pool {
    Pool {
        pools_config: Pubkey::new_unique(),
        token_mint_a: Pubkey::new_unique(),
        token_mint_b: Pubkey::new_unique(),
        token_vault_a: Pubkey::new_unique(),
        token_vault_b: Pubkey::new_unique(),
        tick_spacing,
        fee_rate: 3000,
        protocol_fee_rate: 300,
        liquidity: 0,
        sqrt_price,
        tick_current_index,
        fee_growth_global_a: 0,
        fee_growth_global_b: 0,
        protocol_fee_owed_a: 0,
        protocol_fee_owed_b: 0,
        reward_last_updated_timestamp: 0,
        reward_infos: Default::default(),
    }
}
