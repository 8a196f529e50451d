/// Transport abstraction
///
/// The assemblers only ever read the ledger, and only through this trait,
/// so tests run against an in-memory map and production runs against the
/// nonblocking RPC client. Retries, if any, belong to the transport.

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::account::Account;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::errors::{SdkError, SdkResult};

/// Read-side ledger capabilities the pipeline needs
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Fetch many accounts in one round trip; `None` per missing address
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> SdkResult<Vec<Option<Account>>>;

    /// Minimum balance for an account of `data_len` bytes to be
    /// rent-exempt
    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64>;

    /// Current epoch, used to select the active transfer-fee schedule
    async fn get_epoch(&self) -> SdkResult<u64>;

    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        let mut accounts = self.get_multiple_accounts(std::slice::from_ref(address)).await?;
        Ok(accounts.pop().flatten())
    }
}

#[async_trait]
impl LedgerReader for RpcClient {
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> SdkResult<Vec<Option<Account>>> {
        RpcClient::get_multiple_accounts(self, addresses)
            .await
            .map_err(|e| SdkError::Rpc(e.to_string()))
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> SdkResult<u64> {
        RpcClient::get_minimum_balance_for_rent_exemption(self, data_len)
            .await
            .map_err(|e| SdkError::Rpc(e.to_string()))
    }

    async fn get_epoch(&self) -> SdkResult<u64> {
        self.get_epoch_info()
            .await
            .map(|info| info.epoch)
            .map_err(|e| SdkError::Rpc(e.to_string()))
    }

    async fn get_account(&self, address: &Pubkey) -> SdkResult<Option<Account>> {
        self.get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map(|response| response.value)
            .map_err(|e| SdkError::Rpc(e.to_string()))
    }
}
