/// Rent cost estimation
///
/// Plans report an upfront lamport estimate so wallets can surface it
/// before signing. Estimates cover rent for accounts the plan creates;
/// transaction fees are the transport's concern.

use std::collections::HashMap;

use crate::errors::SdkResult;
use crate::rpc::LedgerReader;

/// Packed length of a classic SPL token account
pub const TOKEN_ACCOUNT_LEN: usize = 165;

/// Total rent-exempt balance for accounts of the given sizes, querying
/// each distinct size once
pub async fn rent_for_sizes(reader: &dyn LedgerReader, sizes: &[usize]) -> SdkResult<u64> {
    let mut cache: HashMap<usize, u64> = HashMap::new();
    let mut total: u64 = 0;
    for &size in sizes {
        let rent = match cache.get(&size) {
            Some(rent) => *rent,
            None => {
                let rent = reader.get_minimum_balance_for_rent_exemption(size).await?;
                cache.insert(size, rent);
                rent
            }
        };
        total = total.saturating_add(rent);
    }
    Ok(total)
}
