/// Fee-on-transfer adjustments
///
/// Quotes must reflect what actually arrives in (or leaves) an account
/// once a Token-2022 transfer fee is withheld. The fee is a basis-point
/// cut capped at an absolute maximum, matching the token extension rules.

use crate::constants::BPS_DENOMINATOR;
use crate::error::{CoreError, CoreResult};
use crate::types::TransferFee;

/// Fee withheld when transferring `amount`
pub fn transfer_fee_for(amount: u64, fee: TransferFee) -> u64 {
    if fee.basis_points == 0 {
        return 0;
    }
    let raw = (u128::from(amount) * u128::from(fee.basis_points))
        .div_ceil(BPS_DENOMINATOR as u128) as u64;
    raw.min(fee.maximum_fee)
}

/// Net amount received when `amount` is sent through a fee-on-transfer
/// mint. `None` means the mint takes no fee.
pub fn apply_transfer_fee(amount: u64, fee: Option<TransferFee>) -> u64 {
    match fee {
        Some(fee) => amount - transfer_fee_for(amount, fee),
        None => amount,
    }
}

/// Gross amount that must be sent so that at least `net` arrives after the
/// transfer fee is withheld
pub fn reverse_transfer_fee(net: u64, fee: Option<TransferFee>) -> CoreResult<u64> {
    let Some(fee) = fee else {
        return Ok(net);
    };
    if fee.basis_points == 0 || net == 0 {
        return Ok(net);
    }
    if u64::from(fee.basis_points) >= BPS_DENOMINATOR {
        // Everything above the cap is taken; only the cap can be recovered
        return net
            .checked_add(fee.maximum_fee)
            .ok_or(CoreError::MathOverflow);
    }
    let denominator = BPS_DENOMINATOR - u64::from(fee.basis_points);
    let raw = (u128::from(net) * BPS_DENOMINATOR as u128).div_ceil(denominator as u128);
    let raw = u64::try_from(raw).map_err(|_| CoreError::MathOverflow)?;
    if raw - net >= fee.maximum_fee {
        net.checked_add(fee.maximum_fee)
            .ok_or(CoreError::MathOverflow)
    } else {
        Ok(raw)
    }
}
