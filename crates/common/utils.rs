use ethereum_types::{Address, U256};

use crate::types::TokenId;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone, Copy)]
pub enum ConversionError {
    #[error("Converted amount does not fit in 64 bits")]
    Overflow,
    #[error("Amount is not representable in the target precision")]
    PrecisionLoss,
}

/// Deposit address of `token`: `base + token`.
pub fn system_address(base: Address, token: TokenId) -> Address {
    let (sum, _) = U256::from_big_endian(base.as_bytes()).overflowing_add(U256::from(token));
    address_from_u256(sum)
}

/// Inverse of [`system_address`]. `None` if `address` is below `base` or too far above it.
pub fn token_for_system_address(base: Address, address: Address) -> Option<TokenId> {
    let base = U256::from_big_endian(base.as_bytes());
    let address = U256::from_big_endian(address.as_bytes());
    let token = address.checked_sub(base)?;
    (token.bits() <= 64).then(|| token.low_u64())
}

fn address_from_u256(value: U256) -> Address {
    let word = value.to_big_endian();
    Address::from_slice(&word[12..])
}

fn pow10(exponent: u32) -> Result<U256, ConversionError> {
    U256::from(10)
        .checked_pow(U256::from(exponent))
        .ok_or(ConversionError::Overflow)
}

fn to_u64(value: U256) -> Result<u64, ConversionError> {
    if value.bits() > 64 {
        return Err(ConversionError::Overflow);
    }
    Ok(value.low_u64())
}

/// Converts an EVM amount into ledger wei.
///
/// Returns the ledger amount and the dust, the EVM amount that has no ledger representation.
pub fn evm_to_core(
    amount: U256,
    evm_extra_wei_decimals: i8,
) -> Result<(u64, U256), ConversionError> {
    let scale = pow10(u32::from(evm_extra_wei_decimals.unsigned_abs()))?;
    if evm_extra_wei_decimals >= 0 {
        let (core, dust) = amount.div_mod(scale);
        Ok((to_u64(core)?, dust))
    } else {
        let core = amount.checked_mul(scale).ok_or(ConversionError::Overflow)?;
        Ok((to_u64(core)?, U256::zero()))
    }
}

/// Converts ledger wei into the EVM amount.
pub fn core_to_evm(amount: u64, evm_extra_wei_decimals: i8) -> Result<U256, ConversionError> {
    let scale = pow10(u32::from(evm_extra_wei_decimals.unsigned_abs()))?;
    let amount = U256::from(amount);
    if evm_extra_wei_decimals >= 0 {
        amount.checked_mul(scale).ok_or(ConversionError::Overflow)
    } else {
        let (evm, remainder) = amount.div_mod(scale);
        if !remainder.is_zero() {
            return Err(ConversionError::PrecisionLoss);
        }
        Ok(evm)
    }
}

/// Rescales `amount` from `from_decimals` to `to_decimals`. Fails instead of rounding.
pub fn rescale(amount: u64, from_decimals: u8, to_decimals: u8) -> Result<u64, ConversionError> {
    let amount = U256::from(amount);
    if to_decimals >= from_decimals {
        let scale = pow10(u32::from(to_decimals - from_decimals))?;
        to_u64(amount.checked_mul(scale).ok_or(ConversionError::Overflow)?)
    } else {
        let scale = pow10(u32::from(from_decimals - to_decimals))?;
        let (scaled, remainder) = amount.div_mod(scale);
        if !remainder.is_zero() {
            return Err(ConversionError::PrecisionLoss);
        }
        to_u64(scaled)
    }
}
