use crate::{H160, types::TokenId};
use hex_literal::hex;

// === Well known tokens ===

/// USD reference token. Class transfers move value between its spot balance and the
/// withdrawable perp balance.
pub const USDC_TOKEN: TokenId = 0;

/// Native gas token, always present at genesis.
pub const HYPE_TOKEN: TokenId = 150;

// === Reserved addresses ===

/// Native value sent here is deposited into the ledger as the native token.
pub const NATIVE_SYSTEM_ADDRESS: H160 = H160(hex!("2222222222222222222222222222222222222222"));

/// Write system contract. Accepts raw actions that are queued until the next flush.
pub const CORE_WRITER_ADDRESS: H160 = H160(hex!("3333333333333333333333333333333333333333"));

/// Per token deposit addresses are this base plus the token id.
pub const SYSTEM_ADDRESS_BASE: H160 = H160(hex!("2000000000000000000000000000000000000000"));

/// Deployer used when computing the address of a spot token contract.
pub const SPOT_ERC20_DEPLOYER: H160 = H160(hex!("4444444444444444444444444444444444444444"));

/// Read precompiles live at `PRECOMPILE_BASE + 1 ..= PRECOMPILE_BASE + 12`.
pub const PRECOMPILE_BASE: u64 = 0x800;

// === Precision ===

/// Decimals of the withdrawable perp balance and vault equity.
pub const PERP_USD_DECIMALS: u8 = 6;

pub const HYPE_SZ_DECIMALS: u8 = 2;
pub const HYPE_WEI_DECIMALS: u8 = 8;
pub const HYPE_EVM_EXTRA_WEI_DECIMALS: i8 = 10;

// === CoreWriter ===

/// Only version of the raw action encoding.
pub const CORE_WRITER_ENCODING_VERSION: u8 = 1;

pub const VAULT_TRANSFER_ACTION_ID: u32 = 2;
pub const SPOT_SEND_ACTION_ID: u32 = 6;
pub const USD_CLASS_TRANSFER_ACTION_ID: u32 = 7;
