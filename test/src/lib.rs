//! Shared fixtures for the integration tests.

use ethereum_types::{Address, U256};
use hypercore_bridge::{BridgeError, HyperCore};
use hypercore_common::{
    constants::{HYPE_TOKEN, SYSTEM_ADDRESS_BASE, USDC_TOKEN},
    types::{Genesis, GenesisAccount, TokenId, TokenInfo},
    utils,
};

pub const KNOWN_TOKEN_HYPE: TokenId = HYPE_TOKEN;

/// Genesis clock of the fixture chain, in milliseconds.
pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

/// Native balance every fixture user starts with, in whole tokens.
pub const INITIAL_NATIVE_BALANCE: u64 = 10_000;

/// `amount * 10^decimals`
pub fn scale(amount: u64, decimals: usize) -> U256 {
    U256::from(amount) * U256::exp10(decimals)
}

/// [`scale`] for amounts that fit ledger balances.
pub fn scale_u64(amount: u64, decimals: u32) -> u64 {
    amount * 10u64.pow(decimals)
}

/// Deposit address of `token`.
pub fn system_address(token: TokenId) -> Address {
    utils::system_address(SYSTEM_ADDRESS_BASE, token)
}

pub fn usdc_info() -> TokenInfo {
    TokenInfo {
        name: "USDC".to_string(),
        sz_decimals: 8,
        wei_decimals: 8,
        ..Default::default()
    }
}

pub struct HyperCoreFixture {
    pub core: HyperCore,
    /// Only `users[0]` has a ledger account.
    pub users: [Address; 3],
    /// Spot token contract of USDC.
    pub usdc: Address,
}

/// Chain with USDC registered as token 0 and deployed, three users holding native
/// balance and a ledger account for the first user only.
pub fn deploy_hypercore_fixture() -> Result<HyperCoreFixture, BridgeError> {
    let users = [
        Address::from_low_u64_be(0xa11ce),
        Address::from_low_u64_be(0xb0b),
        Address::from_low_u64_be(0xca401),
    ];

    let mut genesis = Genesis {
        timestamp: GENESIS_TIMESTAMP,
        ..Default::default()
    };
    for user in users {
        genesis.alloc.insert(
            user,
            GenesisAccount {
                created: false,
                native_balance: scale(INITIAL_NATIVE_BALANCE, 18),
                ..Default::default()
            },
        );
    }

    let mut core = HyperCore::new(&genesis)?;
    core.register_token_info(USDC_TOKEN, usdc_info())?;
    let usdc = core.deploy_spot_erc20(USDC_TOKEN)?;
    core.force_account_creation(users[0])?;

    Ok(HyperCoreFixture { core, users, usdc })
}
