use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    io::{BufReader, Error},
    path::Path,
};
use tracing::warn;

use crate::{
    constants::{
        CORE_WRITER_ADDRESS, HYPE_TOKEN, NATIVE_SYSTEM_ADDRESS, PERP_USD_DECIMALS,
        SYSTEM_ADDRESS_BASE, USDC_TOKEN,
    },
    types::{TokenId, TokenInfo, TokenInfoError, UserVaultEquity},
    utils,
};

/// Initial state of a simulated ledger.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Genesis {
    /// Bridge configuration
    #[serde(default)]
    pub config: BridgeConfig,
    /// Simulator clock in milliseconds
    #[serde(default, with = "crate::serde_utils::u64::hex_or_dec_str")]
    pub timestamp: u64,
    /// Token registry. Must contain the native token.
    #[serde(default)]
    pub tokens: BTreeMap<TokenId, TokenInfo>,
    /// Initial ledger and EVM state of each account
    #[serde(default)]
    pub alloc: BTreeMap<Address, GenesisAccount>,
}

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("Failed to decode genesis file: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Failed to open genesis file: {0}")]
    File(#[from] Error),
    #[error("Native token {0} is not registered")]
    MissingNativeToken(TokenId),
    #[error("Account {account:#x} holds unregistered token {token}")]
    UnknownToken { account: Address, token: TokenId },
    #[error("Invalid token {token}: {source}")]
    InvalidToken {
        token: TokenId,
        source: TokenInfoError,
    },
}

impl TryFrom<&Path> for Genesis {
    type Error = GenesisError;

    fn try_from(genesis_file_path: &Path) -> Result<Self, Self::Error> {
        let genesis_file = std::fs::File::open(genesis_file_path)?;
        let genesis_reader = BufReader::new(genesis_file);
        let genesis: Genesis = serde_json::from_reader(genesis_reader)?;
        genesis.validate()?;
        Ok(genesis)
    }
}

impl Default for Genesis {
    fn default() -> Self {
        let config = BridgeConfig::default();
        let tokens = BTreeMap::from([(config.native_token, TokenInfo::native("HYPE"))]);
        Self {
            config,
            timestamp: 0,
            tokens,
            alloc: BTreeMap::new(),
        }
    }
}

impl Genesis {
    pub fn validate(&self) -> Result<(), GenesisError> {
        if !self.tokens.contains_key(&self.config.native_token) {
            return Err(GenesisError::MissingNativeToken(self.config.native_token));
        }
        for (token, info) in &self.tokens {
            info.validate().map_err(|source| GenesisError::InvalidToken {
                token: *token,
                source,
            })?;
        }
        for (account, genesis_account) in &self.alloc {
            if let Some(token) = genesis_account
                .spot
                .keys()
                .find(|token| !self.tokens.contains_key(token))
            {
                return Err(GenesisError::UnknownToken {
                    account: *account,
                    token: *token,
                });
            }
            if !genesis_account.created && genesis_account.has_ledger_state() {
                warn!(
                    account = %format!("{account:#x}"),
                    "Genesis account has ledger balances but is not created, balances are ignored"
                );
            }
        }
        if !self.tokens.contains_key(&self.config.usd_token) {
            warn!(
                token = self.config.usd_token,
                "USD token is not registered at genesis, class transfers will be dropped until it is"
            );
        }
        Ok(())
    }
}

/// Initial state of a single account.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenesisAccount {
    /// Whether the ledger account exists. Uncreated accounts only get their EVM balance.
    #[serde(default = "default_created")]
    pub created: bool,
    /// Spot totals in ledger wei
    #[serde(default)]
    pub spot: BTreeMap<TokenId, u64>,
    /// Withdrawable perp balance
    #[serde(default)]
    pub perp: u64,
    #[serde(default)]
    pub vaults: BTreeMap<Address, UserVaultEquity>,
    /// Native EVM balance
    #[serde(default, with = "crate::serde_utils::u256::hex_or_dec_str")]
    pub native_balance: U256,
}

fn default_created() -> bool {
    true
}

impl Default for GenesisAccount {
    fn default() -> Self {
        Self {
            created: true,
            spot: BTreeMap::new(),
            perp: 0,
            vaults: BTreeMap::new(),
            native_balance: U256::zero(),
        }
    }
}

impl GenesisAccount {
    fn has_ledger_state(&self) -> bool {
        self.spot.values().any(|total| *total > 0)
            || self.perp > 0
            || self.vaults.values().any(|vault| vault.equity > 0)
    }
}

/// Bridge wide settings
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeConfig {
    /// Token credited for native value sent to `native_system_address`
    pub native_token: TokenId,
    /// Token on the spot side of USD class transfers
    pub usd_token: TokenId,
    pub perp_usd_decimals: u8,
    /// Lock applied to vault equity on deposit
    pub vault_deposit_lockup_ms: u64,
    pub native_system_address: Address,
    pub system_address_base: Address,
    pub core_writer_address: Address,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            native_token: HYPE_TOKEN,
            usd_token: USDC_TOKEN,
            perp_usd_decimals: PERP_USD_DECIMALS,
            vault_deposit_lockup_ms: 0,
            native_system_address: NATIVE_SYSTEM_ADDRESS,
            system_address_base: SYSTEM_ADDRESS_BASE,
            core_writer_address: CORE_WRITER_ADDRESS,
        }
    }
}

impl BridgeConfig {
    /// Address a token is deposited to and withdrawn from.
    pub fn system_address(&self, token: TokenId) -> Address {
        if token == self.native_token {
            self.native_system_address
        } else {
            utils::system_address(self.system_address_base, token)
        }
    }

    /// Token whose system address is `address`, if any.
    pub fn system_token(&self, address: Address) -> Option<TokenId> {
        if address == self.native_system_address {
            return Some(self.native_token);
        }
        utils::token_for_system_address(self.system_address_base, address)
            .filter(|token| *token != self.native_token)
    }
}
