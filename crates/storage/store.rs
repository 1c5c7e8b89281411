use crate::{api::LedgerEngine, error::StoreError, store_db::in_memory::Store as InMemoryStore};
use ethereum_types::Address;
use hypercore_common::types::{
    Genesis, LedgerUpdate, SpotBalance, TokenId, TokenInfo, UserVaultEquity,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Debug, sync::Arc};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    InMemory,
}

/// Ledger state of a simulated chain: spot balances, withdrawable perp balances, vault
/// equity and the token registry.
///
/// Reads of missing slots return zero values. Every write goes through a [`LedgerUpdate`]
/// and is checked before being committed, so a rejected write leaves the ledger untouched.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    engine: Arc<dyn LedgerEngine>,
}

impl LedgerStore {
    pub fn new(engine_type: EngineType) -> Self {
        let engine: Arc<dyn LedgerEngine> = match engine_type {
            EngineType::InMemory => Arc::new(InMemoryStore::new()),
        };
        Self::from_engine(engine)
    }

    pub fn from_engine(engine: Arc<dyn LedgerEngine>) -> Self {
        Self { engine }
    }

    pub fn new_from_genesis(genesis: &Genesis, engine_type: EngineType) -> Result<Self, StoreError> {
        let store = Self::new(engine_type);
        store.add_initial_state(genesis)?;
        Ok(store)
    }

    /// Registers the genesis tokens and writes the initial balances in a single update.
    pub fn add_initial_state(&self, genesis: &Genesis) -> Result<(), StoreError> {
        let mut update = LedgerUpdate::new();
        for (token, info) in &genesis.tokens {
            if self.engine.get_token_info(*token)?.is_some() {
                return Err(StoreError::TokenAlreadyRegistered(*token));
            }
            info.validate()
                .map_err(|source| StoreError::InvalidTokenInfo {
                    token: *token,
                    source,
                })?;
            update = update.set_token(*token, info.clone());
        }

        for (account, genesis_account) in &genesis.alloc {
            if !genesis_account.created {
                continue;
            }
            update = update
                .create_account(*account)
                .set_withdrawable(*account, genesis_account.perp);
            for (token, total) in &genesis_account.spot {
                update = update.set_spot_balance(*account, *token, SpotBalance::new(*total));
            }
            for (vault, equity) in &genesis_account.vaults {
                update = update.set_vault_equity(*account, *vault, *equity);
            }
        }

        info!(
            tokens = genesis.tokens.len(),
            accounts = update.created_accounts.len(),
            "Loaded genesis ledger state"
        );
        self.apply_update(update)
    }

    // === Reads ===

    pub fn account_exists(&self, account: Address) -> Result<bool, StoreError> {
        self.engine.account_exists(account)
    }

    pub fn read_spot_balance(
        &self,
        account: Address,
        token: TokenId,
    ) -> Result<SpotBalance, StoreError> {
        Ok(self
            .engine
            .get_spot_balance(account, token)?
            .unwrap_or_default())
    }

    pub fn read_withdrawable(&self, account: Address) -> Result<u64, StoreError> {
        Ok(self.engine.get_withdrawable(account)?.unwrap_or_default())
    }

    pub fn read_user_vault_equity(
        &self,
        account: Address,
        vault: Address,
    ) -> Result<UserVaultEquity, StoreError> {
        Ok(self
            .engine
            .get_vault_equity(account, vault)?
            .unwrap_or_default())
    }

    /// Registry entry of `token`, or an all zero entry if it is not registered.
    pub fn read_token_info(&self, token: TokenId) -> Result<TokenInfo, StoreError> {
        Ok(self.get_token_info(token)?.unwrap_or_default())
    }

    pub fn get_token_info(&self, token: TokenId) -> Result<Option<TokenInfo>, StoreError> {
        self.engine.get_token_info(token)
    }

    pub fn token_ids(&self) -> Result<Vec<TokenId>, StoreError> {
        self.engine.get_token_ids()
    }

    // === Registry ===

    pub fn register_token_info(&self, token: TokenId, info: TokenInfo) -> Result<(), StoreError> {
        if self.engine.get_token_info(token)?.is_some() {
            return Err(StoreError::TokenAlreadyRegistered(token));
        }
        info.validate()
            .map_err(|source| StoreError::InvalidTokenInfo { token, source })?;

        info!(token, name = %info.name, "Registered token");
        self.engine
            .apply_update(LedgerUpdate::new().set_token(token, info))
    }

    /// Sets the EVM contract of `token`. Allowed once per token.
    pub fn link_evm_contract(&self, token: TokenId, contract: Address) -> Result<(), StoreError> {
        let mut info = self
            .engine
            .get_token_info(token)?
            .ok_or(StoreError::TokenNotRegistered(token))?;
        if info.is_linked() {
            return Err(StoreError::EvmContractAlreadyLinked {
                token,
                contract: info.evm_contract,
            });
        }
        info.evm_contract = contract;

        debug!(token, contract = %format!("{contract:#x}"), "Linked EVM contract");
        self.engine
            .apply_update(LedgerUpdate::new().set_token(token, info))
    }

    // === Direct writes ===

    pub fn force_account_creation(&self, account: Address) -> Result<(), StoreError> {
        self.engine
            .apply_update(LedgerUpdate::new().create_account(account))
    }

    /// Sets the spot total of `account` in `token`, creating the account.
    pub fn force_spot(&self, account: Address, token: TokenId, total: u64) -> Result<(), StoreError> {
        let balance = SpotBalance {
            total,
            ..self.read_spot_balance(account, token)?
        };
        self.apply_update(
            LedgerUpdate::new()
                .create_account(account)
                .set_spot_balance(account, token, balance),
        )
    }

    /// Sets the withdrawable balance of `account`, creating the account.
    pub fn force_perp(&self, account: Address, amount: u64) -> Result<(), StoreError> {
        self.apply_update(
            LedgerUpdate::new()
                .create_account(account)
                .set_withdrawable(account, amount),
        )
    }

    /// Sets the equity record of `account` in `vault`, creating the account.
    pub fn force_vault_equity(
        &self,
        account: Address,
        vault: Address,
        equity: u64,
        locked_until_timestamp: u64,
    ) -> Result<(), StoreError> {
        self.apply_update(
            LedgerUpdate::new().create_account(account).set_vault_equity(
                account,
                vault,
                UserVaultEquity {
                    equity,
                    locked_until_timestamp,
                },
            ),
        )
    }

    /// Checks `update` against the ledger invariants and commits it.
    pub fn apply_update(&self, update: LedgerUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }
        for ((account, token), balance) in &update.spot_balances {
            if !balance.is_valid() {
                return Err(StoreError::InvalidBalance {
                    account: *account,
                    token: *token,
                });
            }
            if !update.tokens.contains_key(token) && self.engine.get_token_info(*token)?.is_none()
            {
                return Err(StoreError::TokenNotRegistered(*token));
            }
        }
        self.engine.apply_update(update)
    }

    /// Full dump of the ledger, sorted by token and account.
    pub fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        let mut tokens = BTreeMap::new();
        for token in self.engine.get_token_ids()? {
            if let Some(info) = self.engine.get_token_info(token)? {
                tokens.insert(token, info);
            }
        }

        let mut accounts = BTreeMap::new();
        for account in self.engine.get_accounts()? {
            let snapshot = AccountSnapshot {
                spot: self.engine.get_spot_balances(account)?.into_iter().collect(),
                withdrawable: self.read_withdrawable(account)?,
                vaults: self.engine.get_vault_equities(account)?.into_iter().collect(),
            };
            accounts.insert(account, snapshot);
        }

        Ok(LedgerSnapshot { tokens, accounts })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub tokens: BTreeMap<TokenId, TokenInfo>,
    pub accounts: BTreeMap<Address, AccountSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    pub spot: BTreeMap<TokenId, SpotBalance>,
    pub withdrawable: u64,
    pub vaults: BTreeMap<Address, UserVaultEquity>,
}

impl LedgerSnapshot {
    /// Sum of spot totals of `token` over every account.
    pub fn total_supply(&self, token: TokenId) -> u128 {
        self.accounts
            .values()
            .filter_map(|account| account.spot.get(&token))
            .map(|balance| u128::from(balance.total))
            .sum()
    }
}
