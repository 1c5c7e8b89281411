//! # Ledger engine API
//!
//! Minimal set of operations a ledger backend must provide. Business rules (default values,
//! registry checks, balance invariants) live in [`LedgerStore`](crate::LedgerStore); engines
//! only store and return slots.
//!
//! Writes go through [`LedgerEngine::apply_update`], which must commit the whole
//! [`LedgerUpdate`] or nothing.

use crate::error::StoreError;
use ethereum_types::Address;
use hypercore_common::types::{LedgerUpdate, SpotBalance, TokenId, TokenInfo, UserVaultEquity};
use std::fmt::Debug;

pub trait LedgerEngine: Debug + Send + Sync {
    /// Commits every write of `update` atomically.
    fn apply_update(&self, update: LedgerUpdate) -> Result<(), StoreError>;

    fn account_exists(&self, account: Address) -> Result<bool, StoreError>;

    fn get_spot_balance(
        &self,
        account: Address,
        token: TokenId,
    ) -> Result<Option<SpotBalance>, StoreError>;

    fn get_withdrawable(&self, account: Address) -> Result<Option<u64>, StoreError>;

    fn get_vault_equity(
        &self,
        account: Address,
        vault: Address,
    ) -> Result<Option<UserVaultEquity>, StoreError>;

    fn get_token_info(&self, token: TokenId) -> Result<Option<TokenInfo>, StoreError>;

    /// Created accounts, sorted.
    fn get_accounts(&self) -> Result<Vec<Address>, StoreError>;

    /// Registered token ids, sorted.
    fn get_token_ids(&self) -> Result<Vec<TokenId>, StoreError>;

    /// Every spot balance slot of `account`, sorted by token.
    fn get_spot_balances(&self, account: Address)
    -> Result<Vec<(TokenId, SpotBalance)>, StoreError>;

    /// Every vault equity slot of `account`, sorted by vault.
    fn get_vault_equities(
        &self,
        account: Address,
    ) -> Result<Vec<(Address, UserVaultEquity)>, StoreError>;
}
