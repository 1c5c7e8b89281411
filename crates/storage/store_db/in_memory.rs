use crate::{api::LedgerEngine, error::StoreError};
use ethereum_types::Address;
use hypercore_common::types::{LedgerUpdate, SpotBalance, TokenId, TokenInfo, UserVaultEquity};
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::trace;

#[derive(Default, Clone, Debug)]
pub struct Store(Arc<Mutex<StoreInner>>);

#[derive(Default, Debug)]
struct StoreInner {
    accounts: FxHashSet<Address>,
    spot_balances: FxHashMap<(Address, TokenId), SpotBalance>,
    withdrawable: FxHashMap<Address, u64>,
    // Keyed by (account, vault)
    vault_equity: FxHashMap<(Address, Address), UserVaultEquity>,
    tokens: FxHashMap<TokenId, TokenInfo>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.0.lock().map_err(|_| StoreError::LockError)
    }
}

impl LedgerEngine for Store {
    fn apply_update(&self, update: LedgerUpdate) -> Result<(), StoreError> {
        let mut store = self.inner()?;
        trace!(
            accounts = update.created_accounts.len(),
            spot = update.spot_balances.len(),
            perp = update.withdrawable.len(),
            vaults = update.vault_equity.len(),
            tokens = update.tokens.len(),
            "Applying ledger update"
        );

        store.accounts.extend(update.created_accounts);
        store.spot_balances.extend(update.spot_balances);
        store.withdrawable.extend(update.withdrawable);
        store.vault_equity.extend(update.vault_equity);
        store.tokens.extend(update.tokens);
        Ok(())
    }

    fn account_exists(&self, account: Address) -> Result<bool, StoreError> {
        Ok(self.inner()?.accounts.contains(&account))
    }

    fn get_spot_balance(
        &self,
        account: Address,
        token: TokenId,
    ) -> Result<Option<SpotBalance>, StoreError> {
        Ok(self.inner()?.spot_balances.get(&(account, token)).copied())
    }

    fn get_withdrawable(&self, account: Address) -> Result<Option<u64>, StoreError> {
        Ok(self.inner()?.withdrawable.get(&account).copied())
    }

    fn get_vault_equity(
        &self,
        account: Address,
        vault: Address,
    ) -> Result<Option<UserVaultEquity>, StoreError> {
        Ok(self.inner()?.vault_equity.get(&(account, vault)).copied())
    }

    fn get_token_info(&self, token: TokenId) -> Result<Option<TokenInfo>, StoreError> {
        Ok(self.inner()?.tokens.get(&token).cloned())
    }

    fn get_accounts(&self) -> Result<Vec<Address>, StoreError> {
        let mut accounts: Vec<_> = self.inner()?.accounts.iter().copied().collect();
        accounts.sort();
        Ok(accounts)
    }

    fn get_token_ids(&self) -> Result<Vec<TokenId>, StoreError> {
        let mut tokens: Vec<_> = self.inner()?.tokens.keys().copied().collect();
        tokens.sort();
        Ok(tokens)
    }

    fn get_spot_balances(
        &self,
        account: Address,
    ) -> Result<Vec<(TokenId, SpotBalance)>, StoreError> {
        let mut balances: Vec<_> = self
            .inner()?
            .spot_balances
            .iter()
            .filter(|((holder, _), _)| *holder == account)
            .map(|((_, token), balance)| (*token, *balance))
            .collect();
        balances.sort_by_key(|(token, _)| *token);
        Ok(balances)
    }

    fn get_vault_equities(
        &self,
        account: Address,
    ) -> Result<Vec<(Address, UserVaultEquity)>, StoreError> {
        let mut equities: Vec<_> = self
            .inner()?
            .vault_equity
            .iter()
            .filter(|((holder, _), _)| *holder == account)
            .map(|((_, vault), equity)| (*vault, *equity))
            .collect();
        equities.sort_by_key(|(vault, _)| *vault);
        Ok(equities)
    }
}
