use crate::{
    Address,
    types::{SpotBalance, TokenId, TokenInfo, UserVaultEquity},
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Set of ledger writes committed together. Either every entry is written or none is.
///
/// Entries hold the final value of each slot, not a delta.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct LedgerUpdate {
    pub created_accounts: FxHashSet<Address>,
    pub spot_balances: FxHashMap<(Address, TokenId), SpotBalance>,
    pub withdrawable: FxHashMap<Address, u64>,
    pub vault_equity: FxHashMap<(Address, Address), UserVaultEquity>,
    pub tokens: FxHashMap<TokenId, TokenInfo>,
}

impl LedgerUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_account(mut self, account: Address) -> Self {
        self.created_accounts.insert(account);
        self
    }

    pub fn set_spot_balance(mut self, account: Address, token: TokenId, balance: SpotBalance) -> Self {
        self.spot_balances.insert((account, token), balance);
        self
    }

    pub fn set_withdrawable(mut self, account: Address, amount: u64) -> Self {
        self.withdrawable.insert(account, amount);
        self
    }

    pub fn set_vault_equity(
        mut self,
        account: Address,
        vault: Address,
        equity: UserVaultEquity,
    ) -> Self {
        self.vault_equity.insert((account, vault), equity);
        self
    }

    pub fn set_token(mut self, token: TokenId, info: TokenInfo) -> Self {
        self.tokens.insert(token, info);
        self
    }

    /// Applies `other` on top of `self`. Later writes to the same slot win.
    pub fn merge(&mut self, other: LedgerUpdate) {
        self.created_accounts.extend(other.created_accounts);
        self.spot_balances.extend(other.spot_balances);
        self.withdrawable.extend(other.withdrawable);
        self.vault_equity.extend(other.vault_equity);
        self.tokens.extend(other.tokens);
    }

    pub fn is_empty(&self) -> bool {
        self.created_accounts.is_empty()
            && self.spot_balances.is_empty()
            && self.withdrawable.is_empty()
            && self.vault_equity.is_empty()
            && self.tokens.is_empty()
    }

    /// Accounts touched by the update, other than through the token registry.
    pub fn touched_accounts(&self) -> FxHashSet<Address> {
        let mut accounts = self.created_accounts.clone();
        accounts.extend(self.spot_balances.keys().map(|(account, _)| *account));
        accounts.extend(self.withdrawable.keys().copied());
        accounts.extend(self.vault_equity.keys().map(|(account, _)| *account));
        accounts
    }
}
