use ethereum_types::{Address, U256};
use hypercore_common::types::{Action, BridgeConfig, TokenId};
use hypercore_storage::LedgerStore;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{error::BridgeError, queue::ActionQueue};

/// What the gateway did with an EVM side transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "routing", content = "sequence")]
pub enum Routing {
    /// The receiver is not a system address.
    NotBridged,
    /// A deposit was queued with this sequence number.
    Queued(u64),
    /// Sent to a system address that does not accept this asset. The value stays there.
    Unroutable,
}

/// Turns EVM side transfers into system addresses into queued deposits.
///
/// Only reads the ledger; balances change when the queued deposit is applied.
#[derive(Debug, Clone, Copy)]
pub struct BridgeGateway<'a> {
    store: &'a LedgerStore,
    config: &'a BridgeConfig,
}

impl<'a> BridgeGateway<'a> {
    pub fn new(store: &'a LedgerStore, config: &'a BridgeConfig) -> Self {
        Self { store, config }
    }

    /// Routes a transfer of `amount` of the spot token contract `contract`.
    pub fn route_token_transfer(
        &self,
        queue: &mut ActionQueue,
        contract: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Routing, BridgeError> {
        let Some(system_token) = self.config.system_token(to) else {
            return Ok(Routing::NotBridged);
        };

        match self.linked_token(contract)? {
            Some(token) if token == system_token => {
                Ok(self.queue_deposit(queue, from, token, amount))
            }
            linked => {
                warn!(
                    contract = %format!("{contract:#x}"),
                    to = %format!("{to:#x}"),
                    linked_token = ?linked,
                    system_token,
                    "Token transfer to a system address of another token, value is not bridged"
                );
                Ok(Routing::Unroutable)
            }
        }
    }

    /// Routes a native value transfer.
    pub fn route_native_transfer(
        &self,
        queue: &mut ActionQueue,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Routing, BridgeError> {
        if to == self.config.native_system_address {
            return Ok(self.queue_deposit(queue, from, self.config.native_token, amount));
        }
        if let Some(system_token) = self.config.system_token(to) {
            warn!(
                to = %format!("{to:#x}"),
                system_token,
                "Native transfer to a token system address, value is not bridged"
            );
            return Ok(Routing::Unroutable);
        }
        Ok(Routing::NotBridged)
    }

    /// Registered token linked to `contract`, if any.
    fn linked_token(&self, contract: Address) -> Result<Option<TokenId>, BridgeError> {
        if contract.is_zero() {
            return Ok(None);
        }
        for token in self.store.token_ids()? {
            if let Some(info) = self.store.get_token_info(token)? {
                if info.evm_contract == contract {
                    return Ok(Some(token));
                }
            }
        }
        Ok(None)
    }

    fn queue_deposit(
        &self,
        queue: &mut ActionQueue,
        account: Address,
        token: TokenId,
        amount: U256,
    ) -> Routing {
        let sequence = queue.enqueue(Action::Deposit {
            account,
            token,
            amount,
        });
        debug!(
            sequence,
            token,
            account = %format!("{account:#x}"),
            %amount,
            "Queued deposit"
        );
        Routing::Queued(sequence)
    }
}
