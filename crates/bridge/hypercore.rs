use std::path::Path;

use bytes::Bytes;
use ethereum_types::{Address, U256};
use hypercore_common::types::{
    Action, BridgeConfig, CoreWriterAction, Genesis, SpotBalance, TokenId, TokenInfo,
    UserVaultEquity, WithdrawRequest,
};
use hypercore_storage::{EngineType, LedgerSnapshot, LedgerStore, error::StoreError};
use tracing::{debug, info};

use crate::{
    apply::ApplyContext,
    codec,
    error::BridgeError,
    evm::{EvmBackend, EvmState},
    gateway::{BridgeGateway, Routing},
    precompiles::{execute_precompile, is_precompile},
    queue::{ActionQueue, FlushReport, QueuedAction},
};

/// Output of a call into one of the ledger's system contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCallOutput {
    /// Sequence number of the queued action
    Queued(u64),
    Read(Bytes),
}

/// A simulated chain: the ledger, its pending actions and the EVM side it bridges to.
///
/// Ledger writes submitted from the EVM side are only queued. They take effect, in
/// submission order, on [`HyperCore::flush_action_queue`].
#[derive(Debug)]
pub struct HyperCore {
    config: BridgeConfig,
    store: LedgerStore,
    queue: ActionQueue,
    evm: Box<dyn EvmBackend>,
    /// Milliseconds
    timestamp: u64,
    l1_block_number: u64,
}

impl HyperCore {
    pub fn new(genesis: &Genesis) -> Result<Self, BridgeError> {
        Self::with_evm_backend(genesis, Box::new(EvmState::new()))
    }

    pub fn from_genesis_file(path: &Path) -> Result<Self, BridgeError> {
        let genesis = Genesis::try_from(path)?;
        Self::new(&genesis)
    }

    /// Builds the chain on top of `evm`. Genesis native balances and linked token
    /// contracts are written into it.
    pub fn with_evm_backend(
        genesis: &Genesis,
        mut evm: Box<dyn EvmBackend>,
    ) -> Result<Self, BridgeError> {
        genesis.validate()?;
        let store = LedgerStore::new_from_genesis(genesis, EngineType::InMemory)?;

        for (account, genesis_account) in &genesis.alloc {
            if !genesis_account.native_balance.is_zero() {
                evm.set_native_balance(*account, genesis_account.native_balance);
            }
        }
        for (token, info) in &genesis.tokens {
            if *token != genesis.config.native_token && info.is_linked() {
                evm.install_spot_erc20(info.evm_contract, *token, info)?;
            }
        }

        info!(
            timestamp = genesis.timestamp,
            tokens = genesis.tokens.len(),
            accounts = genesis.alloc.len(),
            "Initialized simulated chain"
        );
        Ok(Self {
            config: genesis.config,
            store,
            queue: ActionQueue::new(),
            evm,
            timestamp: genesis.timestamp,
            l1_block_number: 0,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn evm(&self) -> &dyn EvmBackend {
        self.evm.as_ref()
    }

    pub fn evm_mut(&mut self) -> &mut dyn EvmBackend {
        self.evm.as_mut()
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Number of completed flushes.
    pub fn l1_block_number(&self) -> u64 {
        self.l1_block_number
    }

    pub fn pending_actions(&self) -> impl Iterator<Item = &QueuedAction> {
        self.queue.pending()
    }

    // === Clock ===

    pub fn set_timestamp(&mut self, timestamp: u64) -> Result<(), BridgeError> {
        if timestamp < self.timestamp {
            return Err(BridgeError::TimestampInPast {
                current: self.timestamp,
                requested: timestamp,
            });
        }
        self.timestamp = timestamp;
        Ok(())
    }

    pub fn advance_time(&mut self, millis: u64) -> u64 {
        self.timestamp = self.timestamp.saturating_add(millis);
        self.timestamp
    }

    // === Token registry ===

    pub fn register_token_info(&self, token: TokenId, info: TokenInfo) -> Result<(), BridgeError> {
        Ok(self.store.register_token_info(token, info)?)
    }

    /// Deploys the spot token contract of `token` and links it in the registry.
    pub fn deploy_spot_erc20(&mut self, token: TokenId) -> Result<Address, BridgeError> {
        if token == self.config.native_token {
            return Err(BridgeError::NativeTokenContract(token));
        }
        let info = self
            .store
            .get_token_info(token)?
            .ok_or(BridgeError::TokenNotRegistered { token })?;
        if info.is_linked() {
            return Err(StoreError::EvmContractAlreadyLinked {
                token,
                contract: info.evm_contract,
            }
            .into());
        }

        let address = self.evm.deploy_spot_erc20(token, &info)?;
        self.store.link_evm_contract(token, address)?;
        Ok(address)
    }

    // === Ledger reads ===

    pub fn read_spot_balance(
        &self,
        account: Address,
        token: TokenId,
    ) -> Result<SpotBalance, BridgeError> {
        Ok(self.store.read_spot_balance(account, token)?)
    }

    pub fn read_withdrawable(&self, account: Address) -> Result<u64, BridgeError> {
        Ok(self.store.read_withdrawable(account)?)
    }

    pub fn read_user_vault_equity(
        &self,
        account: Address,
        vault: Address,
    ) -> Result<UserVaultEquity, BridgeError> {
        Ok(self.store.read_user_vault_equity(account, vault)?)
    }

    pub fn read_token_info(&self, token: TokenId) -> Result<TokenInfo, BridgeError> {
        Ok(self.store.read_token_info(token)?)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, BridgeError> {
        Ok(self.store.snapshot()?)
    }

    // === Direct ledger writes, test setup only ===

    pub fn force_account_creation(&self, account: Address) -> Result<(), BridgeError> {
        Ok(self.store.force_account_creation(account)?)
    }

    pub fn force_spot(
        &self,
        account: Address,
        token: TokenId,
        total: u64,
    ) -> Result<(), BridgeError> {
        Ok(self.store.force_spot(account, token, total)?)
    }

    pub fn force_perp(&self, account: Address, amount: u64) -> Result<(), BridgeError> {
        Ok(self.store.force_perp(account, amount)?)
    }

    pub fn force_vault_equity(
        &self,
        account: Address,
        vault: Address,
        equity: u64,
        locked_until_timestamp: u64,
    ) -> Result<(), BridgeError> {
        Ok(self
            .store
            .force_vault_equity(account, vault, equity, locked_until_timestamp)?)
    }

    // === Queued writes ===

    pub fn enqueue(&mut self, action: Action) -> u64 {
        self.queue.enqueue(action)
    }

    pub fn send_spot(&mut self, from: Address, to: Address, token: TokenId, amount: u64) -> u64 {
        self.enqueue(Action::SpotSend {
            from,
            to,
            token,
            amount,
        })
    }

    /// `ntl` is in perp USD units.
    pub fn send_usd_class_transfer(&mut self, account: Address, ntl: u64, to_perp: bool) -> u64 {
        self.enqueue(Action::ClassTransfer {
            account,
            amount: ntl,
            to_perp,
        })
    }

    pub fn send_vault_transfer(
        &mut self,
        account: Address,
        vault: Address,
        usd: u64,
        is_deposit: bool,
    ) -> u64 {
        self.enqueue(Action::VaultTransfer {
            account,
            vault,
            amount: usd,
            is_deposit,
        })
    }

    /// Queues the raw action `raw` sent by `sender` to the write system contract.
    pub fn call_core_writer(&mut self, sender: Address, raw: &[u8]) -> Result<u64, BridgeError> {
        let action = CoreWriterAction::decode(raw)?;
        debug!(sender = %format!("{sender:#x}"), ?action, "CoreWriter call");
        Ok(self.enqueue(action.into_action(sender)))
    }

    /// Applies every queued action and advances the L1 block number.
    pub fn flush_action_queue(&mut self) -> Result<FlushReport, BridgeError> {
        let ctx = ApplyContext {
            config: self.config,
            timestamp: self.timestamp,
        };
        let receipts = self.queue.flush(&self.store, self.evm.as_mut(), &ctx)?;
        self.l1_block_number += 1;

        Ok(FlushReport {
            l1_block_number: self.l1_block_number,
            receipts,
        })
    }

    // === EVM side ===

    pub fn set_native_balance(&mut self, account: Address, balance: U256) {
        self.evm.set_native_balance(account, balance);
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.evm.native_balance(account)
    }

    pub fn token_balance(&self, contract: Address, account: Address) -> Result<U256, BridgeError> {
        Ok(self.evm.token_balance(contract, account)?)
    }

    pub fn mint(&mut self, contract: Address, to: Address, amount: U256) -> Result<(), BridgeError> {
        self.ensure_spot_erc20(contract)?;
        Ok(self.evm.mint(contract, to, amount)?)
    }

    /// Moves spot token contract balance on the EVM side. A transfer into the token's
    /// system address also queues a deposit.
    pub fn transfer_token(
        &mut self,
        contract: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Routing, BridgeError> {
        self.ensure_spot_erc20(contract)?;
        self.evm.transfer_token(contract, from, to, amount)?;
        BridgeGateway::new(&self.store, &self.config).route_token_transfer(
            &mut self.queue,
            contract,
            from,
            to,
            amount,
        )
    }

    /// Moves native value on the EVM side. Value sent to the native system address also
    /// queues a deposit.
    pub fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Routing, BridgeError> {
        self.evm.transfer_native(from, to, amount)?;
        BridgeGateway::new(&self.store, &self.config).route_native_transfer(
            &mut self.queue,
            from,
            to,
            amount,
        )
    }

    /// Calls the system contract at `to` from `sender`. Raw actions sent to the configured
    /// write contract are queued; read precompiles answer straight from the ledger.
    pub fn call(
        &mut self,
        sender: Address,
        to: Address,
        input: &[u8],
    ) -> Result<SystemCallOutput, BridgeError> {
        if to == self.config.core_writer_address {
            self.call_core_writer(sender, input)
                .map(SystemCallOutput::Queued)
        } else if is_precompile(&to) {
            self.call_precompile(to, input).map(SystemCallOutput::Read)
        } else {
            Err(BridgeError::NotASystemContract(to))
        }
    }

    /// Calls the read precompile at `address`.
    pub fn call_precompile(&self, address: Address, calldata: &[u8]) -> Result<Bytes, BridgeError> {
        Ok(execute_precompile(
            address,
            calldata,
            &self.store,
            self.l1_block_number,
        )?)
    }

    // === Codec ===

    pub fn serialize_withdraw_request(request: &WithdrawRequest) -> Result<Bytes, BridgeError> {
        codec::serialize_withdraw_request(request)
    }

    pub fn deserialize_withdraw_request(data: &[u8]) -> Result<WithdrawRequest, BridgeError> {
        codec::deserialize_withdraw_request(data)
    }

    fn ensure_spot_erc20(&self, contract: Address) -> Result<(), BridgeError> {
        match self.evm.spot_erc20(contract) {
            Some(_) => Ok(()),
            None => Err(BridgeError::NotASpotToken(contract)),
        }
    }
}
