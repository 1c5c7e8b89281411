//! EVM side of the bridge.
//!
//! The ledger only needs a handful of operations from the execution environment: moving
//! native value, moving spot token balances and deploying the spot token contract of a
//! ledger token. [`EvmState`] implements them over plain balance maps.

use std::fmt::Debug;

use ethereum_types::{Address, H256, U256};
use hypercore_common::{
    constants::SPOT_ERC20_DEPLOYER,
    types::{TokenId, TokenInfo},
};
use keccak_hash::keccak;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum EvmError {
    #[error("Insufficient balance for {account:#x}: needs {needed}, has {available}")]
    InsufficientBalance {
        account: Address,
        needed: U256,
        available: U256,
    },
    #[error("Balance overflow for {0:#x}")]
    BalanceOverflow(Address),
    #[error("No contract deployed at {0:#x}")]
    UnknownContract(Address),
    #[error("A contract is already deployed at {0:#x}")]
    ContractAlreadyDeployed(Address),
    #[error("Token decimals {0} do not fit a spot token contract")]
    InvalidDecimals(i16),
}

/// Value held on the EVM side: native balance or a spot token contract balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmAsset {
    Native,
    SpotErc20(Address),
}

/// Mock spot token contract standing in for a bridged ledger token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotErc20 {
    pub token: TokenId,
    pub name: String,
    pub decimals: u8,
    pub total_supply: U256,
    balances: FxHashMap<Address, U256>,
}

impl SpotErc20 {
    pub fn new(token: TokenId, info: &TokenInfo) -> Result<Self, EvmError> {
        let decimals = info.evm_decimals();
        Ok(Self {
            token,
            name: info.name.clone(),
            decimals: u8::try_from(decimals).map_err(|_| EvmError::InvalidDecimals(decimals))?,
            total_supply: U256::zero(),
            balances: FxHashMap::default(),
        })
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn mint(&mut self, to: Address, amount: U256) -> Result<(), EvmError> {
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(EvmError::BalanceOverflow(to))?;
        let total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(EvmError::BalanceOverflow(to))?;
        self.balances.insert(to, balance);
        self.total_supply = total_supply;
        Ok(())
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), EvmError> {
        let available = self.balance_of(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(EvmError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(EvmError::BalanceOverflow(to))?;
        self.balances.insert(from, remaining);
        self.balances.insert(to, credited);
        Ok(())
    }
}

/// Operations the bridge performs on the EVM side. Failing calls revert: they leave the
/// state untouched.
pub trait EvmBackend: Debug + Send + Sync {
    fn native_balance(&self, account: Address) -> U256;

    fn set_native_balance(&mut self, account: Address, balance: U256);

    fn transfer_native(&mut self, from: Address, to: Address, amount: U256)
    -> Result<(), EvmError>;

    /// Deploys the spot token contract of `token` and returns its address.
    fn deploy_spot_erc20(&mut self, token: TokenId, info: &TokenInfo) -> Result<Address, EvmError>;

    /// Installs a spot token contract at a fixed address, as done for linked genesis tokens.
    fn install_spot_erc20(
        &mut self,
        address: Address,
        token: TokenId,
        info: &TokenInfo,
    ) -> Result<(), EvmError>;

    fn spot_erc20(&self, address: Address) -> Option<&SpotErc20>;

    fn mint(&mut self, contract: Address, to: Address, amount: U256) -> Result<(), EvmError>;

    fn transfer_token(
        &mut self,
        contract: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EvmError>;

    fn token_balance(&self, contract: Address, account: Address) -> Result<U256, EvmError> {
        self.spot_erc20(contract)
            .map(|erc20| erc20.balance_of(account))
            .ok_or(EvmError::UnknownContract(contract))
    }

    fn asset_balance(&self, asset: EvmAsset, account: Address) -> Result<U256, EvmError> {
        match asset {
            EvmAsset::Native => Ok(self.native_balance(account)),
            EvmAsset::SpotErc20(contract) => self.token_balance(contract, account),
        }
    }

    /// Checks that [`EvmBackend::release`] with the same arguments would succeed, without
    /// changing any state.
    fn check_release(
        &self,
        asset: EvmAsset,
        system_address: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EvmError> {
        let held = self.asset_balance(asset, system_address)?;
        if let EvmAsset::SpotErc20(contract) = asset {
            let erc20 = self
                .spot_erc20(contract)
                .ok_or(EvmError::UnknownContract(contract))?;
            erc20
                .total_supply
                .checked_add(amount.saturating_sub(held))
                .ok_or(EvmError::BalanceOverflow(system_address))?;
        }
        if to != system_address {
            self.asset_balance(asset, to)?
                .checked_add(amount)
                .ok_or(EvmError::BalanceOverflow(to))?;
        }
        Ok(())
    }

    /// Pays `amount` of `asset` from a system address to `to`, minting whatever the system
    /// address is missing.
    fn release(
        &mut self,
        asset: EvmAsset,
        system_address: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EvmError> {
        let held = self.asset_balance(asset, system_address)?;
        if held < amount {
            let shortfall = amount - held;
            match asset {
                EvmAsset::Native => self.set_native_balance(system_address, amount),
                EvmAsset::SpotErc20(contract) => self.mint(contract, system_address, shortfall)?,
            }
            debug!(
                system_address = %format!("{system_address:#x}"),
                %shortfall,
                "Minted shortfall on system address"
            );
        }
        match asset {
            EvmAsset::Native => self.transfer_native(system_address, to, amount),
            EvmAsset::SpotErc20(contract) => {
                self.transfer_token(contract, system_address, to, amount)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvmState {
    native: FxHashMap<Address, U256>,
    contracts: FxHashMap<Address, SpotErc20>,
}

impl EvmState {
    pub fn new() -> Self {
        Self::default()
    }

    fn contract_mut(&mut self, address: Address) -> Result<&mut SpotErc20, EvmError> {
        self.contracts
            .get_mut(&address)
            .ok_or(EvmError::UnknownContract(address))
    }
}

/// Address of the spot token contract of `token`:
/// `keccak256(0xff ++ deployer ++ salt ++ keccak256("SpotERC20"))[12..]`, with the token id
/// as salt.
pub fn spot_erc20_address(token: TokenId) -> Address {
    let salt = H256::from(U256::from(token).to_big_endian());
    let init_code_hash = keccak(b"SpotERC20");

    let mut preimage = Vec::with_capacity(1 + 20 + 32 + 32);
    preimage.push(0xff);
    preimage.extend_from_slice(SPOT_ERC20_DEPLOYER.as_bytes());
    preimage.extend_from_slice(salt.as_bytes());
    preimage.extend_from_slice(init_code_hash.as_bytes());

    Address::from_slice(&keccak(&preimage).as_bytes()[12..])
}

impl EvmBackend for EvmState {
    fn native_balance(&self, account: Address) -> U256 {
        self.native.get(&account).copied().unwrap_or_default()
    }

    fn set_native_balance(&mut self, account: Address, balance: U256) {
        self.native.insert(account, balance);
    }

    fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EvmError> {
        let available = self.native_balance(from);
        let remaining = available
            .checked_sub(amount)
            .ok_or(EvmError::InsufficientBalance {
                account: from,
                needed: amount,
                available,
            })?;
        if from == to {
            return Ok(());
        }
        let credited = self
            .native_balance(to)
            .checked_add(amount)
            .ok_or(EvmError::BalanceOverflow(to))?;
        self.native.insert(from, remaining);
        self.native.insert(to, credited);
        Ok(())
    }

    fn deploy_spot_erc20(&mut self, token: TokenId, info: &TokenInfo) -> Result<Address, EvmError> {
        let address = spot_erc20_address(token);
        self.install_spot_erc20(address, token, info)?;
        info!(
            token,
            name = %info.name,
            address = %format!("{address:#x}"),
            "Deployed spot token contract"
        );
        Ok(address)
    }

    fn install_spot_erc20(
        &mut self,
        address: Address,
        token: TokenId,
        info: &TokenInfo,
    ) -> Result<(), EvmError> {
        if self.contracts.contains_key(&address) {
            return Err(EvmError::ContractAlreadyDeployed(address));
        }
        self.contracts.insert(address, SpotErc20::new(token, info)?);
        Ok(())
    }

    fn spot_erc20(&self, address: Address) -> Option<&SpotErc20> {
        self.contracts.get(&address)
    }

    fn mint(&mut self, contract: Address, to: Address, amount: U256) -> Result<(), EvmError> {
        self.contract_mut(contract)?.mint(to, amount)
    }

    fn transfer_token(
        &mut self,
        contract: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EvmError> {
        self.contract_mut(contract)?.transfer(from, to, amount)
    }
}
