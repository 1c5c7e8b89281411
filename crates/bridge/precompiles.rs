//! Read-only precompile bank.
//!
//! Each reserved address answers one ledger query. Calldata is `abi.encode(args)` and the
//! output is `abi.encode(result)`. Queries read the ledger directly, so they see the state
//! as of the last flush. Unknown accounts and tokens read as zero values.

use bytes::Bytes;
use ethereum_types::{Address, H160};
use hypercore_abi::{
    AbiDecodeError, AbiEncode, AbiEncodeError, Encoder, FromAbiValue, ParamType, Value,
    decode_tuple, encode_tuple,
};
use hypercore_common::types::{SpotBalance, TokenInfo, UserVaultEquity};
use hypercore_storage::{LedgerStore, error::StoreError};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum PrecompileError {
    #[error("{0:#x} is not a read precompile")]
    NotAPrecompile(Address),
    #[error("Invalid calldata for {precompile}: {source}")]
    InvalidCalldata {
        precompile: &'static str,
        source: AbiDecodeError,
    },
    #[error("Failed to encode precompile output: {0}")]
    Encode(#[from] AbiEncodeError),
    #[error("DB error: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPrecompile {
    SpotBalance,
    UserVaultEquity,
    Withdrawable,
    Delegations,
    DelegatorSummary,
    MarkPx,
    OraclePx,
    SpotPx,
    L1BlockNumber,
    PerpAssetInfo,
    SpotInfo,
    TokenInfo,
}

#[derive(Debug, Clone, Copy)]
pub struct Precompile {
    pub address: H160,
    pub name: &'static str,
    pub kind: ReadPrecompile,
}

const fn precompile_address(index: u8) -> H160 {
    let mut address = [0u8; 20];
    address[18] = 0x08;
    address[19] = index;
    H160(address)
}

pub const SPOT_BALANCE: Precompile = Precompile {
    address: precompile_address(0x01),
    name: "SPOT_BALANCE",
    kind: ReadPrecompile::SpotBalance,
};

pub const USER_VAULT_EQUITY: Precompile = Precompile {
    address: precompile_address(0x02),
    name: "USER_VAULT_EQUITY",
    kind: ReadPrecompile::UserVaultEquity,
};

pub const WITHDRAWABLE: Precompile = Precompile {
    address: precompile_address(0x03),
    name: "WITHDRAWABLE",
    kind: ReadPrecompile::Withdrawable,
};

pub const DELEGATIONS: Precompile = Precompile {
    address: precompile_address(0x04),
    name: "DELEGATIONS",
    kind: ReadPrecompile::Delegations,
};

pub const DELEGATOR_SUMMARY: Precompile = Precompile {
    address: precompile_address(0x05),
    name: "DELEGATOR_SUMMARY",
    kind: ReadPrecompile::DelegatorSummary,
};

pub const MARK_PX: Precompile = Precompile {
    address: precompile_address(0x06),
    name: "MARK_PX",
    kind: ReadPrecompile::MarkPx,
};

pub const ORACLE_PX: Precompile = Precompile {
    address: precompile_address(0x07),
    name: "ORACLE_PX",
    kind: ReadPrecompile::OraclePx,
};

pub const SPOT_PX: Precompile = Precompile {
    address: precompile_address(0x08),
    name: "SPOT_PX",
    kind: ReadPrecompile::SpotPx,
};

pub const L1_BLOCK_NUMBER: Precompile = Precompile {
    address: precompile_address(0x09),
    name: "L1_BLOCK_NUMBER",
    kind: ReadPrecompile::L1BlockNumber,
};

pub const PERP_ASSET_INFO: Precompile = Precompile {
    address: precompile_address(0x0a),
    name: "PERP_ASSET_INFO",
    kind: ReadPrecompile::PerpAssetInfo,
};

pub const SPOT_INFO: Precompile = Precompile {
    address: precompile_address(0x0b),
    name: "SPOT_INFO",
    kind: ReadPrecompile::SpotInfo,
};

pub const TOKEN_INFO: Precompile = Precompile {
    address: precompile_address(0x0c),
    name: "TOKEN_INFO",
    kind: ReadPrecompile::TokenInfo,
};

pub const PRECOMPILES: [Precompile; 12] = [
    SPOT_BALANCE,
    USER_VAULT_EQUITY,
    WITHDRAWABLE,
    DELEGATIONS,
    DELEGATOR_SUMMARY,
    MARK_PX,
    ORACLE_PX,
    SPOT_PX,
    L1_BLOCK_NUMBER,
    PERP_ASSET_INFO,
    SPOT_INFO,
    TOKEN_INFO,
];

pub fn is_precompile(address: &Address) -> bool {
    ReadPrecompile::from_address(*address).is_some()
}

impl ReadPrecompile {
    pub fn from_address(address: Address) -> Option<Self> {
        PRECOMPILES
            .iter()
            .find(|precompile| precompile.address == address)
            .map(|precompile| precompile.kind)
    }

    fn entry(self) -> Precompile {
        // Table order follows the enum
        PRECOMPILES[self as usize]
    }

    pub fn address(self) -> Address {
        self.entry().address
    }

    pub fn name(self) -> &'static str {
        self.entry().name
    }

    fn input_types(self) -> Vec<ParamType> {
        match self {
            ReadPrecompile::SpotBalance => vec![ParamType::Address, ParamType::Uint(64)],
            ReadPrecompile::UserVaultEquity => vec![ParamType::Address, ParamType::Address],
            ReadPrecompile::Withdrawable
            | ReadPrecompile::Delegations
            | ReadPrecompile::DelegatorSummary => vec![ParamType::Address],
            ReadPrecompile::MarkPx
            | ReadPrecompile::OraclePx
            | ReadPrecompile::SpotPx
            | ReadPrecompile::PerpAssetInfo
            | ReadPrecompile::SpotInfo
            | ReadPrecompile::TokenInfo => vec![ParamType::Uint(32)],
            ReadPrecompile::L1BlockNumber => vec![],
        }
    }
}

/// Decoded precompile input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecompileQuery {
    SpotBalance { user: Address, token: u64 },
    UserVaultEquity { user: Address, vault: Address },
    Withdrawable { user: Address },
    Delegations { user: Address },
    DelegatorSummary { user: Address },
    MarkPx { index: u32 },
    OraclePx { index: u32 },
    SpotPx { index: u32 },
    L1BlockNumber,
    PerpAssetInfo { perp: u32 },
    SpotInfo { spot: u32 },
    TokenInfo { token: u32 },
}

impl PrecompileQuery {
    pub fn precompile(&self) -> ReadPrecompile {
        match self {
            PrecompileQuery::SpotBalance { .. } => ReadPrecompile::SpotBalance,
            PrecompileQuery::UserVaultEquity { .. } => ReadPrecompile::UserVaultEquity,
            PrecompileQuery::Withdrawable { .. } => ReadPrecompile::Withdrawable,
            PrecompileQuery::Delegations { .. } => ReadPrecompile::Delegations,
            PrecompileQuery::DelegatorSummary { .. } => ReadPrecompile::DelegatorSummary,
            PrecompileQuery::MarkPx { .. } => ReadPrecompile::MarkPx,
            PrecompileQuery::OraclePx { .. } => ReadPrecompile::OraclePx,
            PrecompileQuery::SpotPx { .. } => ReadPrecompile::SpotPx,
            PrecompileQuery::L1BlockNumber => ReadPrecompile::L1BlockNumber,
            PrecompileQuery::PerpAssetInfo { .. } => ReadPrecompile::PerpAssetInfo,
            PrecompileQuery::SpotInfo { .. } => ReadPrecompile::SpotInfo,
            PrecompileQuery::TokenInfo { .. } => ReadPrecompile::TokenInfo,
        }
    }

    pub fn decode(precompile: ReadPrecompile, calldata: &[u8]) -> Result<Self, AbiDecodeError> {
        let mut args = decode_tuple(&precompile.input_types(), calldata)?.into_iter();
        let mut next = || {
            args.next()
                .ok_or_else(|| AbiDecodeError::malformed_data().with_context("arguments"))
        };

        let query = match precompile {
            ReadPrecompile::SpotBalance => PrecompileQuery::SpotBalance {
                user: next()?.into_address()?,
                token: u64::from_abi_value(next()?)?,
            },
            ReadPrecompile::UserVaultEquity => PrecompileQuery::UserVaultEquity {
                user: next()?.into_address()?,
                vault: next()?.into_address()?,
            },
            ReadPrecompile::Withdrawable => PrecompileQuery::Withdrawable {
                user: next()?.into_address()?,
            },
            ReadPrecompile::Delegations => PrecompileQuery::Delegations {
                user: next()?.into_address()?,
            },
            ReadPrecompile::DelegatorSummary => PrecompileQuery::DelegatorSummary {
                user: next()?.into_address()?,
            },
            ReadPrecompile::MarkPx => PrecompileQuery::MarkPx {
                index: u32::from_abi_value(next()?)?,
            },
            ReadPrecompile::OraclePx => PrecompileQuery::OraclePx {
                index: u32::from_abi_value(next()?)?,
            },
            ReadPrecompile::SpotPx => PrecompileQuery::SpotPx {
                index: u32::from_abi_value(next()?)?,
            },
            ReadPrecompile::L1BlockNumber => PrecompileQuery::L1BlockNumber,
            ReadPrecompile::PerpAssetInfo => PrecompileQuery::PerpAssetInfo {
                perp: u32::from_abi_value(next()?)?,
            },
            ReadPrecompile::SpotInfo => PrecompileQuery::SpotInfo {
                spot: u32::from_abi_value(next()?)?,
            },
            ReadPrecompile::TokenInfo => PrecompileQuery::TokenInfo {
                token: u32::from_abi_value(next()?)?,
            },
        };
        Ok(query)
    }

    /// Calldata for this query.
    pub fn encode(&self) -> Result<Vec<u8>, AbiEncodeError> {
        let args = match *self {
            PrecompileQuery::SpotBalance { user, token } => {
                vec![Value::Address(user), Value::Uint(token.into())]
            }
            PrecompileQuery::UserVaultEquity { user, vault } => {
                vec![Value::Address(user), Value::Address(vault)]
            }
            PrecompileQuery::Withdrawable { user }
            | PrecompileQuery::Delegations { user }
            | PrecompileQuery::DelegatorSummary { user } => vec![Value::Address(user)],
            PrecompileQuery::MarkPx { index }
            | PrecompileQuery::OraclePx { index }
            | PrecompileQuery::SpotPx { index }
            | PrecompileQuery::PerpAssetInfo { perp: index }
            | PrecompileQuery::SpotInfo { spot: index }
            | PrecompileQuery::TokenInfo { token: index } => vec![Value::Uint(index.into())],
            PrecompileQuery::L1BlockNumber => vec![],
        };
        encode_tuple(&args)
    }

    pub fn execute(
        &self,
        store: &LedgerStore,
        l1_block_number: u64,
    ) -> Result<PrecompileResponse, StoreError> {
        let response = match *self {
            PrecompileQuery::SpotBalance { user, token } => {
                PrecompileResponse::SpotBalance(store.read_spot_balance(user, token)?)
            }
            PrecompileQuery::UserVaultEquity { user, vault } => {
                PrecompileResponse::UserVaultEquity(store.read_user_vault_equity(user, vault)?)
            }
            PrecompileQuery::Withdrawable { user } => {
                PrecompileResponse::Withdrawable(store.read_withdrawable(user)?)
            }
            PrecompileQuery::Delegations { .. } => PrecompileResponse::Delegations(Vec::new()),
            PrecompileQuery::DelegatorSummary { .. } => {
                PrecompileResponse::DelegatorSummary(DelegatorSummary::default())
            }
            // No order book or oracle in the simulation
            PrecompileQuery::MarkPx { .. }
            | PrecompileQuery::OraclePx { .. }
            | PrecompileQuery::SpotPx { .. } => PrecompileResponse::Price(0),
            PrecompileQuery::L1BlockNumber => PrecompileResponse::L1BlockNumber(l1_block_number),
            PrecompileQuery::PerpAssetInfo { .. } => {
                PrecompileResponse::PerpAssetInfo(PerpAssetInfo::default())
            }
            PrecompileQuery::SpotInfo { .. } => PrecompileResponse::SpotInfo(SpotInfo::default()),
            PrecompileQuery::TokenInfo { token } => {
                PrecompileResponse::TokenInfo(store.read_token_info(token.into())?)
            }
        };
        Ok(response)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delegation {
    pub validator: Address,
    pub amount: u64,
    pub locked_until_timestamp: u64,
}

impl AbiEncode for Delegation {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.validator)
            .encode_field(&self.amount)
            .encode_field(&self.locked_until_timestamp)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelegatorSummary {
    pub delegated: u64,
    pub undelegated: u64,
    pub total_pending_withdrawal: u64,
    pub n_pending_withdrawals: u64,
}

impl AbiEncode for DelegatorSummary {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.delegated)
            .encode_field(&self.undelegated)
            .encode_field(&self.total_pending_withdrawal)
            .encode_field(&self.n_pending_withdrawals)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerpAssetInfo {
    pub coin: String,
    pub margin_table_id: u32,
    pub sz_decimals: u8,
    pub max_leverage: u8,
    pub only_isolated: bool,
}

impl AbiEncode for PerpAssetInfo {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.coin)
            .encode_field(&self.margin_table_id)
            .encode_field(&self.sz_decimals)
            .encode_field(&self.max_leverage)
            .encode_field(&self.only_isolated)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpotInfo {
    pub name: String,
    pub tokens: [u64; 2],
}

impl AbiEncode for SpotInfo {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.name)
            .encode_field(&self.tokens)
            .finish()
    }
}

/// Precompile output before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecompileResponse {
    SpotBalance(SpotBalance),
    UserVaultEquity(UserVaultEquity),
    Withdrawable(u64),
    Delegations(Vec<Delegation>),
    DelegatorSummary(DelegatorSummary),
    Price(u64),
    L1BlockNumber(u64),
    PerpAssetInfo(PerpAssetInfo),
    SpotInfo(SpotInfo),
    TokenInfo(TokenInfo),
}

impl PrecompileResponse {
    pub fn encode(&self) -> Result<Vec<u8>, AbiEncodeError> {
        match self {
            PrecompileResponse::SpotBalance(balance) => balance.abi_encode(),
            PrecompileResponse::UserVaultEquity(equity) => equity.abi_encode(),
            PrecompileResponse::Withdrawable(value)
            | PrecompileResponse::Price(value)
            | PrecompileResponse::L1BlockNumber(value) => {
                encode_tuple(&[Value::Uint((*value).into())])
            }
            PrecompileResponse::Delegations(delegations) => encode_tuple(&[Value::Array(
                delegations.iter().map(AbiEncode::to_abi_tuple).collect(),
            )]),
            PrecompileResponse::DelegatorSummary(summary) => summary.abi_encode(),
            PrecompileResponse::PerpAssetInfo(info) => info.abi_encode(),
            PrecompileResponse::SpotInfo(info) => info.abi_encode(),
            PrecompileResponse::TokenInfo(info) => info.abi_encode(),
        }
    }
}

/// Runs the read precompile at `address`.
pub fn execute_precompile(
    address: Address,
    calldata: &[u8],
    store: &LedgerStore,
    l1_block_number: u64,
) -> Result<Bytes, PrecompileError> {
    let precompile =
        ReadPrecompile::from_address(address).ok_or(PrecompileError::NotAPrecompile(address))?;
    let query = PrecompileQuery::decode(precompile, calldata).map_err(|source| {
        PrecompileError::InvalidCalldata {
            precompile: precompile.name(),
            source,
        }
    })?;
    debug!(precompile = precompile.name(), ?query, "Executing read precompile");

    let output = query.execute(store, l1_block_number)?.encode()?;
    Ok(Bytes::from(output))
}
