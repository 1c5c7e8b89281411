use ethereum_types::Address;
use hypercore_abi::{AbiDecodeError, AbiEncodeError};
use hypercore_common::types::{ActionDecodeError, GenesisError, TokenId};
use hypercore_storage::error::StoreError;

use crate::{evm::EvmError, precompiles::PrecompileError};

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("DB error: {0}")]
    Store(#[from] StoreError),
    #[error("EVM error: {0}")]
    Evm(#[from] EvmError),
    #[error("Precompile error: {0}")]
    Precompile(#[from] PrecompileError),
    #[error("Invalid raw action: {0}")]
    ActionDecode(#[from] ActionDecodeError),
    #[error("ABI decode error: {0}")]
    AbiDecode(#[from] AbiDecodeError),
    #[error("ABI encode error: {0}")]
    AbiEncode(#[from] AbiEncodeError),
    #[error("Invalid genesis: {0}")]
    Genesis(#[from] GenesisError),
    #[error("Token {0} is the native token and has no spot token contract")]
    NativeTokenContract(TokenId),
    #[error("Token {token} is not registered")]
    TokenNotRegistered { token: TokenId },
    #[error("{0:#x} is not a system contract")]
    NotASystemContract(Address),
    #[error("Contract {0:#x} is not a spot token contract")]
    NotASpotToken(Address),
    #[error("Timestamp {requested} is before the current timestamp {current}")]
    TimestampInPast { current: u64, requested: u64 },
    #[error("Flush interrupted at action {sequence} after {applied} applied actions: {source}")]
    FlushInterrupted {
        sequence: u64,
        applied: usize,
        source: Box<BridgeError>,
    },
}
