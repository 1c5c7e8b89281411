use ethereum_types::Address;
use hypercore_common::types::{TokenId, TokenInfoError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Token {0} is already registered")]
    TokenAlreadyRegistered(TokenId),
    #[error("Token {0} is not registered")]
    TokenNotRegistered(TokenId),
    #[error("Token {token} is already linked to {contract:#x}")]
    EvmContractAlreadyLinked { token: TokenId, contract: Address },
    #[error("Invalid token info for token {token}: {source}")]
    InvalidTokenInfo {
        token: TokenId,
        source: TokenInfoError,
    },
    #[error("Spot balance of {account:#x} in token {token} would break total >= hold")]
    InvalidBalance { account: Address, token: TokenId },
    #[error("Failed to lock ledger")]
    LockError,
    #[error("{0}")]
    Custom(String),
}
