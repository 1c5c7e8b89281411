use std::fmt;

use ethereum_types::{Address, U256};
use hypercore_abi::{
    AbiDecodeError, AbiEncodeError, FromAbiValue, ParamType, Value, decode_tuple, encode_tuple,
};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        CORE_WRITER_ENCODING_VERSION, SPOT_SEND_ACTION_ID, USD_CLASS_TRANSFER_ACTION_ID,
        VAULT_TRANSFER_ACTION_ID,
    },
    types::TokenId,
};

/// A write request waiting in the action queue. Applied once, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Ledger to ledger transfer. Sending to the token's system address withdraws to the
    /// EVM side instead.
    SpotSend {
        from: Address,
        to: Address,
        token: TokenId,
        amount: u64,
    },
    /// Moves `amount` perp USD between the USD token spot balance and the withdrawable
    /// balance.
    ClassTransfer {
        account: Address,
        amount: u64,
        to_perp: bool,
    },
    VaultTransfer {
        account: Address,
        vault: Address,
        amount: u64,
        is_deposit: bool,
    },
    /// Value received from the EVM side. `amount` is in EVM units and gets converted to
    /// ledger precision when applied.
    Deposit {
        account: Address,
        token: TokenId,
        amount: U256,
    },
}

impl Action {
    /// Account that submitted the action.
    pub fn account(&self) -> Address {
        match self {
            Action::SpotSend { from, .. } => *from,
            Action::ClassTransfer { account, .. }
            | Action::VaultTransfer { account, .. }
            | Action::Deposit { account, .. } => *account,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::SpotSend { .. } => "spot_send",
            Action::ClassTransfer { .. } => "class_transfer",
            Action::VaultTransfer { .. } => "vault_transfer",
            Action::Deposit { .. } => "deposit",
        }
    }
}

/// Why an action was skipped. A dropped action leaves the ledger untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    AccountNotFound,
    InsufficientBalance,
    UnknownToken,
    /// The token has no EVM contract to withdraw to.
    TokenNotLinked,
    /// Spot send to the system address of a different token.
    SystemAddressMismatch,
    VaultLocked,
    AmountOverflow,
    PrecisionLoss,
    EvmCreditFailed,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            DropReason::AccountNotFound => "account not found",
            DropReason::InsufficientBalance => "insufficient balance",
            DropReason::UnknownToken => "unknown token",
            DropReason::TokenNotLinked => "token not linked to an evm contract",
            DropReason::SystemAddressMismatch => "system address belongs to another token",
            DropReason::VaultLocked => "vault equity is locked",
            DropReason::AmountOverflow => "amount overflow",
            DropReason::PrecisionLoss => "amount not representable without precision loss",
            DropReason::EvmCreditFailed => "evm credit failed",
        };
        f.write_str(reason)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum ActionOutcome {
    Applied,
    Dropped(DropReason),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ActionDecodeError {
    #[error("Raw action is too short")]
    Truncated,
    #[error("Unsupported raw action version {0}")]
    UnsupportedVersion(u8),
    #[error("Unknown action id {0}")]
    UnknownActionId(u32),
    #[error("Invalid action arguments: {0}")]
    Abi(#[from] AbiDecodeError),
}

/// Raw action accepted by the write system contract:
/// `version (1 byte) ++ action id (3 bytes, big endian) ++ abi.encode(args)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CoreWriterAction {
    VaultTransfer {
        vault: Address,
        is_deposit: bool,
        usd: u64,
    },
    SpotSend {
        destination: Address,
        token: TokenId,
        wei: u64,
    },
    UsdClassTransfer {
        ntl: u64,
        to_perp: bool,
    },
}

impl CoreWriterAction {
    pub fn action_id(&self) -> u32 {
        match self {
            CoreWriterAction::VaultTransfer { .. } => VAULT_TRANSFER_ACTION_ID,
            CoreWriterAction::SpotSend { .. } => SPOT_SEND_ACTION_ID,
            CoreWriterAction::UsdClassTransfer { .. } => USD_CLASS_TRANSFER_ACTION_ID,
        }
    }

    fn abi_args(&self) -> Vec<Value> {
        match self {
            CoreWriterAction::VaultTransfer {
                vault,
                is_deposit,
                usd,
            } => vec![
                Value::Address(*vault),
                Value::Bool(*is_deposit),
                Value::Uint(U256::from(*usd)),
            ],
            CoreWriterAction::SpotSend {
                destination,
                token,
                wei,
            } => vec![
                Value::Address(*destination),
                Value::Uint(U256::from(*token)),
                Value::Uint(U256::from(*wei)),
            ],
            CoreWriterAction::UsdClassTransfer { ntl, to_perp } => {
                vec![Value::Uint(U256::from(*ntl)), Value::Bool(*to_perp)]
            }
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, AbiEncodeError> {
        let mut raw = vec![CORE_WRITER_ENCODING_VERSION];
        raw.extend_from_slice(&self.action_id().to_be_bytes()[1..]);
        raw.extend_from_slice(&encode_tuple(&self.abi_args())?);
        Ok(raw)
    }

    pub fn decode(raw: &[u8]) -> Result<Self, ActionDecodeError> {
        let (&version, rest) = raw.split_first().ok_or(ActionDecodeError::Truncated)?;
        if version != CORE_WRITER_ENCODING_VERSION {
            return Err(ActionDecodeError::UnsupportedVersion(version));
        }
        let (id, args) = rest
            .split_at_checked(3)
            .ok_or(ActionDecodeError::Truncated)?;
        let action_id = u32::from_be_bytes([0, id[0], id[1], id[2]]);

        match action_id {
            VAULT_TRANSFER_ACTION_ID => {
                let [vault, is_deposit, usd] = decode_args(
                    &[ParamType::Address, ParamType::Bool, ParamType::Uint(64)],
                    args,
                )?;
                Ok(CoreWriterAction::VaultTransfer {
                    vault: vault.into_address()?,
                    is_deposit: is_deposit.into_bool()?,
                    usd: u64::from_abi_value(usd)?,
                })
            }
            SPOT_SEND_ACTION_ID => {
                let [destination, token, wei] = decode_args(
                    &[ParamType::Address, ParamType::Uint(64), ParamType::Uint(64)],
                    args,
                )?;
                Ok(CoreWriterAction::SpotSend {
                    destination: destination.into_address()?,
                    token: u64::from_abi_value(token)?,
                    wei: u64::from_abi_value(wei)?,
                })
            }
            USD_CLASS_TRANSFER_ACTION_ID => {
                let [ntl, to_perp] = decode_args(&[ParamType::Uint(64), ParamType::Bool], args)?;
                Ok(CoreWriterAction::UsdClassTransfer {
                    ntl: u64::from_abi_value(ntl)?,
                    to_perp: to_perp.into_bool()?,
                })
            }
            other => Err(ActionDecodeError::UnknownActionId(other)),
        }
    }

    /// The queued action this raw action stands for when sent by `sender`.
    pub fn into_action(self, sender: Address) -> Action {
        match self {
            CoreWriterAction::VaultTransfer {
                vault,
                is_deposit,
                usd,
            } => Action::VaultTransfer {
                account: sender,
                vault,
                amount: usd,
                is_deposit,
            },
            CoreWriterAction::SpotSend {
                destination,
                token,
                wei,
            } => Action::SpotSend {
                from: sender,
                to: destination,
                token,
                amount: wei,
            },
            CoreWriterAction::UsdClassTransfer { ntl, to_perp } => Action::ClassTransfer {
                account: sender,
                amount: ntl,
                to_perp,
            },
        }
    }
}

fn decode_args<const N: usize>(
    params: &[ParamType; N],
    args: &[u8],
) -> Result<[Value; N], AbiDecodeError> {
    decode_tuple(params, args)?
        .try_into()
        .map_err(|_| AbiDecodeError::malformed_data().with_context("action arguments"))
}
