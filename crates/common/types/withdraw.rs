use ethereum_types::Address;
use hypercore_abi::{AbiDecode, AbiDecodeError, AbiEncode, Decoder, Encoder, ParamType, Value};
use serde::{Deserialize, Serialize};

/// Request to withdraw from the ledger, exchanged with contracts as
/// `abi.encode(account, amount, lockedUntilTimestamp)` (three static words).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub account: Address,
    pub amount: u64,
    pub locked_until_timestamp: u64,
}

impl WithdrawRequest {
    pub const ENCODED_LEN: usize = 3 * hypercore_abi::WORD_SIZE;
}

impl AbiEncode for WithdrawRequest {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.account)
            .encode_field(&self.amount)
            .encode_field(&self.locked_until_timestamp)
            .finish()
    }
}

impl AbiDecode for WithdrawRequest {
    fn abi_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::Uint(64),
            ParamType::Uint(64),
        ])
    }

    fn from_abi_tuple(value: Value) -> Result<Self, AbiDecodeError> {
        let decoder = Decoder::new(value)?;
        let (account, decoder) = decoder.decode_field("account")?;
        let (amount, decoder) = decoder.decode_field("amount")?;
        let (locked_until_timestamp, decoder) = decoder.decode_field("locked_until_timestamp")?;
        decoder.finish()?;
        Ok(Self {
            account,
            amount,
            locked_until_timestamp,
        })
    }
}
