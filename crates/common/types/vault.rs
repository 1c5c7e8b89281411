use hypercore_abi::{AbiDecode, AbiDecodeError, AbiEncode, Decoder, Encoder, ParamType, Value};
use serde::{Deserialize, Serialize};

/// Equity of one account in one vault, in perp USD units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVaultEquity {
    pub equity: u64,
    /// Milliseconds timestamp. Withdrawals are allowed once the clock reaches it. Zero means
    /// no unlock time was ever recorded and the equity stays locked.
    #[serde(default)]
    pub locked_until_timestamp: u64,
}

impl UserVaultEquity {
    pub fn is_locked_at(&self, timestamp: u64) -> bool {
        self.locked_until_timestamp == 0 || timestamp < self.locked_until_timestamp
    }

    /// Lock marker stamped by a deposit made at `timestamp`.
    pub fn deposit_lock(&self, timestamp: u64, lockup_ms: u64) -> u64 {
        self.locked_until_timestamp
            .max(timestamp.saturating_add(lockup_ms))
            .max(1)
    }
}

impl AbiEncode for UserVaultEquity {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.equity)
            .encode_field(&self.locked_until_timestamp)
            .finish()
    }
}

impl AbiDecode for UserVaultEquity {
    fn abi_type() -> ParamType {
        ParamType::Tuple(vec![ParamType::Uint(64), ParamType::Uint(64)])
    }

    fn from_abi_tuple(value: Value) -> Result<Self, AbiDecodeError> {
        let decoder = Decoder::new(value)?;
        let (equity, decoder) = decoder.decode_field("equity")?;
        let (locked_until_timestamp, decoder) = decoder.decode_field("locked_until_timestamp")?;
        decoder.finish()?;
        Ok(Self {
            equity,
            locked_until_timestamp,
        })
    }
}
