use hypercore_abi::{AbiDecode, AbiDecodeError, AbiEncode, Decoder, Encoder, ParamType, Value};
use serde::{Deserialize, Serialize};

/// Spot balance of one account in one token, in ledger wei.
///
/// `total >= hold` always holds. `entry_ntl` is kept for layout compatibility with the
/// read precompile and stays zero since there is no order book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotBalance {
    pub total: u64,
    #[serde(default)]
    pub hold: u64,
    #[serde(default)]
    pub entry_ntl: u64,
}

impl SpotBalance {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Amount not on hold.
    pub fn available(&self) -> u64 {
        self.total.saturating_sub(self.hold)
    }

    /// Returns the balance after a credit, or `None` on overflow.
    pub fn credited(self, amount: u64) -> Option<Self> {
        Some(Self {
            total: self.total.checked_add(amount)?,
            ..self
        })
    }

    /// Returns the balance after a debit, or `None` if `amount` exceeds the available balance.
    pub fn debited(self, amount: u64) -> Option<Self> {
        if amount > self.available() {
            return None;
        }
        Some(Self {
            total: self.total - amount,
            ..self
        })
    }

    pub fn is_valid(&self) -> bool {
        self.total >= self.hold
    }
}

impl AbiEncode for SpotBalance {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.total)
            .encode_field(&self.hold)
            .encode_field(&self.entry_ntl)
            .finish()
    }
}

impl AbiDecode for SpotBalance {
    fn abi_type() -> ParamType {
        ParamType::Tuple(vec![ParamType::Uint(64); 3])
    }

    fn from_abi_tuple(value: Value) -> Result<Self, AbiDecodeError> {
        let decoder = Decoder::new(value)?;
        let (total, decoder) = decoder.decode_field("total")?;
        let (hold, decoder) = decoder.decode_field("hold")?;
        let (entry_ntl, decoder) = decoder.decode_field("entry_ntl")?;
        decoder.finish()?;
        Ok(Self {
            total,
            hold,
            entry_ntl,
        })
    }
}
