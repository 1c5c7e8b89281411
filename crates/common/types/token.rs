use ethereum_types::Address;
use hypercore_abi::{
    AbiDecode, AbiDecodeError, AbiEncode, Decoder, Encoder, ParamType, Value,
};
use serde::{Deserialize, Serialize};

use crate::constants::{HYPE_EVM_EXTRA_WEI_DECIMALS, HYPE_SZ_DECIMALS, HYPE_WEI_DECIMALS};

pub type TokenId = u64;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum TokenInfoError {
    #[error("Token name is empty")]
    EmptyName,
    #[error("szDecimals ({sz}) exceeds weiDecimals ({wei})")]
    SzExceedsWei { sz: u8, wei: u8 },
    #[error("EVM decimals {0} out of range")]
    EvmDecimals(i16),
}

/// Registry entry of a ledger token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub name: String,
    #[serde(default)]
    pub spots: Vec<u64>,
    #[serde(default)]
    pub deployer_trading_fee_share: u64,
    #[serde(default)]
    pub deployer: Address,
    /// Zero until the spot token contract is deployed.
    #[serde(default)]
    pub evm_contract: Address,
    pub sz_decimals: u8,
    pub wei_decimals: u8,
    /// EVM decimals minus ledger `wei_decimals`.
    #[serde(default)]
    pub evm_extra_wei_decimals: i8,
}

impl TokenInfo {
    /// Registry entry of the native gas token.
    pub fn native(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sz_decimals: HYPE_SZ_DECIMALS,
            wei_decimals: HYPE_WEI_DECIMALS,
            evm_extra_wei_decimals: HYPE_EVM_EXTRA_WEI_DECIMALS,
            ..Default::default()
        }
    }

    pub fn is_linked(&self) -> bool {
        !self.evm_contract.is_zero()
    }

    pub fn validate(&self) -> Result<(), TokenInfoError> {
        if self.name.trim().is_empty() {
            return Err(TokenInfoError::EmptyName);
        }
        if self.sz_decimals > self.wei_decimals {
            return Err(TokenInfoError::SzExceedsWei {
                sz: self.sz_decimals,
                wei: self.wei_decimals,
            });
        }
        let evm_decimals = self.evm_decimals();
        if !(0..=i16::from(u8::MAX)).contains(&evm_decimals) {
            return Err(TokenInfoError::EvmDecimals(evm_decimals));
        }
        Ok(())
    }

    /// Decimals of the token on the EVM side.
    pub fn evm_decimals(&self) -> i16 {
        i16::from(self.wei_decimals) + i16::from(self.evm_extra_wei_decimals)
    }
}

impl AbiEncode for TokenInfo {
    fn to_abi_tuple(&self) -> Value {
        Encoder::new()
            .encode_field(&self.name)
            .encode_field(&self.spots)
            .encode_field(&self.deployer_trading_fee_share)
            .encode_field(&self.deployer)
            .encode_field(&self.evm_contract)
            .encode_field(&self.sz_decimals)
            .encode_field(&self.wei_decimals)
            .encode_field(&self.evm_extra_wei_decimals)
            .finish()
    }
}

impl AbiDecode for TokenInfo {
    fn abi_type() -> ParamType {
        ParamType::Tuple(vec![
            ParamType::String,
            ParamType::Array(Box::new(ParamType::Uint(64))),
            ParamType::Uint(64),
            ParamType::Address,
            ParamType::Address,
            ParamType::Uint(8),
            ParamType::Uint(8),
            ParamType::Int(8),
        ])
    }

    fn from_abi_tuple(value: Value) -> Result<Self, AbiDecodeError> {
        let decoder = Decoder::new(value)?;
        let (name, decoder) = decoder.decode_field("name")?;
        let (spots, decoder) = decoder.decode_field("spots")?;
        let (deployer_trading_fee_share, decoder) =
            decoder.decode_field("deployer_trading_fee_share")?;
        let (deployer, decoder) = decoder.decode_field("deployer")?;
        let (evm_contract, decoder) = decoder.decode_field("evm_contract")?;
        let (sz_decimals, decoder) = decoder.decode_field("sz_decimals")?;
        let (wei_decimals, decoder) = decoder.decode_field("wei_decimals")?;
        let (evm_extra_wei_decimals, decoder) = decoder.decode_field("evm_extra_wei_decimals")?;
        decoder.finish()?;
        Ok(Self {
            name,
            spots,
            deployer_trading_fee_share,
            deployer,
            evm_contract,
            sz_decimals,
            wei_decimals,
            evm_extra_wei_decimals,
        })
    }
}
