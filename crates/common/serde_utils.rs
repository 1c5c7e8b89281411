use serde::{Deserialize, Deserializer, Serializer, de::Error};

/// Accepts both JSON numbers and strings for integer fields, so large values can be written
/// as strings in genesis and scenario files.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    String(String),
}

pub mod u256 {
    use super::*;
    use ethereum_types::U256;

    /// Decimal or `0x` prefixed hex string, or a plain JSON number.
    pub mod hex_or_dec_str {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
        where
            D: Deserializer<'de>,
        {
            match NumberOrString::deserialize(d)? {
                NumberOrString::Number(value) => Ok(U256::from(value)),
                NumberOrString::String(value) => parse(&value).map_err(D::Error::custom),
            }
        }

        pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&value.to_string())
        }
    }

    pub fn parse(value: &str) -> Result<U256, String> {
        if let Some(hex) = value.strip_prefix("0x") {
            U256::from_str_radix(hex, 16).map_err(|_| format!("Invalid u256 hex value: {value}"))
        } else {
            U256::from_dec_str(value).map_err(|e| e.to_string())
        }
    }
}

pub mod u64 {
    use super::*;

    /// Decimal or `0x` prefixed hex string, or a plain JSON number.
    pub mod hex_or_dec_str {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
        where
            D: Deserializer<'de>,
        {
            match NumberOrString::deserialize(d)? {
                NumberOrString::Number(value) => Ok(value),
                NumberOrString::String(value) => {
                    if let Some(hex) = value.strip_prefix("0x") {
                        u64::from_str_radix(hex, 16)
                            .map_err(|_| D::Error::custom("Failed to deserialize u64 value"))
                    } else {
                        value
                            .parse()
                            .map_err(|_| D::Error::custom("Failed to deserialize u64 value"))
                    }
                }
            }
        }

        pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_u64(*value)
        }
    }
}
