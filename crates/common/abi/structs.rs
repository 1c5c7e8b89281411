use ethereum_types::{Address, U256};

use crate::{
    calldata::{ParamType, Value, decode_tuple, encode_tuple},
    error::{AbiDecodeError, AbiEncodeError},
};

/// Conversion of a Rust value into an ABI [`Value`].
pub trait ToAbiValue {
    fn to_abi_value(&self) -> Value;
}

/// Conversion of an ABI [`Value`] back into a Rust value, with range checks.
pub trait FromAbiValue: Sized {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError>;
}

/// A struct encoded as a single ABI tuple.
pub trait AbiEncode {
    fn to_abi_tuple(&self) -> Value;

    fn abi_encode(&self) -> Result<Vec<u8>, AbiEncodeError> {
        encode_tuple(&[self.to_abi_tuple()])
    }
}

/// A struct decoded from a single ABI tuple.
pub trait AbiDecode: Sized {
    fn abi_type() -> ParamType;

    fn from_abi_tuple(value: Value) -> Result<Self, AbiDecodeError>;

    fn abi_decode(data: &[u8]) -> Result<Self, AbiDecodeError> {
        let mut values = decode_tuple(&[Self::abi_type()], data)?;
        let value = values
            .pop()
            .ok_or_else(|| AbiDecodeError::malformed_data().with_context("tuple"))?;
        Self::from_abi_tuple(value)
    }
}

impl ToAbiValue for Address {
    fn to_abi_value(&self) -> Value {
        Value::Address(*self)
    }
}

impl FromAbiValue for Address {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        value.into_address()
    }
}

impl ToAbiValue for U256 {
    fn to_abi_value(&self) -> Value {
        Value::Uint(*self)
    }
}

impl FromAbiValue for U256 {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        value.into_uint()
    }
}

impl ToAbiValue for bool {
    fn to_abi_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromAbiValue for bool {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        value.into_bool()
    }
}

impl ToAbiValue for String {
    fn to_abi_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToAbiValue for str {
    fn to_abi_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl FromAbiValue for String {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        value.into_string()
    }
}

macro_rules! impl_abi_uint {
    ($($t:ty),*) => {
        $(
            impl ToAbiValue for $t {
                fn to_abi_value(&self) -> Value {
                    Value::Uint(U256::from(*self))
                }
            }

            impl FromAbiValue for $t {
                fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
                    let number = value.into_uint()?;
                    let out_of_range = || AbiDecodeError::ValueOutOfRange(stringify!($t).to_string());
                    if number.bits() > <$t>::BITS as usize {
                        return Err(out_of_range());
                    }
                    <$t>::try_from(number.low_u64()).map_err(|_| out_of_range())
                }
            }
        )*
    };
}

impl_abi_uint!(u8, u16, u32, u64);

macro_rules! impl_abi_int {
    ($($t:ty),*) => {
        $(
            impl ToAbiValue for $t {
                fn to_abi_value(&self) -> Value {
                    Value::from_i64(i64::from(*self))
                }
            }

            impl FromAbiValue for $t {
                fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
                    let number = value.into_int()?;
                    <$t>::try_from(number)
                        .map_err(|_| AbiDecodeError::ValueOutOfRange(stringify!($t).to_string()))
                }
            }
        )*
    };
}

impl_abi_int!(i8, i16, i32, i64);

impl<T: ToAbiValue> ToAbiValue for Vec<T> {
    fn to_abi_value(&self) -> Value {
        Value::Array(self.iter().map(ToAbiValue::to_abi_value).collect())
    }
}

impl<T: FromAbiValue> FromAbiValue for Vec<T> {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        value
            .into_values()?
            .into_iter()
            .map(T::from_abi_value)
            .collect()
    }
}

impl<T: ToAbiValue, const N: usize> ToAbiValue for [T; N] {
    fn to_abi_value(&self) -> Value {
        Value::FixedArray(self.iter().map(ToAbiValue::to_abi_value).collect())
    }
}

impl<T: FromAbiValue, const N: usize> FromAbiValue for [T; N] {
    fn from_abi_value(value: Value) -> Result<Self, AbiDecodeError> {
        let values = Vec::<T>::from_abi_value(value)?;
        values
            .try_into()
            .map_err(|_| AbiDecodeError::invalid_length().with_context("fixed array"))
    }
}

/// # Struct encoding helper
///
/// Used to build the tuple for a struct field by field.
///
/// ```
/// # use hypercore_abi::{Encoder, Value};
/// # use ethereum_types::{Address, U256};
/// struct Balance {
///     owner: Address,
///     total: u64,
/// }
///
/// let balance = Balance { owner: Address::zero(), total: 5 };
/// let tuple = Encoder::new()
///     .encode_field(&balance.owner)
///     .encode_field(&balance.total)
///     .finish();
/// assert_eq!(tuple, Value::Tuple(vec![Value::Address(Address::zero()), Value::Uint(U256::from(5))]));
/// ```
#[derive(Debug, Default)]
#[must_use = "`Encoder` must be consumed with `finish` to produce the tuple"]
pub struct Encoder {
    fields: Vec<Value>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encode_field<T: ToAbiValue + ?Sized>(mut self, value: &T) -> Self {
        self.fields.push(value.to_abi_value());
        self
    }

    pub fn finish(self) -> Value {
        Value::Tuple(self.fields)
    }
}

/// # Struct decoding helper
///
/// Walks the fields of a decoded tuple in order. Field names are only used to give context
/// to errors.
#[derive(Debug)]
#[must_use = "`Decoder` must be consumed with `finish` to perform decoding checks"]
pub struct Decoder {
    fields: std::vec::IntoIter<Value>,
}

impl Decoder {
    pub fn new(value: Value) -> Result<Self, AbiDecodeError> {
        match value {
            Value::Tuple(fields) => Ok(Self {
                fields: fields.into_iter(),
            }),
            _ => Err(AbiDecodeError::UnexpectedValue("tuple")),
        }
    }

    pub fn decode_field<T: FromAbiValue>(
        mut self,
        name: &'static str,
    ) -> Result<(T, Self), AbiDecodeError> {
        let value = self
            .fields
            .next()
            .ok_or_else(|| AbiDecodeError::malformed_data().with_context(name))?;
        let field = T::from_abi_value(value).map_err(|err| err.with_context(name))?;
        Ok((field, self))
    }

    /// Fails if any field was left undecoded.
    pub fn finish(self) -> Result<(), AbiDecodeError> {
        if self.fields.as_slice().is_empty() {
            Ok(())
        } else {
            Err(AbiDecodeError::malformed_data().with_context("trailing tuple fields"))
        }
    }
}
