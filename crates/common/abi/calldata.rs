use bytes::Bytes;
use ethereum_types::{Address, U256};
use std::fmt;

use crate::error::{AbiDecodeError, AbiEncodeError};

/// Size in bytes of a single ABI word.
pub const WORD_SIZE: usize = 32;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Value {
    Address(Address),
    Uint(U256),
    /// Two's complement word.
    Int(U256),
    Bool(bool),
    Bytes(Bytes),
    String(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    FixedArray(Vec<Value>),
    FixedBytes(Bytes),
}

impl Value {
    pub fn from_i64(value: i64) -> Self {
        let magnitude = U256::from(value.unsigned_abs());
        if value < 0 {
            Value::Int((!magnitude).overflowing_add(U256::one()).0)
        } else {
            Value::Int(magnitude)
        }
    }

    pub fn into_address(self) -> Result<Address, AbiDecodeError> {
        match self {
            Value::Address(address) => Ok(address),
            _ => Err(AbiDecodeError::UnexpectedValue("address")),
        }
    }

    pub fn into_uint(self) -> Result<U256, AbiDecodeError> {
        match self {
            Value::Uint(number) => Ok(number),
            _ => Err(AbiDecodeError::UnexpectedValue("uint")),
        }
    }

    pub fn into_int(self) -> Result<i64, AbiDecodeError> {
        match self {
            Value::Int(word) => int_from_word(word),
            _ => Err(AbiDecodeError::UnexpectedValue("int")),
        }
    }

    pub fn into_bool(self) -> Result<bool, AbiDecodeError> {
        match self {
            Value::Bool(boolean) => Ok(boolean),
            _ => Err(AbiDecodeError::UnexpectedValue("bool")),
        }
    }

    pub fn into_string(self) -> Result<String, AbiDecodeError> {
        match self {
            Value::String(string) => Ok(string),
            _ => Err(AbiDecodeError::UnexpectedValue("string")),
        }
    }

    pub fn into_bytes(self) -> Result<Bytes, AbiDecodeError> {
        match self {
            Value::Bytes(bytes) | Value::FixedBytes(bytes) => Ok(bytes),
            _ => Err(AbiDecodeError::UnexpectedValue("bytes")),
        }
    }

    /// Returns the elements of a tuple, array or fixed array.
    pub fn into_values(self) -> Result<Vec<Value>, AbiDecodeError> {
        match self {
            Value::Tuple(values) | Value::Array(values) | Value::FixedArray(values) => Ok(values),
            _ => Err(AbiDecodeError::UnexpectedValue("tuple or array")),
        }
    }
}

fn int_from_word(word: U256) -> Result<i64, AbiDecodeError> {
    let out_of_range = || AbiDecodeError::ValueOutOfRange("int64".to_string());
    if word.bit(255) {
        let magnitude = (!word).overflowing_add(U256::one()).0;
        if magnitude > U256::from(i64::MIN.unsigned_abs()) {
            return Err(out_of_range());
        }
        0_i64
            .checked_sub_unsigned(magnitude.low_u64())
            .ok_or_else(out_of_range)
    } else {
        if word.bits() > 63 {
            return Err(out_of_range());
        }
        i64::try_from(word.low_u64()).map_err(|_| out_of_range())
    }
}

/// Type of a value as written in a Solidity signature.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ParamType {
    Address,
    Uint(usize),
    Int(usize),
    Bool,
    Bytes,
    String,
    FixedBytes(usize),
    Array(Box<ParamType>),
    FixedArray(Box<ParamType>, usize),
    Tuple(Vec<ParamType>),
}

impl ParamType {
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(params) => params.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes the value takes in the head of its enclosing tuple.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            ParamType::FixedArray(inner, len) => inner.head_size().saturating_mul(*len),
            ParamType::Tuple(params) => params.iter().map(ParamType::head_size).sum(),
            _ => WORD_SIZE,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{bits}"),
            ParamType::Int(bits) => write!(f, "int{bits}"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::String => write!(f, "string"),
            ParamType::FixedBytes(len) => write!(f, "bytes{len}"),
            ParamType::Array(inner) => write!(f, "{inner}[]"),
            ParamType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            ParamType::Tuple(params) => {
                write!(f, "(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{param}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Encodes `values` the way `abi.encode(values...)` does: static values inline in the head,
/// dynamic values in the tail, referenced from the head by their offset from the tuple start.
pub fn encode_tuple(values: &[Value]) -> Result<Vec<u8>, AbiEncodeError> {
    let head_size: usize = values.iter().map(static_offset_value).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for value in values {
        let encoding = encode_value(value)?;
        if is_dynamic(value) {
            head.extend_from_slice(&u256_to_word(U256::from(head_size + tail.len())));
            tail.extend_from_slice(&encoding);
        } else {
            head.extend_from_slice(&encoding);
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

fn encode_value(value: &Value) -> Result<Vec<u8>, AbiEncodeError> {
    let encoding = match value {
        Value::Address(address) => address_to_word(*address).to_vec(),
        Value::Uint(number) | Value::Int(number) => u256_to_word(*number).to_vec(),
        Value::Bool(boolean) => u256_to_word(U256::from(u8::from(*boolean))).to_vec(),
        Value::FixedBytes(bytes) => {
            if bytes.len() > WORD_SIZE {
                return Err(AbiEncodeError::FixedBytesTooLong(bytes.len()));
            }
            let mut word = [0u8; WORD_SIZE];
            word[..bytes.len()].copy_from_slice(bytes);
            word.to_vec()
        }
        Value::Bytes(bytes) => encode_bytes(bytes),
        Value::String(string) => encode_bytes(string.as_bytes()),
        Value::Array(values) => encode_array(values)?,
        Value::Tuple(values) | Value::FixedArray(values) => encode_tuple(values)?,
    };
    Ok(encoding)
}

fn static_offset_value(value: &Value) -> usize {
    if is_dynamic(value) {
        return WORD_SIZE;
    }
    match value {
        // Every element is static here, otherwise the value would be dynamic
        Value::Tuple(values) | Value::FixedArray(values) => {
            values.iter().map(static_offset_value).sum()
        }
        _ => WORD_SIZE,
    }
}

fn is_dynamic(value: &Value) -> bool {
    match value {
        Value::Bytes(_) | Value::String(_) | Value::Array(_) => true,
        Value::Tuple(values) => values.iter().any(is_dynamic),
        Value::FixedArray(values) => values.first().is_some_and(is_dynamic),
        _ => false,
    }
}

fn encode_array(values: &[Value]) -> Result<Vec<u8>, AbiEncodeError> {
    let mut ret = u256_to_word(U256::from(values.len())).to_vec();
    ret.extend_from_slice(&encode_tuple(values)?);
    Ok(ret)
}

fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut ret = u256_to_word(U256::from(bytes.len())).to_vec();
    ret.extend_from_slice(bytes);
    let padding = bytes.len().next_multiple_of(WORD_SIZE) - bytes.len();
    ret.resize(ret.len() + padding, 0);
    ret
}

fn u256_to_word(number: U256) -> [u8; WORD_SIZE] {
    number.to_big_endian()
}

fn address_to_word(address: Address) -> [u8; WORD_SIZE] {
    let mut word = [0u8; WORD_SIZE];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Inverse of [`encode_tuple`]. The whole input must be consumed.
pub fn decode_tuple(params: &[ParamType], data: &[u8]) -> Result<Vec<Value>, AbiDecodeError> {
    let (values, end) = decode_sequence(params.iter(), data, 0)?;
    if end != data.len() {
        return Err(AbiDecodeError::invalid_length());
    }
    Ok(values)
}

/// Decodes consecutive head entries starting at `base`, following offsets (relative to
/// `base`) for dynamic entries. Returns the values and the furthest byte read.
fn decode_sequence<'p>(
    params: impl Iterator<Item = &'p ParamType>,
    data: &[u8],
    base: usize,
) -> Result<(Vec<Value>, usize), AbiDecodeError> {
    let overflow = || AbiDecodeError::malformed_data().with_context("offset");

    let mut values = Vec::new();
    let mut head = base;
    let mut end = base;

    for param in params {
        let (value, value_end) = if param.is_dynamic() {
            let offset = read_usize(data, head)?;
            end = end.max(head.checked_add(WORD_SIZE).ok_or_else(overflow)?);
            let location = base.checked_add(offset).ok_or_else(overflow)?;
            decode_value(param, data, location)?
        } else {
            decode_value(param, data, head)?
        };
        end = end.max(value_end);
        values.push(value);
        head = head.checked_add(param.head_size()).ok_or_else(overflow)?;
    }

    Ok((values, end.max(head)))
}

fn decode_value(
    param: &ParamType,
    data: &[u8],
    at: usize,
) -> Result<(Value, usize), AbiDecodeError> {
    let word_end = at
        .checked_add(WORD_SIZE)
        .ok_or_else(AbiDecodeError::invalid_length)?;
    let out_of_range = || AbiDecodeError::ValueOutOfRange(param.to_string());

    match param {
        ParamType::Address => {
            let (padding, address) = read_word(data, at)?.split_at(12);
            if padding.iter().any(|byte| *byte != 0) {
                return Err(out_of_range());
            }
            Ok((Value::Address(Address::from_slice(address)), word_end))
        }
        ParamType::Uint(bits) => {
            let number = U256::from_big_endian(read_word(data, at)?);
            if number.bits() > *bits {
                return Err(out_of_range());
            }
            Ok((Value::Uint(number), word_end))
        }
        ParamType::Int(bits) => {
            let number = U256::from_big_endian(read_word(data, at)?);
            if !fits_signed(number, *bits) {
                return Err(out_of_range());
            }
            Ok((Value::Int(number), word_end))
        }
        ParamType::Bool => {
            let number = U256::from_big_endian(read_word(data, at)?);
            let boolean = if number.is_zero() {
                false
            } else if number == U256::one() {
                true
            } else {
                return Err(out_of_range());
            };
            Ok((Value::Bool(boolean), word_end))
        }
        ParamType::FixedBytes(len) => {
            let (bytes, padding) = read_word(data, at)?
                .split_at_checked(*len)
                .ok_or_else(|| AbiDecodeError::InvalidType(param.to_string()))?;
            if padding.iter().any(|byte| *byte != 0) {
                return Err(out_of_range());
            }
            Ok((Value::FixedBytes(Bytes::copy_from_slice(bytes)), word_end))
        }
        ParamType::Bytes => {
            let (bytes, end) = read_dynamic_bytes(data, at)?;
            Ok((Value::Bytes(Bytes::copy_from_slice(bytes)), end))
        }
        ParamType::String => {
            let (bytes, end) = read_dynamic_bytes(data, at)?;
            let string = String::from_utf8(bytes.to_vec()).map_err(|_| AbiDecodeError::InvalidUtf8)?;
            Ok((Value::String(string), end))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            if len > data.len() {
                return Err(AbiDecodeError::invalid_length().with_context("array"));
            }
            let elements = std::iter::repeat(inner.as_ref()).take(len);
            let (values, end) = decode_sequence(elements, data, word_end)?;
            Ok((Value::Array(values), end.max(word_end)))
        }
        ParamType::FixedArray(inner, len) => {
            let elements = std::iter::repeat(inner.as_ref()).take(*len);
            let (values, end) = decode_sequence(elements, data, at)?;
            Ok((Value::FixedArray(values), end))
        }
        ParamType::Tuple(params) => {
            let (values, end) = decode_sequence(params.iter(), data, at)?;
            Ok((Value::Tuple(values), end))
        }
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], AbiDecodeError> {
    let end = at
        .checked_add(WORD_SIZE)
        .ok_or_else(AbiDecodeError::invalid_length)?;
    data.get(at..end).ok_or_else(AbiDecodeError::invalid_length)
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, AbiDecodeError> {
    let (high, low) = read_word(data, at)?.split_at(WORD_SIZE - 8);
    if high.iter().any(|byte| *byte != 0) {
        return Err(AbiDecodeError::malformed_data().with_context("offset"));
    }
    let mut be = [0u8; 8];
    be.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(be))
        .map_err(|_| AbiDecodeError::malformed_data().with_context("offset"))
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<(&[u8], usize), AbiDecodeError> {
    let overflow = || AbiDecodeError::invalid_length().with_context("bytes");

    let len = read_usize(data, at)?;
    let start = at.checked_add(WORD_SIZE).ok_or_else(overflow)?;
    let end = start.checked_add(len).ok_or_else(overflow)?;
    let padded_end = start
        .checked_add(len.div_ceil(WORD_SIZE).checked_mul(WORD_SIZE).ok_or_else(overflow)?)
        .ok_or_else(overflow)?;
    if padded_end > data.len() {
        return Err(overflow());
    }
    let bytes = data.get(start..end).ok_or_else(overflow)?;
    Ok((bytes, padded_end))
}

fn fits_signed(number: U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let half = U256::one() << (bits - 1);
    number < half || number >= U256::MAX - (half - U256::one())
}
