//! Solidity ABI word codec.
//!
//! Everything that crosses the boundary between the EVM side and the core ledger is laid out
//! as `abi.encode(...)` would lay it out: 32-byte big endian words, with dynamic values
//! (`bytes`, `string`, `T[]`) placed after the static head and referenced by offset.
//!
//! - [`calldata`] holds the untyped [`Value`](calldata::Value) tree and the encode/decode
//!   functions over it.
//! - [`structs`] holds the typed helpers used to map Rust structs onto tuples.

pub mod calldata;
pub mod error;
pub mod structs;

pub use calldata::{ParamType, Value, WORD_SIZE, decode_tuple, encode_tuple};
pub use error::{AbiDecodeError, AbiEncodeError};
pub use structs::{AbiDecode, AbiEncode, Decoder, Encoder, FromAbiValue, ToAbiValue};
