use bytes::Bytes;
use hypercore_abi::{AbiDecode, AbiEncode};
use hypercore_common::types::WithdrawRequest;

use crate::error::BridgeError;

/// Encodes `request` into its fixed 96 byte layout.
pub fn serialize_withdraw_request(request: &WithdrawRequest) -> Result<Bytes, BridgeError> {
    Ok(Bytes::from(request.abi_encode()?))
}

/// Inverse of [`serialize_withdraw_request`]. Any other length is rejected.
pub fn deserialize_withdraw_request(data: &[u8]) -> Result<WithdrawRequest, BridgeError> {
    Ok(WithdrawRequest::abi_decode(data)?)
}
