use bytes::Bytes;
use ethereum_types::{Address, U256};
use hex_literal::hex;
use hypercore_abi::{AbiDecodeError, ParamType, Value, decode_tuple, encode_tuple};

fn word(value: u64) -> [u8; 32] {
    U256::from(value).to_big_endian()
}

#[test]
fn param_types_render_as_solidity_types() {
    let params = [
        ParamType::Array(Box::new(ParamType::Tuple(vec![
            ParamType::Uint(64),
            ParamType::String,
        ]))),
        ParamType::FixedBytes(32),
        ParamType::FixedArray(Box::new(ParamType::Int(8)), 3),
    ];
    let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, ["(uint64,string)[]", "bytes32", "int8[3]"]);
    assert!(params[0].is_dynamic());
    assert!(!params[2].is_dynamic());
    assert_eq!(params[2].head_size(), 3 * 32);
}

#[test]
fn static_arguments_are_laid_out_inline() {
    let to = Address::from(hex!("00000000000000000000000000000000000b0b00"));
    let values = [Value::Address(to), Value::Uint(U256::from(1_000))];
    let encoded = encode_tuple(&values).unwrap();

    assert_eq!(encoded.len(), 2 * 32);
    assert_eq!(&encoded[12..32], to.as_bytes());
    assert_eq!(&encoded[32..], &word(1_000));

    let decoded = decode_tuple(&[ParamType::Address, ParamType::Uint(256)], &encoded).unwrap();
    assert_eq!(decoded, values);
}

#[test]
fn dynamic_values_go_to_the_tail() {
    let values = [
        Value::Uint(U256::from(7)),
        Value::String("HYPE".to_string()),
        Value::Array(vec![Value::Uint(U256::one()), Value::Uint(U256::from(2))]),
    ];
    let encoded = encode_tuple(&values).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&word(7));
    // head: 3 words, the string starts right after it
    expected.extend_from_slice(&word(0x60));
    // string takes a length word and one padded data word
    expected.extend_from_slice(&word(0xa0));
    expected.extend_from_slice(&word(4));
    let mut data = [0u8; 32];
    data[..4].copy_from_slice(b"HYPE");
    expected.extend_from_slice(&data);
    expected.extend_from_slice(&word(2));
    expected.extend_from_slice(&word(1));
    expected.extend_from_slice(&word(2));
    assert_eq!(encoded, expected);

    let params = [
        ParamType::Uint(64),
        ParamType::String,
        ParamType::Array(Box::new(ParamType::Uint(64))),
    ];
    assert_eq!(decode_tuple(&params, &encoded).unwrap(), values);
}

#[test]
fn bytes_are_padded_to_a_word() {
    let payload = Bytes::from_static(&hex!("0100000601"));
    let encoded = encode_tuple(&[Value::Bytes(payload.clone())]).unwrap();

    assert_eq!(encoded.len(), 3 * 32);
    assert_eq!(&encoded[64..69], payload.as_ref());
    assert!(encoded[69..].iter().all(|byte| *byte == 0));
    assert_eq!(
        decode_tuple(&[ParamType::Bytes], &encoded).unwrap(),
        vec![Value::Bytes(payload)]
    );
}

#[test]
fn decoding_rejects_malformed_input() {
    let encoded = encode_tuple(&[Value::Uint(U256::from(256))]).unwrap();

    assert_eq!(
        decode_tuple(&[ParamType::Uint(8)], &encoded),
        Err(AbiDecodeError::ValueOutOfRange("uint8".to_string()))
    );
    assert_eq!(
        decode_tuple(&[ParamType::Bool], &encoded),
        Err(AbiDecodeError::ValueOutOfRange("bool".to_string()))
    );

    let mut trailing = encoded.clone();
    trailing.push(0);
    assert_eq!(
        decode_tuple(&[ParamType::Uint(256)], &trailing),
        Err(AbiDecodeError::InvalidLength(None))
    );
    assert!(decode_tuple(&[ParamType::Uint(256)], &encoded[..31]).is_err());

    // Offset pointing past the end of the data
    let mut bad_offset = word(0x1000).to_vec();
    bad_offset.extend_from_slice(&word(0));
    assert!(decode_tuple(&[ParamType::Bytes], &bad_offset).is_err());

    // Dirty address padding
    assert!(decode_tuple(&[ParamType::Address], &[0xff; 32]).is_err());
}

#[test]
fn signed_values_use_twos_complement() {
    let encoded = encode_tuple(&[Value::from_i64(-1), Value::from_i64(127)]).unwrap();
    assert_eq!(&encoded[..32], &[0xff; 32]);

    let values = decode_tuple(&[ParamType::Int(8), ParamType::Int(8)], &encoded).unwrap();
    let values: Vec<i64> = values
        .into_iter()
        .map(|value| value.into_int().unwrap())
        .collect();
    assert_eq!(values, [-1, 127]);

    let too_big = encode_tuple(&[Value::from_i64(128)]).unwrap();
    assert!(decode_tuple(&[ParamType::Int(8)], &too_big).is_err());
}
