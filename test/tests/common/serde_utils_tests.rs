use ethereum_types::U256;
use hypercore_common::serde_utils;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Transfer {
    #[serde(with = "serde_utils::u256::hex_or_dec_str")]
    amount: U256,
    #[serde(with = "serde_utils::u64::hex_or_dec_str")]
    timestamp: u64,
}

#[test]
fn u256_serializes_as_decimal_string() {
    let transfer = Transfer {
        amount: U256::exp10(30),
        timestamp: 5,
    };
    let json = serde_json::to_value(&transfer).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "amount": "1000000000000000000000000000000", "timestamp": 5 })
    );
    assert_eq!(serde_json::from_value::<Transfer>(json).unwrap(), transfer);
}

#[test]
fn numbers_and_strings_are_accepted() {
    let from_number: Transfer =
        serde_json::from_str(r#"{ "amount": 12, "timestamp": "1700000000000" }"#).unwrap();
    let from_hex: Transfer =
        serde_json::from_str(r#"{ "amount": "0xc", "timestamp": "0x18bcfe56800" }"#).unwrap();
    assert_eq!(from_number, from_hex);
    assert_eq!(from_number.timestamp, 1_700_000_000_000);
}

#[test]
fn invalid_values_are_rejected() {
    for json in [
        r#"{ "amount": "12a", "timestamp": 0 }"#,
        r#"{ "amount": "0xg", "timestamp": 0 }"#,
        r#"{ "amount": 1, "timestamp": "-1" }"#,
        r#"{ "amount": 1, "timestamp": "18446744073709551616" }"#,
        r#"{ "amount": -1, "timestamp": 0 }"#,
    ] {
        assert!(serde_json::from_str::<Transfer>(json).is_err(), "{json}");
    }
}

#[test]
fn parse_accepts_both_radixes() {
    assert_eq!(serde_utils::u256::parse("0xff"), Ok(U256::from(255)));
    assert_eq!(serde_utils::u256::parse("255"), Ok(U256::from(255)));
}
