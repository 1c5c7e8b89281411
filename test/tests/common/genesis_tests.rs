use std::{io::Write, str::FromStr};

use ethereum_types::{Address, U256};
use hypercore_bridge::{BridgeError, HyperCore};
use hypercore_common::{
    constants::{HYPE_TOKEN, USDC_TOKEN},
    types::{Genesis, GenesisError, TokenInfoError, UserVaultEquity},
};

const GENESIS: &str = r#"{
    "config": { "vaultDepositLockupMs": 1000 },
    "timestamp": 1700000000000,
    "tokens": {
        "0": {
            "name": "USDC",
            "szDecimals": 8,
            "weiDecimals": 8,
            "evmContract": "0x00000000000000000000000000000000000c0de0"
        },
        "150": { "name": "HYPE", "szDecimals": 2, "weiDecimals": 8, "evmExtraWeiDecimals": 10 }
    },
    "alloc": {
        "0x000000000000000000000000000000000000a11c": {
            "spot": { "0": 250000000, "150": 100000000 },
            "perp": 3000000,
            "vaults": {
                "0x0000000000000000000000000000000000000fa0": {
                    "equity": 1000000,
                    "lockedUntilTimestamp": 1700000005000
                }
            },
            "nativeBalance": "0xde0b6b3a7640000"
        },
        "0x0000000000000000000000000000000000000b0b": {
            "created": false,
            "nativeBalance": "5"
        }
    }
}"#;

fn write_genesis(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn address(raw: &str) -> Address {
    Address::from_str(raw).unwrap()
}

#[test]
fn chain_starts_from_genesis_file() {
    let file = write_genesis(GENESIS);
    let core = HyperCore::from_genesis_file(file.path()).unwrap();
    let alice = address("000000000000000000000000000000000000a11c");
    let bob = address("0000000000000000000000000000000000000b0b");
    let vault = address("0000000000000000000000000000000000000fa0");

    assert_eq!(core.timestamp(), 1_700_000_000_000);
    assert_eq!(core.l1_block_number(), 0);
    assert_eq!(core.config().vault_deposit_lockup_ms, 1000);

    assert_eq!(core.read_spot_balance(alice, USDC_TOKEN).unwrap().total, 250_000_000);
    assert_eq!(core.read_spot_balance(alice, HYPE_TOKEN).unwrap().total, 100_000_000);
    assert_eq!(core.read_withdrawable(alice).unwrap(), 3_000_000);
    assert_eq!(
        core.read_user_vault_equity(alice, vault).unwrap(),
        UserVaultEquity {
            equity: 1_000_000,
            locked_until_timestamp: 1_700_000_005_000
        }
    );
    assert_eq!(core.native_balance(alice), U256::exp10(18));

    // Uncreated accounts only get their EVM balance
    assert!(!core.store().account_exists(bob).unwrap());
    assert_eq!(core.native_balance(bob), U256::from(5));

    // Linked genesis tokens get a contract on the EVM side
    let contract = address("00000000000000000000000000000000000c0de0");
    assert!(core.read_token_info(USDC_TOKEN).unwrap().is_linked());
    assert_eq!(core.token_balance(contract, alice).unwrap(), U256::zero());
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let error = Genesis::try_from(dir.path().join("missing.json").as_path()).unwrap_err();
    assert!(matches!(error, GenesisError::File(_)));
}

#[test]
fn malformed_json_is_reported() {
    let file = write_genesis(r#"{ "tokens": { "0": { "name": 5 } } }"#);
    assert!(matches!(
        Genesis::try_from(file.path()),
        Err(GenesisError::Decode(_))
    ));
}

#[test]
fn native_token_must_be_registered() {
    let file = write_genesis(r#"{ "tokens": { "0": { "name": "USDC", "szDecimals": 8, "weiDecimals": 8 } } }"#);
    assert!(matches!(
        HyperCore::from_genesis_file(file.path()),
        Err(BridgeError::Genesis(GenesisError::MissingNativeToken(HYPE_TOKEN)))
    ));
}

#[test]
fn invalid_token_info_is_rejected() {
    let file = write_genesis(
        r#"{ "tokens": { "150": { "name": "HYPE", "szDecimals": 9, "weiDecimals": 8 } } }"#,
    );
    assert!(matches!(
        Genesis::try_from(file.path()),
        Err(GenesisError::InvalidToken {
            token: HYPE_TOKEN,
            source: TokenInfoError::SzExceedsWei { sz: 9, wei: 8 }
        })
    ));
}

#[test]
fn balances_need_registered_tokens() {
    let file = write_genesis(
        r#"{
            "tokens": { "150": { "name": "HYPE", "szDecimals": 2, "weiDecimals": 8 } },
            "alloc": { "0x0000000000000000000000000000000000000001": { "spot": { "3": 1 } } }
        }"#,
    );
    assert!(matches!(
        Genesis::try_from(file.path()),
        Err(GenesisError::UnknownToken { token: 3, .. })
    ));
}

#[test]
fn default_genesis_only_has_the_native_token() {
    let core = HyperCore::new(&Genesis::default()).unwrap();
    let snapshot = core.snapshot().unwrap();

    assert_eq!(snapshot.tokens.keys().copied().collect::<Vec<_>>(), [HYPE_TOKEN]);
    assert!(snapshot.accounts.is_empty());
    assert_eq!(core.timestamp(), 0);
}
