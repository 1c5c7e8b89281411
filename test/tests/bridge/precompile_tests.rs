use ethereum_types::{Address, U256};
use hypercore_abi::{AbiDecode, ParamType, Value, decode_tuple, encode_tuple};
use hypercore_bridge::{
    BridgeError, PrecompileError, PrecompileQuery,
    precompiles::{
        DELEGATOR_SUMMARY, L1_BLOCK_NUMBER, ORACLE_PX, PERP_ASSET_INFO, PRECOMPILES,
        SPOT_BALANCE, SPOT_INFO, TOKEN_INFO, USER_VAULT_EQUITY, WITHDRAWABLE,
    },
};
use hypercore_common::{
    constants::USDC_TOKEN,
    types::{SpotBalance, TokenInfo, UserVaultEquity},
};
use hypercore_test::{deploy_hypercore_fixture, scale_u64};

#[test]
fn reads_reflect_the_last_flush() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);
    core.force_spot(users[0], USDC_TOKEN, scale_u64(10, 8)).unwrap();

    let calldata = PrecompileQuery::SpotBalance {
        user: users[1],
        token: USDC_TOKEN,
    }
    .encode()
    .unwrap();

    core.send_spot(users[0], users[1], USDC_TOKEN, scale_u64(1, 8));
    let before = core.call_precompile(SPOT_BALANCE.address, &calldata).unwrap();
    assert_eq!(SpotBalance::abi_decode(&before).unwrap(), SpotBalance::default());

    core.flush_action_queue().unwrap();
    let after = core.call_precompile(SPOT_BALANCE.address, &calldata).unwrap();
    assert_eq!(
        SpotBalance::abi_decode(&after).unwrap(),
        SpotBalance::new(scale_u64(1, 8))
    );
}

#[test]
fn withdrawable_and_vault_equity() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);
    let vault = Address::from_low_u64_be(0x123);
    core.force_perp(users[0], 7).unwrap();
    core.force_vault_equity(users[0], vault, 3, 99).unwrap();

    let calldata = PrecompileQuery::Withdrawable { user: users[0] }
        .encode()
        .unwrap();
    let output = core.call_precompile(WITHDRAWABLE.address, &calldata).unwrap();
    assert_eq!(
        decode_tuple(&[ParamType::Uint(64)], &output).unwrap(),
        vec![Value::Uint(U256::from(7))]
    );

    let calldata = PrecompileQuery::UserVaultEquity {
        user: users[0],
        vault,
    }
    .encode()
    .unwrap();
    let output = core
        .call_precompile(USER_VAULT_EQUITY.address, &calldata)
        .unwrap();
    assert_eq!(
        UserVaultEquity::abi_decode(&output).unwrap(),
        UserVaultEquity {
            equity: 3,
            locked_until_timestamp: 99
        }
    );
}

#[test]
fn token_info_reports_linked_contract() {
    let fixture = deploy_hypercore_fixture().unwrap();
    let calldata = PrecompileQuery::TokenInfo { token: 0 }.encode().unwrap();

    let output = fixture
        .core
        .call_precompile(TOKEN_INFO.address, &calldata)
        .unwrap();
    let info = TokenInfo::abi_decode(&output).unwrap();
    assert_eq!(info.name, "USDC");
    assert_eq!(info.evm_contract, fixture.usdc);

    // Unregistered tokens read as zero values
    let calldata = PrecompileQuery::TokenInfo { token: 42 }.encode().unwrap();
    let output = fixture
        .core
        .call_precompile(TOKEN_INFO.address, &calldata)
        .unwrap();
    assert_eq!(TokenInfo::abi_decode(&output).unwrap(), TokenInfo::default());
}

#[test]
fn market_queries_read_as_zero() {
    let fixture = deploy_hypercore_fixture().unwrap();
    let core = &fixture.core;

    let index = encode_tuple(&[Value::Uint(U256::from(3))]).unwrap();
    let price = core.call_precompile(ORACLE_PX.address, &index).unwrap();
    assert_eq!(price.as_ref(), [0u8; 32].as_slice());

    let summary = core
        .call_precompile(
            DELEGATOR_SUMMARY.address,
            &encode_tuple(&[Value::Address(fixture.users[0])]).unwrap(),
        )
        .unwrap();
    assert_eq!(summary.as_ref(), [0u8; 128].as_slice());

    let perp = core.call_precompile(PERP_ASSET_INFO.address, &index).unwrap();
    let decoded = decode_tuple(
        &[ParamType::Tuple(vec![
            ParamType::String,
            ParamType::Uint(32),
            ParamType::Uint(8),
            ParamType::Uint(8),
            ParamType::Bool,
        ])],
        &perp,
    )
    .unwrap();
    assert_eq!(
        decoded,
        vec![Value::Tuple(vec![
            Value::String(String::new()),
            Value::Uint(U256::zero()),
            Value::Uint(U256::zero()),
            Value::Uint(U256::zero()),
            Value::Bool(false),
        ])]
    );

    let spot = core.call_precompile(SPOT_INFO.address, &index).unwrap();
    let decoded = decode_tuple(
        &[ParamType::Tuple(vec![
            ParamType::String,
            ParamType::FixedArray(Box::new(ParamType::Uint(64)), 2),
        ])],
        &spot,
    )
    .unwrap();
    assert_eq!(
        decoded,
        vec![Value::Tuple(vec![
            Value::String(String::new()),
            Value::FixedArray(vec![Value::Uint(U256::zero()), Value::Uint(U256::zero())]),
        ])]
    );
}

#[test]
fn l1_block_number_counts_flushes() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let core = &mut fixture.core;

    core.flush_action_queue().unwrap();
    core.flush_action_queue().unwrap();
    let output = core.call_precompile(L1_BLOCK_NUMBER.address, &[]).unwrap();
    assert_eq!(
        decode_tuple(&[ParamType::Uint(64)], &output).unwrap(),
        vec![Value::Uint(U256::from(2))]
    );
}

#[test]
fn every_precompile_answers_a_well_formed_query() {
    let fixture = deploy_hypercore_fixture().unwrap();
    let user = fixture.users[2];
    let queries = [
        PrecompileQuery::SpotBalance { user, token: 1 },
        PrecompileQuery::UserVaultEquity { user, vault: user },
        PrecompileQuery::Withdrawable { user },
        PrecompileQuery::Delegations { user },
        PrecompileQuery::DelegatorSummary { user },
        PrecompileQuery::MarkPx { index: 0 },
        PrecompileQuery::OraclePx { index: 0 },
        PrecompileQuery::SpotPx { index: 0 },
        PrecompileQuery::L1BlockNumber,
        PrecompileQuery::PerpAssetInfo { perp: 0 },
        PrecompileQuery::SpotInfo { spot: 0 },
        PrecompileQuery::TokenInfo { token: 9 },
    ];

    for (precompile, query) in PRECOMPILES.iter().zip(queries) {
        assert_eq!(query.precompile(), precompile.kind);
        let calldata = query.encode().unwrap();
        assert!(
            fixture
                .core
                .call_precompile(precompile.address, &calldata)
                .is_ok(),
            "{} failed",
            precompile.name
        );
    }
}

#[test]
fn malformed_calldata_is_rejected() {
    let fixture = deploy_hypercore_fixture().unwrap();
    let result = fixture.core.call_precompile(SPOT_BALANCE.address, &[0u8; 31]);
    assert!(matches!(
        result,
        Err(BridgeError::Precompile(PrecompileError::InvalidCalldata {
            precompile: "SPOT_BALANCE",
            ..
        }))
    ));

    let result = fixture
        .core
        .call_precompile(Address::from_low_u64_be(0x80d), &[]);
    assert!(matches!(
        result,
        Err(BridgeError::Precompile(PrecompileError::NotAPrecompile(_)))
    ));
}
