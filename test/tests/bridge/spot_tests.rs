use ethereum_types::U256;
use hypercore_bridge::Routing;
use hypercore_common::{
    constants::{NATIVE_SYSTEM_ADDRESS, USDC_TOKEN},
    types::{ActionOutcome, DropReason},
};
use hypercore_test::{
    INITIAL_NATIVE_BALANCE, KNOWN_TOKEN_HYPE, deploy_hypercore_fixture, scale, scale_u64,
    system_address,
};

#[test]
fn transferring_token_to_ledger_succeeds() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.mint(fixture.usdc, users[0], scale(10, 8)).unwrap();
    assert_eq!(core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total, 0);

    core.transfer_token(fixture.usdc, users[0], system_address(USDC_TOKEN), scale(5, 8))
        .unwrap();
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total,
        scale_u64(5, 8)
    );
    assert_eq!(
        core.token_balance(fixture.usdc, users[0]).unwrap(),
        scale(5, 8)
    );
}

#[test]
fn deposit_to_uncreated_account_is_dropped() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.mint(fixture.usdc, users[1], scale(10, 8)).unwrap();
    core.transfer_token(fixture.usdc, users[1], system_address(USDC_TOKEN), scale(5, 8))
        .unwrap();
    let report = core.flush_action_queue().unwrap();

    assert_eq!(
        report.receipts[0].outcome,
        ActionOutcome::Dropped(DropReason::AccountNotFound)
    );
    assert_eq!(core.read_spot_balance(users[1], USDC_TOKEN).unwrap().total, 0);
    assert!(!core.store().account_exists(users[1]).unwrap());
}

#[test]
fn transferring_native_gas_token_to_ledger_succeeds() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    assert_eq!(
        core.read_spot_balance(users[0], KNOWN_TOKEN_HYPE)
            .unwrap()
            .total,
        0
    );

    let routing = core
        .transfer_native(users[0], NATIVE_SYSTEM_ADDRESS, scale(1, 18))
        .unwrap();
    assert_eq!(routing, Routing::Queued(0));
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], KNOWN_TOKEN_HYPE)
            .unwrap()
            .total,
        scale_u64(1, 8)
    );
    assert_eq!(
        core.native_balance(users[0]),
        scale(INITIAL_NATIVE_BALANCE - 1, 18)
    );
}

#[test]
fn spot_send_between_ledger_accounts() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.mint(fixture.usdc, users[0], scale(10, 8)).unwrap();
    core.transfer_token(fixture.usdc, users[0], system_address(USDC_TOKEN), scale(10, 8))
        .unwrap();
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total,
        scale_u64(10, 8)
    );
    assert_eq!(core.read_spot_balance(users[1], USDC_TOKEN).unwrap().total, 0);

    core.send_spot(users[0], users[1], USDC_TOKEN, scale_u64(10, 8));
    core.flush_action_queue().unwrap();

    assert_eq!(core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total, 0);
    assert_eq!(
        core.read_spot_balance(users[1], USDC_TOKEN).unwrap().total,
        scale_u64(10, 8)
    );
    // The receiver is created by the send
    assert!(core.store().account_exists(users[1]).unwrap());

    core.send_spot(users[1], users[0], USDC_TOKEN, scale_u64(6, 8));
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total,
        scale_u64(6, 8)
    );
    assert_eq!(
        core.read_spot_balance(users[1], USDC_TOKEN).unwrap().total,
        scale_u64(4, 8)
    );
}

#[test]
fn spot_send_withdraws_token_to_evm() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.mint(fixture.usdc, users[0], scale(10, 8)).unwrap();
    core.transfer_token(fixture.usdc, users[0], system_address(USDC_TOKEN), scale(10, 8))
        .unwrap();
    core.flush_action_queue().unwrap();
    assert_eq!(core.token_balance(fixture.usdc, users[0]).unwrap(), U256::zero());

    core.send_spot(
        users[0],
        system_address(USDC_TOKEN),
        USDC_TOKEN,
        scale_u64(5, 8),
    );
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total,
        scale_u64(5, 8)
    );
    assert_eq!(
        core.token_balance(fixture.usdc, users[0]).unwrap(),
        scale(5, 8)
    );
    assert_eq!(
        core.token_balance(fixture.usdc, system_address(USDC_TOKEN))
            .unwrap(),
        scale(5, 8)
    );
}

#[test]
fn spot_send_withdraws_native_to_evm() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.transfer_native(users[0], NATIVE_SYSTEM_ADDRESS, scale(10, 18))
        .unwrap();
    core.flush_action_queue().unwrap();
    assert_eq!(
        core.read_spot_balance(users[0], KNOWN_TOKEN_HYPE)
            .unwrap()
            .total,
        scale_u64(10, 8)
    );

    core.send_spot(
        users[0],
        NATIVE_SYSTEM_ADDRESS,
        KNOWN_TOKEN_HYPE,
        scale_u64(5, 8),
    );
    core.flush_action_queue().unwrap();

    assert_eq!(
        core.read_spot_balance(users[0], KNOWN_TOKEN_HYPE)
            .unwrap()
            .total,
        scale_u64(5, 8)
    );
    assert_eq!(
        core.native_balance(users[0]),
        scale(INITIAL_NATIVE_BALANCE - 5, 18)
    );
}

#[test]
fn spot_send_above_balance_is_dropped() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_spot(users[0], USDC_TOKEN, 10).unwrap();
    core.send_spot(users[0], users[1], USDC_TOKEN, 11);
    let report = core.flush_action_queue().unwrap();

    assert_eq!(report.dropped(), 1);
    assert_eq!(core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total, 10);
    assert!(!core.store().account_exists(users[1]).unwrap());
}

#[test]
fn withdrawal_to_another_tokens_system_address_is_dropped() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_spot(users[0], USDC_TOKEN, 10).unwrap();
    core.send_spot(users[0], NATIVE_SYSTEM_ADDRESS, USDC_TOKEN, 5);
    let report = core.flush_action_queue().unwrap();

    assert_eq!(
        report.receipts[0].outcome,
        ActionOutcome::Dropped(DropReason::SystemAddressMismatch)
    );
    assert_eq!(core.read_spot_balance(users[0], USDC_TOKEN).unwrap().total, 10);
}
