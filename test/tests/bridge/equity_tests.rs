use ethereum_types::Address;
use hypercore_common::types::{ActionOutcome, DropReason, UserVaultEquity};
use hypercore_test::{GENESIS_TIMESTAMP, deploy_hypercore_fixture, scale_u64};

fn vault() -> Address {
    Address::from_low_u64_be(0x123)
}

#[test]
fn transferring_into_vault_equity_succeeds() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_perp(users[0], scale_u64(10, 6)).unwrap();

    core.send_vault_transfer(users[0], vault(), scale_u64(6, 6), true);
    core.flush_action_queue().unwrap();

    assert_eq!(core.read_withdrawable(users[0]).unwrap(), scale_u64(4, 6));
    let equity = core.read_user_vault_equity(users[0], vault()).unwrap();
    assert_eq!(equity.equity, scale_u64(6, 6));
}

#[test]
fn transferring_from_vault_equity_succeeds() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_vault_equity(users[0], vault(), scale_u64(10, 6), 1)
        .unwrap();

    core.send_vault_transfer(users[0], vault(), scale_u64(6, 6), false);
    core.flush_action_queue().unwrap();

    assert_eq!(core.read_withdrawable(users[0]).unwrap(), scale_u64(6, 6));
    let equity = core.read_user_vault_equity(users[0], vault()).unwrap();
    assert_eq!(equity.equity, scale_u64(4, 6));
}

#[test]
fn locked_vault_equity_is_not_withdrawn() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);
    let locked_until = GENESIS_TIMESTAMP + 1_000;

    core.force_vault_equity(users[0], vault(), scale_u64(10, 6), locked_until)
        .unwrap();

    core.send_vault_transfer(users[0], vault(), scale_u64(6, 6), false);
    let report = core.flush_action_queue().unwrap();

    assert_eq!(
        report.receipts[0].outcome,
        ActionOutcome::Dropped(DropReason::VaultLocked)
    );
    assert_eq!(core.read_withdrawable(users[0]).unwrap(), 0);

    // Unlocked exactly at the lock timestamp
    core.set_timestamp(locked_until).unwrap();
    core.send_vault_transfer(users[0], vault(), scale_u64(6, 6), false);
    core.flush_action_queue().unwrap();

    assert_eq!(core.read_withdrawable(users[0]).unwrap(), scale_u64(6, 6));
    assert_eq!(
        core.read_user_vault_equity(users[0], vault()).unwrap(),
        UserVaultEquity {
            equity: scale_u64(4, 6),
            locked_until_timestamp: locked_until,
        }
    );
}

#[test]
fn equity_without_unlock_time_stays_locked() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_vault_equity(users[0], vault(), scale_u64(10, 6), 0)
        .unwrap();

    core.send_vault_transfer(users[0], vault(), scale_u64(6, 6), false);
    let report = core.flush_action_queue().unwrap();

    assert_eq!(
        report.receipts[0].outcome,
        ActionOutcome::Dropped(DropReason::VaultLocked)
    );
    assert_eq!(core.read_withdrawable(users[0]).unwrap(), 0);
    assert_eq!(
        core.read_user_vault_equity(users[0], vault()).unwrap().equity,
        scale_u64(10, 6)
    );
}

#[test]
fn withdrawing_more_than_equity_is_dropped() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_vault_equity(users[0], vault(), 5, 1).unwrap();
    core.send_vault_transfer(users[0], vault(), 6, false);
    let report = core.flush_action_queue().unwrap();

    assert_eq!(
        report.receipts[0].outcome,
        ActionOutcome::Dropped(DropReason::InsufficientBalance)
    );
    assert_eq!(core.read_user_vault_equity(users[0], vault()).unwrap().equity, 5);
}

#[test]
fn depositing_more_than_withdrawable_is_dropped() {
    let mut fixture = deploy_hypercore_fixture().unwrap();
    let (core, users) = (&mut fixture.core, fixture.users);

    core.force_perp(users[0], 5).unwrap();
    core.send_vault_transfer(users[0], vault(), 6, true);
    core.flush_action_queue().unwrap();

    assert_eq!(core.read_withdrawable(users[0]).unwrap(), 5);
    assert_eq!(
        core.read_user_vault_equity(users[0], vault()).unwrap(),
        UserVaultEquity::default()
    );
}
