//! Apply step of the action queue.
//!
//! Each action is first planned against the current ledger: the plan holds every write the
//! action makes, or the reason it is dropped. Nothing is written until the plan is complete,
//! so a dropped action never leaves a partial mutation behind.
//!
//! Withdrawals also pay out on the EVM side. The payout is checked before the ledger commit
//! and made after it, so an action that fails to commit has paid nothing.

use ethereum_types::{Address, U256};
use hypercore_common::{
    types::{
        Action, ActionOutcome, BridgeConfig, DropReason, LedgerUpdate, TokenId, TokenInfo,
        UserVaultEquity,
    },
    utils::{ConversionError, core_to_evm, evm_to_core, rescale},
};
use hypercore_storage::{LedgerStore, error::StoreError};
use tracing::{debug, warn};

use crate::{
    error::BridgeError,
    evm::{EvmAsset, EvmBackend},
};

/// Chain state the apply step reads besides the ledger.
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext {
    pub config: BridgeConfig,
    /// Milliseconds
    pub timestamp: u64,
}

/// Value paid out on the EVM side when a withdrawal is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EvmCredit {
    asset: EvmAsset,
    system_address: Address,
    to: Address,
    amount: U256,
    /// Restores the ledger if the payout fails after the commit
    rollback: LedgerUpdate,
}

#[derive(Debug, Default)]
struct Plan {
    update: LedgerUpdate,
    evm_credit: Option<EvmCredit>,
}

impl From<LedgerUpdate> for Plan {
    fn from(update: LedgerUpdate) -> Self {
        Self {
            update,
            evm_credit: None,
        }
    }
}

enum PlanError {
    Dropped(DropReason),
    Store(StoreError),
}

impl From<DropReason> for PlanError {
    fn from(reason: DropReason) -> Self {
        PlanError::Dropped(reason)
    }
}

impl From<StoreError> for PlanError {
    fn from(error: StoreError) -> Self {
        PlanError::Store(error)
    }
}

impl From<ConversionError> for PlanError {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::Overflow => PlanError::Dropped(DropReason::AmountOverflow),
            ConversionError::PrecisionLoss => PlanError::Dropped(DropReason::PrecisionLoss),
        }
    }
}

type PlanResult = Result<Plan, PlanError>;

/// Applies a single action. Precondition failures are reported as
/// [`ActionOutcome::Dropped`]; only store failures are errors.
pub fn apply_action(
    store: &LedgerStore,
    evm: &mut dyn EvmBackend,
    ctx: &ApplyContext,
    action: &Action,
) -> Result<ActionOutcome, BridgeError> {
    let planned = match action {
        Action::Deposit {
            account,
            token,
            amount,
        } => plan_deposit(store, *account, *token, *amount),
        Action::SpotSend {
            from,
            to,
            token,
            amount,
        } => plan_spot_send(store, ctx, *from, *to, *token, *amount),
        Action::ClassTransfer {
            account,
            amount,
            to_perp,
        } => plan_class_transfer(store, ctx, *account, *amount, *to_perp),
        Action::VaultTransfer {
            account,
            vault,
            amount,
            is_deposit,
        } => plan_vault_transfer(store, ctx, *account, *vault, *amount, *is_deposit),
    };

    let plan = match planned {
        Ok(plan) => plan,
        Err(PlanError::Dropped(reason)) => return Ok(dropped(action, reason)),
        Err(PlanError::Store(error)) => return Err(error.into()),
    };

    let Plan { update, evm_credit } = plan;
    if let Some(credit) = &evm_credit {
        if let Err(error) =
            evm.check_release(credit.asset, credit.system_address, credit.to, credit.amount)
        {
            debug!(%error, "EVM credit rejected");
            return Ok(dropped(action, DropReason::EvmCreditFailed));
        }
    }

    store.apply_update(update)?;

    if let Some(credit) = evm_credit {
        if let Err(error) = evm.release(credit.asset, credit.system_address, credit.to, credit.amount)
        {
            warn!(%error, "EVM credit failed after ledger commit, restoring ledger");
            store.apply_update(credit.rollback)?;
            return Ok(dropped(action, DropReason::EvmCreditFailed));
        }
    }

    debug!(
        kind = action.kind(),
        account = %format!("{:#x}", action.account()),
        "Applied action"
    );
    Ok(ActionOutcome::Applied)
}

fn dropped(action: &Action, reason: DropReason) -> ActionOutcome {
    debug!(
        kind = action.kind(),
        account = %format!("{:#x}", action.account()),
        %reason,
        "Dropped action"
    );
    ActionOutcome::Dropped(reason)
}

fn token_info(store: &LedgerStore, token: TokenId) -> Result<TokenInfo, PlanError> {
    store
        .get_token_info(token)?
        .ok_or(PlanError::Dropped(DropReason::UnknownToken))
}

fn ensure_account(store: &LedgerStore, account: Address) -> Result<(), PlanError> {
    if store.account_exists(account)? {
        Ok(())
    } else {
        Err(DropReason::AccountNotFound.into())
    }
}

fn plan_deposit(store: &LedgerStore, account: Address, token: TokenId, amount: U256) -> PlanResult {
    ensure_account(store, account)?;
    let info = token_info(store, token)?;

    // Dust below ledger precision stays on the system address
    let (credit, _dust) = evm_to_core(amount, info.evm_extra_wei_decimals)?;
    let balance = store
        .read_spot_balance(account, token)?
        .credited(credit)
        .ok_or(DropReason::AmountOverflow)?;

    Ok(LedgerUpdate::new()
        .set_spot_balance(account, token, balance)
        .into())
}

fn plan_spot_send(
    store: &LedgerStore,
    ctx: &ApplyContext,
    from: Address,
    to: Address,
    token: TokenId,
    amount: u64,
) -> PlanResult {
    ensure_account(store, from)?;
    let info = token_info(store, token)?;
    let balance = store.read_spot_balance(from, token)?;
    let debited = balance
        .debited(amount)
        .ok_or(DropReason::InsufficientBalance)?;

    if let Some(system_token) = ctx.config.system_token(to) {
        let credit = plan_withdrawal(ctx, &info, from, to, token, system_token, amount)?;
        return Ok(Plan {
            update: LedgerUpdate::new().set_spot_balance(from, token, debited),
            evm_credit: Some(EvmCredit {
                rollback: LedgerUpdate::new().set_spot_balance(from, token, balance),
                ..credit
            }),
        });
    }

    if from == to {
        return Ok(Plan::default());
    }

    let credited = store
        .read_spot_balance(to, token)?
        .credited(amount)
        .ok_or(DropReason::AmountOverflow)?;

    Ok(LedgerUpdate::new()
        .create_account(to)
        .set_spot_balance(from, token, debited)
        .set_spot_balance(to, token, credited)
        .into())
}

fn plan_withdrawal(
    ctx: &ApplyContext,
    info: &TokenInfo,
    from: Address,
    system_address: Address,
    token: TokenId,
    system_token: TokenId,
    amount: u64,
) -> Result<EvmCredit, PlanError> {
    if system_token != token {
        return Err(DropReason::SystemAddressMismatch.into());
    }

    let asset = if token == ctx.config.native_token {
        EvmAsset::Native
    } else if info.is_linked() {
        EvmAsset::SpotErc20(info.evm_contract)
    } else {
        return Err(DropReason::TokenNotLinked.into());
    };
    let evm_amount = core_to_evm(amount, info.evm_extra_wei_decimals)?;

    Ok(EvmCredit {
        asset,
        system_address,
        to: from,
        amount: evm_amount,
        rollback: LedgerUpdate::new(),
    })
}

fn plan_class_transfer(
    store: &LedgerStore,
    ctx: &ApplyContext,
    account: Address,
    amount: u64,
    to_perp: bool,
) -> PlanResult {
    ensure_account(store, account)?;
    let usd_token = ctx.config.usd_token;
    let info = token_info(store, usd_token)?;
    let spot_amount = rescale(amount, ctx.config.perp_usd_decimals, info.wei_decimals)?;

    let spot = store.read_spot_balance(account, usd_token)?;
    let withdrawable = store.read_withdrawable(account)?;

    let (spot, withdrawable) = if to_perp {
        (
            spot.debited(spot_amount)
                .ok_or(DropReason::InsufficientBalance)?,
            withdrawable
                .checked_add(amount)
                .ok_or(DropReason::AmountOverflow)?,
        )
    } else {
        (
            spot.credited(spot_amount)
                .ok_or(DropReason::AmountOverflow)?,
            withdrawable
                .checked_sub(amount)
                .ok_or(DropReason::InsufficientBalance)?,
        )
    };

    Ok(LedgerUpdate::new()
        .set_spot_balance(account, usd_token, spot)
        .set_withdrawable(account, withdrawable)
        .into())
}

fn plan_vault_transfer(
    store: &LedgerStore,
    ctx: &ApplyContext,
    account: Address,
    vault: Address,
    amount: u64,
    is_deposit: bool,
) -> PlanResult {
    ensure_account(store, account)?;
    let equity = store.read_user_vault_equity(account, vault)?;
    let withdrawable = store.read_withdrawable(account)?;

    let (equity, withdrawable) = if is_deposit {
        let locked_until_timestamp =
            equity.deposit_lock(ctx.timestamp, ctx.config.vault_deposit_lockup_ms);
        let equity = UserVaultEquity {
            equity: equity
                .equity
                .checked_add(amount)
                .ok_or(DropReason::AmountOverflow)?,
            locked_until_timestamp,
        };
        let withdrawable = withdrawable
            .checked_sub(amount)
            .ok_or(DropReason::InsufficientBalance)?;
        (equity, withdrawable)
    } else {
        if equity.is_locked_at(ctx.timestamp) {
            return Err(DropReason::VaultLocked.into());
        }
        let equity = UserVaultEquity {
            equity: equity
                .equity
                .checked_sub(amount)
                .ok_or(DropReason::InsufficientBalance)?,
            ..equity
        };
        let withdrawable = withdrawable
            .checked_add(amount)
            .ok_or(DropReason::AmountOverflow)?;
        (equity, withdrawable)
    };

    Ok(LedgerUpdate::new()
        .set_vault_equity(account, vault, equity)
        .set_withdrawable(account, withdrawable)
        .into())
}
