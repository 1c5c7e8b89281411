use ethereum_types::{Address, U256};
use eyre::{OptionExt, WrapErr};
use hypercore_bridge::{FlushReport, HyperCore, Routing};
use hypercore_common::{
    serde_utils,
    types::{CoreWriterAction, TokenId, TokenInfo},
};
use hypercore_storage::LedgerSnapshot;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One scenario step. EVM amounts accept decimal or `0x` hex strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Step {
    RegisterToken {
        token: TokenId,
        info: TokenInfo,
    },
    DeploySpotErc20 {
        token: TokenId,
    },
    CreateAccount {
        account: Address,
    },
    SetNativeBalance {
        account: Address,
        #[serde(with = "serde_utils::u256::hex_or_dec_str")]
        balance: U256,
    },
    /// Mints spot token contract balance on the EVM side.
    Mint {
        token: TokenId,
        to: Address,
        #[serde(with = "serde_utils::u256::hex_or_dec_str")]
        amount: U256,
    },
    TransferToken {
        token: TokenId,
        from: Address,
        to: Address,
        #[serde(with = "serde_utils::u256::hex_or_dec_str")]
        amount: U256,
    },
    TransferNative {
        from: Address,
        to: Address,
        #[serde(with = "serde_utils::u256::hex_or_dec_str")]
        amount: U256,
    },
    SendSpot {
        from: Address,
        to: Address,
        token: TokenId,
        amount: u64,
    },
    UsdClassTransfer {
        account: Address,
        ntl: u64,
        to_perp: bool,
    },
    VaultTransfer {
        account: Address,
        vault: Address,
        usd: u64,
        is_deposit: bool,
    },
    /// Raw action sent to the write system contract.
    CoreWriter {
        sender: Address,
        action: CoreWriterAction,
    },
    ForceSpot {
        account: Address,
        token: TokenId,
        total: u64,
    },
    ForcePerp {
        account: Address,
        amount: u64,
    },
    ForceVaultEquity {
        account: Address,
        vault: Address,
        equity: u64,
        locked_until_timestamp: u64,
    },
    AdvanceTime {
        millis: u64,
    },
    Flush,
}

/// Final state written by the simulator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutput {
    pub timestamp: u64,
    pub l1_block_number: u64,
    pub flushes: Vec<FlushReport>,
    /// Actions still queued at the end of the scenario
    pub pending_actions: usize,
    pub ledger: LedgerSnapshot,
}

pub fn run_scenario(core: &mut HyperCore, steps: &[Step]) -> eyre::Result<ScenarioOutput> {
    let mut flushes = Vec::new();

    for (index, step) in steps.iter().enumerate() {
        debug!(index, ?step, "Running step");
        if let Some(report) =
            run_step(core, step).wrap_err_with(|| format!("step {index} failed: {step:?}"))?
        {
            info!(
                l1_block_number = report.l1_block_number,
                applied = report.applied(),
                dropped = report.dropped(),
                "Flushed"
            );
            flushes.push(report);
        }
    }

    Ok(ScenarioOutput {
        timestamp: core.timestamp(),
        l1_block_number: core.l1_block_number(),
        flushes,
        pending_actions: core.pending_actions().count(),
        ledger: core.snapshot()?,
    })
}

fn token_contract(core: &HyperCore, token: TokenId) -> eyre::Result<Address> {
    let info = core.read_token_info(token)?;
    info.is_linked()
        .then_some(info.evm_contract)
        .ok_or_eyre(format!("token {token} has no spot token contract"))
}

fn log_routing(routing: Routing) {
    if let Routing::Queued(sequence) = routing {
        debug!(sequence, "Transfer queued a deposit");
    }
}

fn run_step(core: &mut HyperCore, step: &Step) -> eyre::Result<Option<FlushReport>> {
    match step.clone() {
        Step::RegisterToken { token, info } => core.register_token_info(token, info)?,
        Step::DeploySpotErc20 { token } => {
            let address = core.deploy_spot_erc20(token)?;
            debug!(token, address = %format!("{address:#x}"), "Deployed");
        }
        Step::CreateAccount { account } => core.force_account_creation(account)?,
        Step::SetNativeBalance { account, balance } => core.set_native_balance(account, balance),
        Step::Mint { token, to, amount } => {
            let contract = token_contract(core, token)?;
            core.mint(contract, to, amount)?;
        }
        Step::TransferToken {
            token,
            from,
            to,
            amount,
        } => {
            let contract = token_contract(core, token)?;
            log_routing(core.transfer_token(contract, from, to, amount)?);
        }
        Step::TransferNative { from, to, amount } => {
            log_routing(core.transfer_native(from, to, amount)?);
        }
        Step::SendSpot {
            from,
            to,
            token,
            amount,
        } => {
            core.send_spot(from, to, token, amount);
        }
        Step::UsdClassTransfer {
            account,
            ntl,
            to_perp,
        } => {
            core.send_usd_class_transfer(account, ntl, to_perp);
        }
        Step::VaultTransfer {
            account,
            vault,
            usd,
            is_deposit,
        } => {
            core.send_vault_transfer(account, vault, usd, is_deposit);
        }
        Step::CoreWriter { sender, action } => {
            let raw = action.encode()?;
            let core_writer = core.config().core_writer_address;
            core.call(sender, core_writer, &raw)?;
        }
        Step::ForceSpot {
            account,
            token,
            total,
        } => core.force_spot(account, token, total)?,
        Step::ForcePerp { account, amount } => core.force_perp(account, amount)?,
        Step::ForceVaultEquity {
            account,
            vault,
            equity,
            locked_until_timestamp,
        } => core.force_vault_equity(account, vault, equity, locked_until_timestamp)?,
        Step::AdvanceTime { millis } => {
            core.advance_time(millis);
        }
        Step::Flush => return Ok(Some(core.flush_action_queue()?)),
    }
    Ok(None)
}
