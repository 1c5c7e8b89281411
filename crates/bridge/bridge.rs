//! Bridge between a simulated ledger and its EVM side.
//!
//! Writes coming from the EVM side (spot sends, class transfers, vault transfers and
//! deposits through system addresses) are queued as [`Action`]s and applied in submission
//! order on [`HyperCore::flush_action_queue`]. Reads go straight to the ledger, either
//! through [`HyperCore`] or through the read precompiles.
//!
//! [`Action`]: hypercore_common::types::Action

pub mod apply;
pub mod codec;
pub mod error;
pub mod evm;
pub mod gateway;
pub mod hypercore;
pub mod precompiles;
pub mod queue;

pub use apply::{ApplyContext, apply_action};
pub use codec::{deserialize_withdraw_request, serialize_withdraw_request};
pub use error::BridgeError;
pub use evm::{EvmAsset, EvmBackend, EvmError, EvmState, SpotErc20, spot_erc20_address};
pub use gateway::{BridgeGateway, Routing};
pub use hypercore::{HyperCore, SystemCallOutput};
pub use precompiles::{PrecompileError, PrecompileQuery, ReadPrecompile, execute_precompile};
pub use queue::{ActionQueue, ActionReceipt, FlushReport, QueuedAction};
