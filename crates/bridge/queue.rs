use std::collections::VecDeque;

use hypercore_common::types::{Action, ActionOutcome};
use hypercore_storage::LedgerStore;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    apply::{ApplyContext, apply_action},
    error::BridgeError,
    evm::EvmBackend,
};

/// Action waiting for the next flush, tagged with its submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedAction {
    pub sequence: u64,
    pub action: Action,
}

/// Result of one action of a flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReceipt {
    pub sequence: u64,
    pub action: Action,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlushReport {
    /// Block number after the flush
    pub l1_block_number: u64,
    pub receipts: Vec<ActionReceipt>,
}

impl FlushReport {
    pub fn applied(&self) -> usize {
        self.receipts
            .iter()
            .filter(|receipt| receipt.outcome.is_applied())
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.receipts.len() - self.applied()
    }
}

/// Append-only FIFO of pending actions. Nothing runs until [`ActionQueue::flush`].
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: VecDeque<QueuedAction>,
    next_sequence: u64,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `action` and returns its sequence number.
    pub fn enqueue(&mut self, action: Action) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        debug!(sequence, kind = action.kind(), "Queued action");
        self.pending.push_back(QueuedAction { sequence, action });
        sequence
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &QueuedAction> {
        self.pending.iter()
    }

    /// Applies every pending action in submission order. Dropped actions don't stop the
    /// flush; they are reported in the receipts.
    ///
    /// If applying an action fails with a hard error, that action and the ones after it
    /// stay queued and the error is returned.
    pub fn flush(
        &mut self,
        store: &LedgerStore,
        evm: &mut dyn EvmBackend,
        ctx: &ApplyContext,
    ) -> Result<Vec<ActionReceipt>, BridgeError> {
        let mut receipts = Vec::with_capacity(self.pending.len());

        while let Some(queued) = self.pending.pop_front() {
            match apply_action(store, evm, ctx, &queued.action) {
                Ok(outcome) => receipts.push(ActionReceipt {
                    sequence: queued.sequence,
                    action: queued.action,
                    outcome,
                }),
                Err(error) => {
                    let sequence = queued.sequence;
                    self.pending.push_front(queued);
                    return Err(BridgeError::FlushInterrupted {
                        sequence,
                        applied: receipts.len(),
                        source: Box::new(error),
                    });
                }
            }
        }

        info!(
            actions = receipts.len(),
            applied = receipts.iter().filter(|r| r.outcome.is_applied()).count(),
            "Flushed action queue"
        );
        Ok(receipts)
    }
}
