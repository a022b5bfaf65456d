// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - TRANSACTION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::balance_sheet::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Reward transactions carry this distinguished `data` value: they credit
/// `to` without debiting `from` (a system-issued reward embedded in a
/// block, distinct from the per-block mining reward).
pub const REWARD_DATA: &str = "reward";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    New,
    Accepted,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tx {
    pub id: String,
    pub from: Address,
    pub to: Address,
    pub value: Amount,
    pub tip: Amount,
    pub gas: Amount,
    pub data: String,
    pub status: TxStatus,
    pub status_info: String,
}

impl Tx {
    pub fn is_reward(&self) -> bool {
        self.data == REWARD_DATA
    }

    pub fn mark_accepted(&mut self) {
        self.status = TxStatus::Accepted;
        self.status_info.clear();
    }

    pub fn mark_error(&mut self, reason: impl Into<String>) {
        self.status = TxStatus::Error;
        self.status_info = reason.into();
    }
}

/// Process-local monotonic counter, mixed with a random salt, used to mint
/// unique tx ids without pulling in a `uuid` dependency the kept crates
/// don't otherwise need. Grounded in the nonce-seeding-by-hash approach in
/// `chainstate_core::pow`.
static TX_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn new_tx_id(salt: u64) -> String {
    let seq = TX_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:016x}{:016x}", salt, seq)
}
