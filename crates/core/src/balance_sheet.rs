// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - BALANCE SHEET
//
// BTreeMap, not HashMap: two nodes that replay the same block log must
// arrive at byte-identical serialized balances, and BTreeMap's iteration
// order is the map's key order rather than a hasher-dependent one.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::error::StateError;
use crate::tx::Tx;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type Address = String;
pub type Amount = u128;

pub type BalanceSheet = BTreeMap<Address, Amount>;

pub fn balance_of(bs: &BalanceSheet, addr: &str) -> Amount {
    bs.get(addr).copied().unwrap_or(0)
}

pub fn credit(bs: &mut BalanceSheet, addr: &str, amount: Amount) {
    *bs.entry(addr.to_string()).or_insert(0) += amount;
}

/// Saturating: a correctly-validated tx never debits more than the sender
/// holds, but the tip carry-forward in [`apply_mining_fee`] can legitimately
/// walk a balance to exactly zero across two debits of the same amount, and
/// replaying a historical log must never panic on arithmetic underflow.
pub fn debit(bs: &mut BalanceSheet, addr: &str, amount: Amount) {
    let entry = bs.entry(addr.to_string()).or_insert(0);
    *entry = entry.saturating_sub(amount);
}

/// Applies one transaction's balance effects. A tx already marked `Error`
/// is a no-op (replaying a block must reproduce exactly what was recorded,
/// including transactions that failed at mining time). Does not touch
/// `tx.status` itself; callers decide whether a returned `Err` marks the tx
/// as errored or aborts the whole block.
pub fn apply_tx(bs: &mut BalanceSheet, tx: &Tx) -> Result<(), StateError> {
    if tx.status == crate::tx::TxStatus::Error {
        return Ok(());
    }
    if tx.is_reward() {
        credit(bs, &tx.to, tx.value);
        return Ok(());
    }

    if tx.from == tx.to {
        return Err(StateError::SelfTransfer);
    }

    let available = balance_of(bs, &tx.from);
    if available < tx.value {
        return Err(StateError::InsufficientBalance);
    }

    debit(bs, &tx.from, tx.value);
    credit(bs, &tx.to, tx.value);
    Ok(())
}

/// `gas + tip`, credited to the beneficiary and debited from `tx.from`. The
/// tip half of this debit lands on top of the one `apply_tx` already took —
/// a double-debit of the paying account that must be preserved exactly as
/// observed for bit-identical replay against historical block logs, not
/// because it is the obviously right model.
pub fn apply_mining_fee(bs: &mut BalanceSheet, beneficiary: &str, tx: &Tx) {
    if tx.is_reward() {
        return;
    }
    let fee = tx.gas.saturating_add(tx.tip);
    if fee == 0 {
        return;
    }
    debit(bs, &tx.from, fee);
    credit(bs, beneficiary, fee);
}

pub fn apply_mining_reward(bs: &mut BalanceSheet, miner: &str, reward: Amount) {
    credit(bs, miner, reward);
}
