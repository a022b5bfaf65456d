// End-to-end scenarios against a real State and a real on-disk log file,
// one per numbered case.

use chainstate_core::event::default_sink;
use chainstate_core::{BalanceSheet, Genesis, State, StateError};
use std::sync::atomic::AtomicBool;

fn genesis(difficulty: u32, trans_per_block: u32) -> Genesis {
    let mut founder_balances = BalanceSheet::new();
    founder_balances.insert("A".to_string(), 1000);
    founder_balances.insert("B".to_string(), 0);
    Genesis {
        founder_balances,
        mining_reward: 100,
        gas_price: 1,
        difficulty,
        trans_per_block,
    }
}

#[test]
fn scenario_1_mining_reflects_composition_and_empties_mempool() {
    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(1, 2), dir.path().join("blocks.log"), "self", default_sink()).unwrap();

    let t1 = state.new_tx("A", "B", 50, 2, "");
    let t2 = state.new_tx("A", "B", 30, 1, "");
    state.add_transactions(vec![t1, t2], false);

    let cancel = AtomicBool::new(false);
    let (block, _elapsed) = state.mine_new_block("miner", &cancel).unwrap();

    assert_eq!(block.header.number, 1);
    assert_eq!(state.mempool_length(), 0);

    // Each tx carries gas = genesis.gas_price = 1. A debits: 50 value + (1
    // gas + 2 tip) fee, then 30 value + (1 gas + 1 tip) fee = 85 total.
    assert_eq!(state.balance_for("A"), 915);
    assert_eq!(state.balance_for("B"), 80);
    assert_eq!(state.balance_for("miner"), 105);
}

#[test]
fn scenario_2_not_enough_transactions_leaves_state_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(1, 2), dir.path().join("blocks.log"), "self", default_sink()).unwrap();
    state.add_transactions(vec![state.new_tx("A", "B", 10, 0, "")], false);

    let cancel = AtomicBool::new(false);
    let err = state.mine_new_block("miner", &cancel).unwrap_err();
    assert_eq!(err, StateError::NotEnoughTransactions);
    assert_eq!(state.mempool_length(), 1);
    assert_eq!(state.latest_block().header.number, 0);
}

#[test]
fn scenario_3_peer_block_two_ahead_of_tip_is_chain_forked() {
    use chainstate_core::pow;

    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(1, 2), dir.path().join("blocks.log"), "self", default_sink()).unwrap();

    // latest.number is 0 (zero block); a peer block at number 3 is
    // latest + 3, well past the "one ahead" admission window.
    let mut forked = chainstate_core::block::zero_block();
    forked.header.number = 3;
    forked.header.parent_hash = chainstate_core::block::ZERO_HASH.to_string();
    forked.header.difficulty = 1;
    let cancel = AtomicBool::new(false);
    pow::solve(&mut forked, 1, &cancel).unwrap();

    let err = state.accept_block(forked).unwrap_err();
    assert_eq!(err, StateError::ChainForked);
}

#[test]
fn scenario_4_peer_block_with_zero_parent_is_rejected() {
    use chainstate_core::pow;

    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(1, 2), dir.path().join("blocks.log"), "self", default_sink()).unwrap();
    state.add_transactions(vec![state.new_tx("A", "B", 10, 0, ""), state.new_tx("A", "B", 5, 0, "")], false);
    let cancel = AtomicBool::new(false);
    state.mine_new_block("miner", &cancel).unwrap();

    let mut bogus = chainstate_core::block::zero_block();
    bogus.header.number = 2;
    bogus.header.parent_hash = chainstate_core::block::ZERO_HASH.to_string();
    bogus.header.difficulty = 1;
    pow::solve(&mut bogus, 1, &cancel).unwrap();

    let err = state.accept_block(bogus).unwrap_err();
    assert_eq!(err, StateError::WrongParent);
}

#[test]
fn scenario_5_self_transfer_is_marked_error_and_included_with_no_effect() {
    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(1, 2), dir.path().join("blocks.log"), "self", default_sink()).unwrap();

    let bad = state.new_tx("A", "A", 40, 3, "");
    let bad_id = bad.id.clone();
    let good = state.new_tx("A", "B", 10, 0, "");
    state.add_transactions(vec![bad, good], false);

    let cancel = AtomicBool::new(false);
    let (block, _elapsed) = state.mine_new_block("miner", &cancel).unwrap();

    let bad_in_block = block.transactions.iter().find(|t| t.id == bad_id).unwrap();
    assert_eq!(bad_in_block.status, chainstate_core::TxStatus::Error);
    assert_eq!(bad_in_block.status_info, "self-transfer");

    // Only the good tx's value (10) and fee (gas 1 + tip 0 = 1) moved; the
    // self-transfer neither changed A's balance nor paid a fee to miner.
    assert_eq!(state.balance_for("A"), 1000 - 10 - 1);
    assert_eq!(state.balance_for("B"), 10);
    assert_eq!(state.balance_for("miner"), 1 + 100);
}

#[test]
fn scenario_6_cancellation_during_pow_leaves_log_and_balances_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let state = State::open(genesis(64, 1), dir.path().join("blocks.log"), "self", default_sink()).unwrap();
    state.add_transactions(vec![state.new_tx("A", "B", 10, 0, "")], false);

    let cancel = AtomicBool::new(true);
    let err = state.mine_new_block("miner", &cancel).unwrap_err();
    assert_eq!(err, StateError::Cancelled);
    assert_eq!(state.latest_block().header.number, 0);
    assert_eq!(state.balance_for("A"), 1000);
    assert_eq!(state.mempool_length(), 1);
}

#[test]
fn replay_after_restart_reproduces_identical_balances() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("blocks.log");

    {
        let state = State::open(genesis(1, 2), &log_path, "self", default_sink()).unwrap();
        state.add_transactions(vec![state.new_tx("A", "B", 50, 2, ""), state.new_tx("A", "B", 30, 1, "")], false);
        let cancel = AtomicBool::new(false);
        state.mine_new_block("miner", &cancel).unwrap();
    }

    let reopened = State::open(genesis(1, 2), &log_path, "self", default_sink()).unwrap();
    assert_eq!(reopened.latest_block().header.number, 1);
    assert_eq!(reopened.balance_for("A"), 915);
    assert_eq!(reopened.balance_for("B"), 80);
    assert_eq!(reopened.balance_for("miner"), 105);
}

#[test]
fn scenario_7_truncate_after_two_blocks_resets_to_genesis() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("blocks.log");
    let state = State::open(genesis(1, 2), &log_path, "self", default_sink()).unwrap();

    state.add_transactions(vec![state.new_tx("A", "B", 10, 0, ""), state.new_tx("A", "B", 5, 0, "")], false);
    let cancel = AtomicBool::new(false);
    state.mine_new_block("miner", &cancel).unwrap();

    state.add_transactions(vec![state.new_tx("A", "B", 8, 0, ""), state.new_tx("A", "B", 2, 0, "")], false);
    state.mine_new_block("miner", &cancel).unwrap();
    assert_eq!(state.latest_block().header.number, 2);

    state.truncate().unwrap();
    assert_eq!(state.latest_block().header.number, 0);
    assert_eq!(state.balance_for("A"), 1000);
    assert_eq!(state.mempool_length(), 0);

    let log_contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(log_contents.is_empty());
}
