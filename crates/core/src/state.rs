// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - STATE CORE
//
// A single mutex guards every piece of authoritative state: balance sheet,
// mempool, latest block, open log, known peers. Grounded in the teacher's
// `fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T>` (los-node/main.rs):
// a poisoned lock is recovered rather than propagated as a panic, since one
// participant thread panicking mid-mutation must not wedge every other
// caller for the rest of the process's life.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::balance_sheet::{apply_mining_fee, apply_mining_reward, apply_tx, Address, Amount, BalanceSheet};
use crate::block::{zero_block, Block, Header};
use crate::error::StateError;
use crate::event::{emit, EventSink, Severity};
use crate::genesis::Genesis;
use crate::mempool::Mempool;
use crate::persistence::Log;
use crate::pow;
use crate::tx::{new_tx_id, Tx, TxStatus};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Recovers from lock poisoning instead of panicking; a prior panicking
/// holder must not wedge every future caller.
fn safe_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

struct StateInner {
    balances: BalanceSheet,
    mempool: Mempool,
    latest: Block,
    log: Log,
    peers: HashSet<String>,
}

pub struct State {
    genesis: Genesis,
    self_host: String,
    inner: Mutex<StateInner>,
    sink: EventSink,
}

/// What a caller of [`State::add_transactions`] should do next. Neither
/// field is acted on by `State` itself — the caller holds the `Worker`.
pub struct AddTransactionsOutcome {
    pub should_mine: bool,
    pub share: Option<Vec<Tx>>,
}

impl State {
    /// Opens (or creates) the block log at `log_path`, replays it against a
    /// fresh copy of `genesis.founder_balances`, and returns a ready-to-use
    /// core. `self_host` is excluded from `known_peers` and from `add_peer`.
    pub fn open(
        genesis: Genesis,
        log_path: impl AsRef<Path>,
        self_host: impl Into<String>,
        sink: EventSink,
    ) -> Result<Self, StateError> {
        let log = Log::open(log_path)?;
        let records = log.load_and_replay()?;

        let mut balances = genesis.founder_balances.clone();
        let mut latest = zero_block();

        for record in &records {
            for tx in &record.block.transactions {
                apply_tx(&mut balances, tx).ok();
                if tx.status == TxStatus::Accepted {
                    apply_mining_fee(&mut balances, &record.block.header.beneficiary, tx);
                }
            }
            apply_mining_reward(
                &mut balances,
                &record.block.header.beneficiary,
                genesis.mining_reward,
            );
            latest = record.block.clone();
        }

        emit(
            &sink,
            Severity::Info,
            format!("replayed {} blocks, tip is number {}", records.len(), latest.header.number),
        );

        Ok(Self {
            genesis,
            self_host: self_host.into(),
            inner: Mutex::new(StateInner {
                balances,
                mempool: Mempool::new(),
                latest,
                log,
                peers: HashSet::new(),
            }),
            sink,
        })
    }

    pub fn genesis_snapshot(&self) -> Genesis {
        self.genesis.clone()
    }

    /// Builds a transaction with a fresh id, status `New`, and `gas` copied
    /// from the genesis gas price. No side effects on state.
    pub fn new_tx(&self, from: impl Into<Address>, to: impl Into<Address>, value: Amount, tip: Amount, data: impl Into<String>) -> Tx {
        Tx {
            id: new_tx_id(now_unix()),
            from: from.into(),
            to: to.into(),
            value,
            tip,
            gas: self.genesis.gas_price,
            data: data.into(),
            status: TxStatus::New,
            status_info: String::new(),
        }
    }

    /// Adds each tx to the mempool serially. `share` mirrors spec.md §4.5's
    /// `add_transactions(txs, share)`: when true, the returned outcome
    /// carries the batch back so the caller can signal the worker to
    /// gossip it. `should_mine` is set once the mempool reaches
    /// `genesis.trans_per_block`, so the caller can signal `start_mining`.
    /// The State core itself never touches the worker directly.
    pub fn add_transactions(&self, txs: Vec<Tx>, share: bool) -> AddTransactionsOutcome {
        let batch = if share { Some(txs.clone()) } else { None };
        let mut inner = safe_lock(&self.inner);
        for tx in txs {
            inner.mempool.add(tx);
        }
        let should_mine = inner.mempool.count() as u32 >= self.genesis.trans_per_block;
        AddTransactionsOutcome { should_mine, share: batch }
    }

    pub fn mempool_length(&self) -> usize {
        safe_lock(&self.inner).mempool.count()
    }

    pub fn mempool_snapshot(&self) -> Vec<Tx> {
        safe_lock(&self.inner).mempool.snapshot()
    }

    pub fn balance_sheet_snapshot(&self) -> BalanceSheet {
        safe_lock(&self.inner).balances.clone()
    }

    pub fn balance_for(&self, address: &str) -> Amount {
        crate::balance_sheet::balance_of(&safe_lock(&self.inner).balances, address)
    }

    pub fn latest_block(&self) -> Block {
        safe_lock(&self.inner).latest.clone()
    }

    pub fn known_peers(&self) -> Vec<String> {
        safe_lock(&self.inner).peers.iter().cloned().collect()
    }

    pub fn add_peer(&self, peer: impl Into<String>) -> Result<(), StateError> {
        let peer = peer.into();
        if peer == self.self_host {
            return Err(StateError::AlreadyExists);
        }
        safe_lock(&self.inner).peers.insert(peer);
        Ok(())
    }

    pub fn blocks_by_number(&self, from: u64, to: u64) -> Result<Vec<Block>, StateError> {
        let inner = safe_lock(&self.inner);
        let records = inner.log.load_and_replay()?;
        Ok(records
            .into_iter()
            .map(|r| r.block)
            .filter(|b| b.header.number >= from && b.header.number <= to)
            .collect())
    }

    /// Empty `addr` returns every block, matching spec's "empty addr returns
    /// all blocks" clause.
    pub fn blocks_by_address(&self, addr: &str) -> Result<Vec<Block>, StateError> {
        let inner = safe_lock(&self.inner);
        let records = inner.log.load_and_replay()?;
        Ok(records
            .into_iter()
            .map(|r| r.block)
            .filter(|b| {
                addr.is_empty()
                    || b.header.beneficiary == addr
                    || b.transactions.iter().any(|tx| tx.from == addr || tx.to == addr)
            })
            .collect())
    }

    /// Validates and commits a peer-supplied block, in the order spec.md
    /// §4.5 gives: PoW soundness, fork distance, exact successor number,
    /// then parent linkage.
    pub fn accept_block(&self, block: Block) -> Result<(), StateError> {
        let mut inner = safe_lock(&self.inner);

        if !pow::is_hash_solved(self.genesis.difficulty, &block.hash()) {
            return Err(StateError::InvalidHash);
        }
        if block.header.number >= inner.latest.header.number + 2 {
            return Err(StateError::ChainForked);
        }
        if block.header.number != inner.latest.header.number + 1 {
            return Err(StateError::WrongNumber);
        }
        if block.header.parent_hash != inner.latest.hash() {
            return Err(StateError::WrongParent);
        }

        for tx in &block.transactions {
            apply_tx(&mut inner.balances, tx).ok();
            if tx.status == TxStatus::Accepted {
                apply_mining_fee(&mut inner.balances, &block.header.beneficiary, tx);
            }
        }
        apply_mining_reward(&mut inner.balances, &block.header.beneficiary, self.genesis.mining_reward);

        let hash = block.hash();
        inner.log.append(&hash, &block)?;
        for tx in &block.transactions {
            inner.mempool.remove(&tx.id);
        }
        inner.latest = block;

        emit(&self.sink, Severity::Info, format!("accepted block {}", inner.latest.header.number));
        Ok(())
    }

    /// Stops nothing on its own (the Worker owns lifecycle); flushes and
    /// drops the log handle by dropping State. Exposed for symmetry with
    /// spec.md's `shutdown()`, which additionally stops the worker — that
    /// half happens in the Worker, which holds its own reference to State.
    pub fn shutdown(&self) {
        emit(&self.sink, Severity::Info, "state core shutting down");
    }

    /// Discards the current log and balance sheet, resetting to genesis.
    /// Mirrors spec.md §4.4's Truncate: close, remove, reopen empty, reset
    /// balances/mempool/latest, signal the worker to reconcile (left to the
    /// caller, which owns the Worker handle).
    pub fn truncate(&self) -> Result<(), StateError> {
        let mut inner = safe_lock(&self.inner);
        inner.log.truncate()?;
        inner.balances = self.genesis.founder_balances.clone();
        inner.mempool = Mempool::new();
        inner.latest = zero_block();
        emit(&self.sink, Severity::Warn, "block log truncated, state reset to genesis");
        Ok(())
    }

    /// Implements spec.md §4.5.1's five-step mining protocol. `cancel` is
    /// checked by the PoW search at nonce granularity and again immediately
    /// after it returns, before anything is committed.
    pub fn mine_new_block(&self, beneficiary: &str, cancel: &AtomicBool) -> Result<(Block, Duration), StateError> {
        let (mut candidate, mut balances, parent_hash, parent_number) = {
            let mut inner = safe_lock(&self.inner);
            if (inner.mempool.count() as u32) < self.genesis.trans_per_block {
                return Err(StateError::NotEnoughTransactions);
            }
            let txs = inner.mempool.take(self.genesis.trans_per_block as usize);
            let balances = inner.balances.clone();
            let header = Header {
                number: inner.latest.header.number + 1,
                parent_hash: inner.latest.hash(),
                beneficiary: beneficiary.to_string(),
                difficulty: self.genesis.difficulty,
                nonce: 0,
                total_gas: 0,
                total_tip: 0,
                timestamp: now_unix(),
            };
            let parent_hash = header.parent_hash.clone();
            let parent_number = inner.latest.header.number;
            (Block { header, transactions: txs }, balances, parent_hash, parent_number)
        };

        let mut total_gas: Amount = 0;
        let mut total_tip: Amount = 0;
        for tx in candidate.transactions.iter_mut() {
            match apply_tx(&mut balances, tx) {
                Ok(()) => {
                    tx.mark_accepted();
                    apply_mining_fee(&mut balances, beneficiary, tx);
                    total_gas = total_gas.saturating_add(tx.gas);
                    total_tip = total_tip.saturating_add(tx.tip);
                }
                Err(e) => tx.mark_error(e.to_string()),
            }
        }
        apply_mining_reward(&mut balances, beneficiary, self.genesis.mining_reward);
        candidate.header.total_gas = total_gas;
        candidate.header.total_tip = total_tip;

        if cancel.load(std::sync::atomic::Ordering::Relaxed) {
            self.requeue(candidate.transactions);
            return Err(StateError::Cancelled);
        }

        let (hash, elapsed) = match pow::solve(&mut candidate, self.genesis.difficulty, cancel) {
            Ok(result) => result,
            Err(e) => {
                self.requeue(candidate.transactions);
                return Err(e);
            }
        };

        if cancel.load(std::sync::atomic::Ordering::Relaxed) {
            self.requeue(candidate.transactions);
            return Err(StateError::Cancelled);
        }

        let mut inner = safe_lock(&self.inner);
        if inner.latest.header.number != parent_number || inner.latest.hash() != parent_hash {
            drop(inner);
            self.requeue(candidate.transactions);
            return Err(StateError::StaleTip);
        }

        inner.log.append(&hash, &candidate)?;
        inner.balances = balances;
        for tx in &candidate.transactions {
            inner.mempool.remove(&tx.id);
        }
        inner.latest = candidate.clone();
        drop(inner);

        emit(&self.sink, Severity::Info, format!("mined block {} in {:?}", candidate.header.number, elapsed));
        Ok((candidate, elapsed))
    }

    fn requeue(&self, txs: Vec<Tx>) {
        let mut inner = safe_lock(&self.inner);
        inner.mempool.requeue_front(txs);
    }
}

pub type SharedState = Arc<State>;
