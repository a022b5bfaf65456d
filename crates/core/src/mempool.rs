// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - MEMPOOL
//
// A HashMap keyed by tx id plus a Vec recording arrival order. The order
// vec is what mine_new_block drains from (oldest first); the map is what
// every lookup/removal goes through. Grounded in the side-index pattern
// from the teacher's node mempool (id -> record map, plus a secondary
// ordering structure kept in sync on every insert/remove).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::tx::Tx;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct Mempool {
    by_id: HashMap<String, Tx>,
    order: Vec<String>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tx: Tx) {
        if !self.by_id.contains_key(&tx.id) {
            self.order.push(tx.id.clone());
        }
        self.by_id.insert(tx.id.clone(), tx);
    }

    pub fn remove(&mut self, id: &str) -> Option<Tx> {
        let removed = self.by_id.remove(id);
        if removed.is_some() {
            self.order.retain(|existing| existing != id);
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Oldest-first view of every pooled tx, without removing them.
    pub fn snapshot(&self) -> Vec<Tx> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }

    /// Pulls the oldest `n` transactions out of the pool for inclusion in a
    /// candidate block. Fewer than `n` are returned if the pool is short.
    pub fn take(&mut self, n: usize) -> Vec<Tx> {
        let ids: Vec<String> = self.order.iter().take(n).cloned().collect();
        ids.into_iter()
            .filter_map(|id| self.remove(&id))
            .collect()
    }

    /// Puts transactions back at the front of the queue, preserving their
    /// relative order. Used when a mined block is discarded after PoW (the
    /// tip moved under it) so the included txs aren't lost.
    pub fn requeue_front(&mut self, txs: Vec<Tx>) {
        for tx in txs.into_iter().rev() {
            if !self.by_id.contains_key(&tx.id) {
                self.order.insert(0, tx.id.clone());
            }
            self.by_id.insert(tx.id.clone(), tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TxStatus;

    fn tx(id: &str) -> Tx {
        Tx {
            id: id.into(),
            from: "alice".into(),
            to: "bob".into(),
            value: 1,
            tip: 0,
            gas: 0,
            data: String::new(),
            status: TxStatus::New,
            status_info: String::new(),
        }
    }

    #[test]
    fn take_drains_oldest_first() {
        let mut pool = Mempool::new();
        pool.add(tx("a"));
        pool.add(tx("b"));
        pool.add(tx("c"));
        let taken = pool.take(2);
        assert_eq!(taken.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn requeue_front_restores_order_ahead_of_newer_entries() {
        let mut pool = Mempool::new();
        pool.add(tx("c"));
        let taken = pool.take(1);
        pool.add(tx("d"));
        pool.requeue_front(taken);
        let snap = pool.snapshot();
        assert_eq!(snap.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["c", "d"]);
    }

    #[test]
    fn remove_keeps_order_and_map_in_sync() {
        let mut pool = Mempool::new();
        pool.add(tx("a"));
        pool.add(tx("b"));
        pool.remove("a");
        assert!(!pool.contains("a"));
        assert_eq!(pool.snapshot().len(), 1);
    }
}
