// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - ERROR KINDS
//
// One enum for every disposition a caller of the state core needs to
// distinguish. No thiserror/anyhow: plain Display + std::error::Error,
// matching the rest of this codebase's hand-rolled error style.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// mine_new_block: mempool has fewer than genesis.trans_per_block entries.
    NotEnoughTransactions,
    /// accept_block: header hash does not satisfy the difficulty predicate.
    InvalidHash,
    /// accept_block: incoming block is two or more ahead of the tip.
    ChainForked,
    /// accept_block: incoming block number is not exactly latest + 1.
    WrongNumber,
    /// accept_block: incoming block's parent_hash doesn't match the tip's hash.
    WrongParent,
    /// apply_tx: sender balance is below the transaction value.
    InsufficientBalance,
    /// apply_tx: from == to.
    SelfTransfer,
    /// mine_new_block: cancellation token was set before or during PoW.
    Cancelled,
    /// mine_new_block: the tip moved between snapshot and commit.
    StaleTip,
    /// add_peer: the peer's host matches this node's own host.
    AlreadyExists,
    /// persistence: an I/O or (de)serialization failure while reading or
    /// writing the block log.
    Io(String),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::NotEnoughTransactions => write!(f, "not enough transactions pooled"),
            StateError::InvalidHash => write!(f, "block hash does not meet difficulty"),
            StateError::ChainForked => write!(f, "peer block forked from the current tip"),
            StateError::WrongNumber => write!(f, "block number is not latest + 1"),
            StateError::WrongParent => write!(f, "block parent_hash does not match the tip"),
            StateError::InsufficientBalance => write!(f, "insufficient balance"),
            StateError::SelfTransfer => write!(f, "self-transfer"),
            StateError::Cancelled => write!(f, "mining cancelled"),
            StateError::StaleTip => write!(f, "tip advanced before commit, candidate discarded"),
            StateError::AlreadyExists => write!(f, "peer already known"),
            StateError::Io(msg) => write!(f, "io error: {msg}"),
        }
    }
}

impl std::error::Error for StateError {}
