// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE
//
// State management for a single participant in a small proof-of-work
// network: balances, mempool, blocks, genesis bootstrap, mining, on-disk
// replay, and the worker that drives mining off signals. Gossip, the HTTP
// surface, wallets, and transaction signatures live outside this crate.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod balance_sheet;
pub mod block;
pub mod error;
pub mod event;
pub mod genesis;
pub mod mempool;
pub mod persistence;
pub mod pow;
pub mod state;
pub mod tx;
pub mod worker;

pub use balance_sheet::{Address, Amount, BalanceSheet};
pub use block::{Block, Header};
pub use error::StateError;
pub use event::{EventSink, Severity};
pub use genesis::Genesis;
pub use mempool::Mempool;
pub use persistence::Log;
pub use state::{AddTransactionsOutcome, SharedState, State};
pub use tx::{Tx, TxStatus};
pub use worker::{GossipSink, NullGossip, Worker, WorkerSignal};
