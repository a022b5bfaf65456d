// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - BLOCK & HEADER
//
// Hashing mirrors the teacher's field-by-field SHA3-256 over a Block's
// canonical encoding (`los_core::Block::calculate_hash`): feed every header
// field into the hasher in a fixed order, including the nonce, then
// hex-encode the digest. No bincode/borsh — a handful of `update()` calls
// keeps the encoding obviously canonical without another dependency.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::balance_sheet::{Address, Amount};
use crate::tx::Tx;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// Distinguished value: no real header hash ever hashes to this, since a
/// SHA3-256 hex digest is never the literal all-zero string.
pub const ZERO_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub parent_hash: String,
    pub beneficiary: Address,
    pub difficulty: u32,
    pub nonce: u64,
    pub total_gas: Amount,
    pub total_tip: Amount,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Tx>,
}

/// The on-disk record: the block plus its own hash, so replay never needs
/// to recompute the hash of historical entries to know the chain of
/// parent_hash links held at write time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockFs {
    pub hash: String,
    pub block: Block,
}

impl Header {
    /// Canonical SHA3-256 hex digest of this header, nonce included.
    pub fn hash(&self) -> String {
        let mut hasher = Sha3_256::new();
        hasher.update(self.number.to_be_bytes());
        hasher.update(self.parent_hash.as_bytes());
        hasher.update(self.beneficiary.as_bytes());
        hasher.update(self.difficulty.to_be_bytes());
        hasher.update(self.nonce.to_be_bytes());
        hasher.update(self.total_gas.to_be_bytes());
        hasher.update(self.total_tip.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Block {
    pub fn hash(&self) -> String {
        self.header.hash()
    }
}

/// The block at the very start of the chain (number 0), before genesis's
/// first mined block. Its hash is never computed and never referenced as a
/// parent; it exists so `State` always has a `latest` to compare against.
pub fn zero_block() -> Block {
    Block {
        header: Header {
            number: 0,
            parent_hash: ZERO_HASH.to_string(),
            beneficiary: String::new(),
            difficulty: 0,
            nonce: 0,
            total_gas: 0,
            total_tip: 0,
            timestamp: 0,
        },
        transactions: Vec::new(),
    }
}
