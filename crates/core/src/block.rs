//! Block headers and bodies.
//!
//! Blocks here are a shell around the state commitment: the header embeds
//! the trie root after executing the body's transactions. Sealing and
//! validation live with external collaborators.

use crate::crypto::Address;
use crate::hash::{hash, Hash};
use crate::transaction::{Receipt, Transaction};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// State trie root after executing this block.
    pub state_root: Hash,
    /// Hash of the parent header.
    pub parent_hash: Hash,
    /// Block height, 0 for genesis.
    pub height: u64,
    /// Address credited for producing the block.
    pub coinbase: Address,
    /// Unix timestamp in seconds, stamped at finalization.
    pub timestamp: u64,
    /// Sealing nonce; stays 0, mining is not modeled.
    pub nonce: u64,
}

impl Header {
    /// The genesis header: empty state, no parent.
    pub fn genesis(coinbase: Address) -> Self {
        Self {
            state_root: Hash::ZERO,
            parent_hash: Hash::ZERO,
            height: 0,
            coinbase,
            timestamp: current_timestamp(),
            nonce: 0,
        }
    }

    /// Start the header following `parent`. The parent's state root is
    /// carried forward until the new block is finalized with its own.
    pub fn next(parent: &Header) -> Self {
        Self {
            state_root: parent.state_root,
            parent_hash: parent.hash(),
            height: parent.height + 1,
            coinbase: Address::ZERO,
            timestamp: 0,
            nonce: 0,
        }
    }

    /// Hash of the canonical header encoding.
    pub fn hash(&self) -> Hash {
        let encoded = bincode::serialize(self).expect("serialization should not fail");
        hash(&encoded)
    }
}

/// Block body: the transactions packed into the block and their receipts,
/// index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub transactions: Vec<Transaction>,
    pub receipts: Vec<Receipt>,
}

impl Body {
    /// An empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transactions in the body.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True when no transactions have been packed.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Record an executed transaction and its receipt.
    pub fn push(&mut self, tx: Transaction, receipt: Receipt) {
        self.transactions.push(tx);
        self.receipts.push(receipt);
    }
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_secs()
}
