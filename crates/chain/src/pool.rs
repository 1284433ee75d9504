//! Pending-transaction pool.
//!
//! Admission consults a read-only account view: transactions at or below
//! the sender's executed nonce are rejected, the next expected nonce goes
//! to the pending set, and gapped nonces wait in a future queue until the
//! gap closes. A pending transaction can be replaced by one with the same
//! nonce and an equal-or-better gas price. `pop` drains pending
//! transactions best-gas-price first while preserving each sender's
//! nonce order.

use crate::statedb::{StateDb, StateDbError};
use nanoledger_core::{Address, Hash, Transaction};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use thiserror::Error;
use tracing::debug;

/// Errors from pool admission.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("transaction already known")]
    Duplicate,

    #[error("stale nonce (sender is at {expected}, got {got})")]
    StaleNonce { expected: u64, got: u64 },

    #[error("replacement underpriced (incumbent gas price {0})")]
    Underpriced(u64),

    #[error("pool is full (capacity {0})")]
    PoolFull(usize),

    #[error("state error: {0}")]
    State(#[from] StateDbError),
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;

/// Pool capacity limits.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum transactions held across all senders.
    pub max_transactions: usize,
    /// Maximum transactions held per sender, pending and queued combined.
    pub max_per_sender: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 4_096,
            max_per_sender: 64,
        }
    }
}

/// The pending-transaction pool.
pub struct TxPool {
    config: PoolConfig,
    /// Hashes of everything currently held.
    known: HashSet<Hash>,
    /// Runnable transactions per sender, contiguous ascending nonces.
    pending: HashMap<Address, VecDeque<Transaction>>,
    /// Nonce-gapped transactions waiting for the gap to close.
    queued: HashMap<Address, BTreeMap<u64, Transaction>>,
}

impl TxPool {
    /// Create a pool with default limits.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool with the given limits.
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            config,
            known: HashSet::new(),
            pending: HashMap::new(),
            queued: HashMap::new(),
        }
    }

    /// Number of transactions held, pending and queued.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// True when nothing is held.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Whether a transaction is currently held.
    pub fn contains(&self, tx_hash: &Hash) -> bool {
        self.known.contains(tx_hash)
    }

    /// Admit a transaction, consulting `state` for the sender's nonce.
    pub fn submit<S: StateDb>(&mut self, tx: Transaction, state: &S) -> Result<()> {
        let tx_hash = tx.hash();
        if self.known.contains(&tx_hash) {
            return Err(PoolError::Duplicate);
        }

        let executed = state.account(&tx.from)?.map(|a| a.nonce).unwrap_or(0);
        if tx.nonce < executed {
            return Err(PoolError::StaleNonce {
                expected: executed,
                got: tx.nonce,
            });
        }

        // [base, next) is the sender's pending nonce run; an empty run
        // starts at the executed nonce
        let (base, next) = match self.pending.get(&tx.from) {
            Some(run) => {
                let base = run.front().expect("pending runs are non-empty").nonce;
                (base, base + run.len() as u64)
            }
            None => (executed, executed),
        };

        if tx.nonce < base {
            // older than anything pending: already being packed
            return Err(PoolError::StaleNonce {
                expected: base,
                got: tx.nonce,
            });
        }
        if tx.nonce < next {
            return self.replace(tx, tx_hash);
        }
        if tx.nonce == next {
            self.push_pending(tx, tx_hash)
        } else {
            self.push_queued(tx, tx_hash)
        }
    }

    /// Take the best-priced runnable transaction, keeping per-sender
    /// nonce order. Ties break on the sender address so draining is
    /// deterministic.
    pub fn pop(&mut self) -> Option<Transaction> {
        let best = self
            .pending
            .iter()
            .filter_map(|(addr, txs)| txs.front().map(|tx| (tx.gas_price, *addr)))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))?
            .1;

        let txs = self.pending.get_mut(&best)?;
        let tx = txs.pop_front()?;
        if txs.is_empty() {
            self.pending.remove(&best);
        }
        self.known.remove(&tx.hash());
        Some(tx)
    }

    /// Forget transactions that made it into a block.
    pub fn remove_committed(&mut self, txs: &[Transaction]) {
        for tx in txs {
            let tx_hash = tx.hash();
            if !self.known.remove(&tx_hash) {
                continue;
            }
            if let Some(pending) = self.pending.get_mut(&tx.from) {
                pending.retain(|t| t.hash() != tx_hash);
            }
            if let Some(queued) = self.queued.get_mut(&tx.from) {
                queued.retain(|_, t| t.hash() != tx_hash);
            }
            self.drop_if_empty(&tx.from);
        }
    }

    fn capacity_check(&self, sender: &Address) -> Result<()> {
        if self.known.len() >= self.config.max_transactions {
            return Err(PoolError::PoolFull(self.config.max_transactions));
        }
        let held = self.pending.get(sender).map_or(0, VecDeque::len)
            + self.queued.get(sender).map_or(0, BTreeMap::len);
        if held >= self.config.max_per_sender {
            return Err(PoolError::PoolFull(self.config.max_per_sender));
        }
        Ok(())
    }

    fn replace(&mut self, tx: Transaction, tx_hash: Hash) -> Result<()> {
        let pending = self
            .pending
            .get_mut(&tx.from)
            .expect("replacement targets an existing pending run");
        let base = pending.front().expect("pending runs are non-empty").nonce;
        let slot = &mut pending[(tx.nonce - base) as usize];

        if tx.gas_price < slot.gas_price {
            return Err(PoolError::Underpriced(slot.gas_price));
        }
        debug!(nonce = tx.nonce, from = %tx.from, "replacing pending transaction");
        self.known.remove(&slot.hash());
        self.known.insert(tx_hash);
        *slot = tx;
        Ok(())
    }

    fn push_pending(&mut self, tx: Transaction, tx_hash: Hash) -> Result<()> {
        self.capacity_check(&tx.from)?;
        let sender = tx.from;
        debug!(nonce = tx.nonce, from = %sender, "admitting pending transaction");
        self.known.insert(tx_hash);
        self.pending.entry(sender).or_default().push_back(tx);
        self.promote(&sender);
        Ok(())
    }

    fn push_queued(&mut self, tx: Transaction, tx_hash: Hash) -> Result<()> {
        self.capacity_check(&tx.from)?;
        debug!(nonce = tx.nonce, from = %tx.from, "queueing gapped transaction");
        self.known.insert(tx_hash);
        self.queued.entry(tx.from).or_default().insert(tx.nonce, tx);
        Ok(())
    }

    /// Move queued transactions whose gap just closed into pending.
    fn promote(&mut self, sender: &Address) {
        let Some(queued) = self.queued.get_mut(sender) else {
            return;
        };
        let pending = self.pending.entry(*sender).or_default();
        while let Some(back) = pending.back() {
            let next = back.nonce + 1;
            match queued.remove(&next) {
                Some(tx) => pending.push_back(tx),
                None => break,
            }
        }
        if queued.is_empty() {
            self.queued.remove(sender);
        }
    }

    fn drop_if_empty(&mut self, sender: &Address) {
        if self.pending.get(sender).is_some_and(VecDeque::is_empty) {
            self.pending.remove(sender);
        }
        if self.queued.get(sender).is_some_and(BTreeMap::is_empty) {
            self.queued.remove(sender);
        }
    }
}

impl Default for TxPool {
    fn default() -> Self {
        Self::new()
    }
}
