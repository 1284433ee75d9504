//! Block assembly.
//!
//! The maker drains the pool through the transfer machine under a
//! deadline, then finalizes a header carrying the resulting state root.
//! Sealing is stubbed: headers go out with a zero nonce.

use crate::machine::StateMachine;
use crate::pool::TxPool;
use crate::statedb::{StateDb, StateDbError};
use nanoledger_core::{current_timestamp, Address, Body, Header};
use std::mem;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

/// Errors from block assembly.
#[derive(Debug, Error)]
pub enum MakerError {
    #[error("no block in progress")]
    NoOpenBlock,

    #[error("state error: {0}")]
    State(#[from] StateDbError),
}

/// Result type for block assembly.
pub type Result<T> = std::result::Result<T, MakerError>;

/// Block production parameters.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// How long `pack` keeps pulling transactions before giving up.
    pub block_interval: Duration,
    /// Address stamped as the block producer.
    pub coinbase: Address,
    /// Difficulty recorded for the chain; unused while sealing is stubbed.
    pub difficulty: u64,
    /// Hard cap on transactions per block.
    pub max_txs: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            block_interval: Duration::from_secs(5),
            coinbase: Address::ZERO,
            difficulty: 1,
            max_txs: 1_000,
        }
    }
}

/// Assembles blocks from pool transactions.
pub struct BlockMaker {
    config: ChainConfig,
    machine: StateMachine,
    header: Option<Header>,
    body: Body,
}

impl BlockMaker {
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config,
            machine: StateMachine::new(),
            header: None,
            body: Body::new(),
        }
    }

    /// Start assembling the block that follows `parent`. Any block in
    /// progress is discarded.
    pub fn new_block(&mut self, parent: &Header) {
        let mut header = Header::next(parent);
        header.coinbase = self.config.coinbase;
        self.header = Some(header);
        self.body = Body::new();
    }

    /// Pull transactions from the pool and execute them into the open
    /// block until the pool drains, the per-block cap is reached or the
    /// configured interval elapses. Returns the number packed.
    pub fn pack<S: StateDb>(&mut self, state: &mut S, pool: &mut TxPool) -> Result<usize> {
        if self.header.is_none() {
            return Err(MakerError::NoOpenBlock);
        }
        let deadline = Instant::now() + self.config.block_interval;
        let mut packed = 0;

        while packed < self.config.max_txs && Instant::now() < deadline {
            let Some(tx) = pool.pop() else {
                break;
            };
            let receipt = self.machine.execute(state, &tx)?;
            self.body.push(tx, receipt);
            packed += 1;
        }
        Ok(packed)
    }

    /// Close the open block: stamp the timestamp, embed the state
    /// commitment and hand the header/body pair to the caller.
    pub fn finalize<S: StateDb>(&mut self, state: &S) -> Result<(Header, Body)> {
        let mut header = self.header.take().ok_or(MakerError::NoOpenBlock)?;
        header.state_root = state.state_root();
        header.timestamp = current_timestamp();
        header.nonce = 0;

        let body = mem::take(&mut self.body);
        info!(
            height = header.height,
            txs = body.len(),
            state_root = %header.state_root,
            "finalized block"
        );
        Ok((header, body))
    }
}

/// The chain shell: tracks the current head header.
pub struct Chain {
    head: Header,
}

impl Chain {
    /// Start a chain at the given genesis header.
    pub fn new(genesis: Header) -> Self {
        Self { head: genesis }
    }

    /// The current head header.
    pub fn head(&self) -> &Header {
        &self.head
    }

    /// Accept a finalized block as the new head. Rejects headers that do
    /// not extend the current head.
    pub fn advance(&mut self, header: Header) -> bool {
        if header.parent_hash != self.head.hash() || header.height != self.head.height + 1 {
            return false;
        }
        self.head = header;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statedb::TrieStateDb;
    use nanoledger_core::{Account, Hash, Transaction};
    use nanoledger_kvstore::SledDb;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    #[test]
    fn test_pack_requires_open_block() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let mut pool = TxPool::new();
        let mut maker = BlockMaker::new(ChainConfig::default());

        assert!(matches!(
            maker.pack(&mut state, &mut pool),
            Err(MakerError::NoOpenBlock)
        ));
        assert!(matches!(
            maker.finalize(&state),
            Err(MakerError::NoOpenBlock)
        ));
    }

    #[test]
    fn test_pack_and_finalize() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let (alice, bob) = (addr(1), addr(2));
        state
            .put_account(&alice, &Account::with_balance(10_000_000))
            .unwrap();

        let mut pool = TxPool::new();
        for nonce in 0..3 {
            pool.submit(Transaction::transfer(alice, bob, 100, nonce, 1), &state)
                .unwrap();
        }

        let genesis = Header::genesis(addr(9));
        let mut maker = BlockMaker::new(ChainConfig {
            coinbase: addr(9),
            ..ChainConfig::default()
        });
        maker.new_block(&genesis);

        let packed = maker.pack(&mut state, &mut pool).unwrap();
        assert_eq!(packed, 3);
        assert!(pool.is_empty());

        let (header, body) = maker.finalize(&state).unwrap();
        assert_eq!(header.height, 1);
        assert_eq!(header.parent_hash, genesis.hash());
        assert_eq!(header.coinbase, addr(9));
        assert_eq!(header.state_root, state.state_root());
        assert_ne!(header.state_root, Hash::ZERO);
        assert_eq!(body.len(), 3);
        assert!(body.receipts.iter().all(|r| r.success));
    }

    #[test]
    fn test_max_txs_cap() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let alice = addr(1);
        state
            .put_account(&alice, &Account::with_balance(10_000_000))
            .unwrap();

        let mut pool = TxPool::new();
        for nonce in 0..5 {
            pool.submit(
                Transaction::transfer(alice, addr(2), 1, nonce, 1),
                &state,
            )
            .unwrap();
        }

        let mut maker = BlockMaker::new(ChainConfig {
            max_txs: 2,
            ..ChainConfig::default()
        });
        maker.new_block(&Header::genesis(Address::ZERO));

        assert_eq!(maker.pack(&mut state, &mut pool).unwrap(), 2);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_chain_advance() {
        let genesis = Header::genesis(addr(1));
        let mut chain = Chain::new(genesis.clone());

        let mut next = Header::next(&genesis);
        next.timestamp = current_timestamp();
        assert!(chain.advance(next.clone()));
        assert_eq!(chain.head().height, 1);

        // a header that does not extend the head is refused
        let stray = Header::next(&genesis);
        assert!(!chain.advance(stray));
        assert_eq!(chain.head().hash(), next.hash());
    }
}
