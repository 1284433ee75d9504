//! Ledger orchestration for nanoledger.
//!
//! Everything that consumes the trie state store lives here:
//! - **StateDb**: the typed account façade over the raw trie
//! - **StateMachine**: the single-operation transfer executor
//! - **TxPool**: the pending-transaction pool
//! - **BlockMaker**: deadline-bounded packing and header finalization
//!
//! # Example
//!
//! ```rust,no_run
//! use nanoledger_chain::{BlockMaker, ChainConfig, TrieStateDb, TxPool};
//! use nanoledger_core::Header;
//! use nanoledger_kvstore::SledDb;
//!
//! let db = SledDb::open("./ledger").unwrap();
//! let mut state = TrieStateDb::empty(&db);
//! let mut pool = TxPool::new();
//!
//! let mut maker = BlockMaker::new(ChainConfig::default());
//! maker.new_block(&Header::genesis(Default::default()));
//! maker.pack(&mut state, &mut pool).unwrap();
//! let (header, body) = maker.finalize(&state).unwrap();
//! ```

pub mod machine;
pub mod maker;
pub mod pool;
pub mod statedb;

// Re-export commonly used types
pub use machine::StateMachine;
pub use maker::{BlockMaker, Chain, ChainConfig, MakerError};
pub use pool::{PoolConfig, PoolError, TxPool};
pub use statedb::{StateDb, StateDbError, TrieStateDb};
