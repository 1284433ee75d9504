//! Content-addressed radix trie state store for nanoledger.
//!
//! The trie maps raw byte keys to raw byte values and commits the whole
//! mapping under a single 256-bit root hash:
//! - keys are re-expressed as hex-nibble paths, so branches can split
//!   inside a byte
//! - every node is stored in the backing [`KvStore`] under the hash of
//!   its canonical encoding, and values under the hash of their bytes,
//!   so identical content is stored once
//! - nodes are never rewritten: a store produces new nodes along one
//!   root-to-leaf path and shares everything else with prior versions
//!
//! Two tries built from the same key/value mappings hash to the same
//! root regardless of insertion order.
//!
//! # Example
//!
//! ```rust,no_run
//! use nanoledger_kvstore::SledDb;
//! use nanoledger_trie::State;
//!
//! let db = SledDb::open("./state").unwrap();
//! let mut state = State::empty(&db);
//! state.store(b"hello", b"world").unwrap();
//! let root = state.root();
//!
//! // any committed root reopens the exact mapping it was captured from
//! let reopened = State::open(&db, root).unwrap();
//! assert_eq!(reopened.load(b"hello").unwrap(), b"world");
//! ```

pub mod error;
pub mod node;
pub mod path;
pub mod state;

// Re-export commonly used types
pub use error::{Result, TrieError};
pub use node::{Child, TrieNode};
pub use state::State;
