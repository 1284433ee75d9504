//! Trie errors.

use nanoledger_core::Hash;
use nanoledger_kvstore::KvError;
use thiserror::Error;

/// Errors from trie operations.
///
/// `NotFound` signals legitimate absence and is the only recoverable
/// variant; `MissingNode` and `Decode` indicate storage-level damage and
/// are never folded into `NotFound`.
#[derive(Debug, Error)]
pub enum TrieError {
    #[error("key not found")]
    NotFound,

    #[error("empty key")]
    EmptyKey,

    /// The key's path ends on an interior node or runs past an existing
    /// leaf. Fixed-width keys (addresses) never produce this.
    #[error("key is a path prefix of an existing entry, or extends one")]
    PrefixCollision,

    /// A node referenced by the structure is absent from the backing
    /// store. Raised at construction for the root and during walks for
    /// interior nodes.
    #[error("missing trie node {0}")]
    MissingNode(Hash),

    /// A stored entry exists but is not a canonical node encoding.
    #[error("corrupt trie node {0}: {1}")]
    Decode(Hash, bincode::Error),

    #[error("storage error: {0}")]
    Store(#[from] KvError),
}

/// Result type for trie operations.
pub type Result<T> = std::result::Result<T, TrieError>;
