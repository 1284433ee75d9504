//! Backing key/value store for nanoledger.
//!
//! The trie engine consumes storage only through the [`KvStore`] contract:
//! raw byte keys and values, existence checks and deletion. No ordering or
//! iteration is required, which keeps the contract satisfiable by nearly
//! any embedded store. The provided adapter is [`SledDb`].

pub mod sled_db;

pub use sled_db::SledDb;

use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, KvError>;

/// Contract for a byte-oriented persistent store.
///
/// `get` distinguishes absence (`Ok(None)`) from failure (`Err`); callers
/// decide whether absence is an error at their own layer.
pub trait KvStore {
    /// Store a value under a key, replacing any previous value.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Fetch the value stored under a key, or `None` when absent.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Check whether a key is present.
    fn exists(&self, key: &[u8]) -> Result<bool>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Push pending writes to durable storage.
    fn flush(&self) -> Result<()>;
}
