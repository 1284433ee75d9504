//! Core ledger primitives for nanoledger.
//!
//! This crate provides the types shared across the node:
//! - Blake3 hashing and the 256-bit [`Hash`] used for all content addressing
//! - Ed25519 keys, signatures and account [`Address`]es
//! - [`Account`] records as stored in the state trie
//! - [`Transaction`]s, [`Receipt`]s and the block [`Header`]/[`Body`] shell

pub mod account;
pub mod block;
pub mod crypto;
pub mod hash;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use account::Account;
pub use block::{current_timestamp, Body, Header};
pub use crypto::{Address, CryptoError, Keypair, PublicKey, Signature};
pub use hash::{hash, Hash, H256};
pub use transaction::{Receipt, Transaction, TransactionError, TRANSFER_GAS};
