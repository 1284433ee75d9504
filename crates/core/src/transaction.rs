//! Transactions and execution receipts.

use crate::crypto::{Address, Keypair, PublicKey, Signature};
use crate::hash::{hash, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gas charged for a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Errors from transaction signing and verification.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("sender address does not match public key")]
    SenderMismatch,
}

/// A transfer transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's sequence number.
    pub nonce: u64,
    /// Sender's address.
    pub from: Address,
    /// Recipient's address.
    pub to: Address,
    /// Value to transfer.
    pub value: u64,
    /// Gas offered.
    pub gas_limit: u64,
    /// Price per unit of gas.
    pub gas_price: u64,
    /// Opaque payload; unused by the transfer machine.
    pub input: Vec<u8>,
    /// Sender's signature over the unsigned payload hash.
    pub signature: Signature,
}

/// The fields covered by the signature.
#[derive(Serialize)]
struct UnsignedTransaction<'a> {
    nonce: u64,
    from: &'a Address,
    to: &'a Address,
    value: u64,
    gas_limit: u64,
    gas_price: u64,
    input: &'a [u8],
}

impl Transaction {
    /// Create an unsigned transfer.
    pub fn transfer(from: Address, to: Address, value: u64, nonce: u64, gas_price: u64) -> Self {
        Self {
            nonce,
            from,
            to,
            value,
            gas_limit: TRANSFER_GAS,
            gas_price,
            input: Vec::new(),
            signature: Signature::default(),
        }
    }

    /// Hash of the unsigned payload, the message that gets signed.
    pub fn signing_hash(&self) -> Hash {
        let unsigned = UnsignedTransaction {
            nonce: self.nonce,
            from: &self.from,
            to: &self.to,
            value: self.value,
            gas_limit: self.gas_limit,
            gas_price: self.gas_price,
            input: &self.input,
        };
        let encoded = bincode::serialize(&unsigned).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Hash of the full transaction, signature included.
    pub fn hash(&self) -> Hash {
        let encoded = bincode::serialize(self).expect("serialization should not fail");
        hash(&encoded)
    }

    /// Maximum the sender can be charged: value plus the full gas budget.
    pub fn cost(&self) -> u64 {
        self.value
            .saturating_add(self.gas_limit.saturating_mul(self.gas_price))
    }

    /// Sign in place with the given keypair.
    pub fn sign(&mut self, keypair: &Keypair) {
        self.signature = keypair.sign_hash(&self.signing_hash());
    }

    /// Builder-style signing.
    pub fn signed(mut self, keypair: &Keypair) -> Self {
        self.sign(keypair);
        self
    }

    /// Verify the signature and that the claimed sender owns the key.
    pub fn verify(&self, public_key: &PublicKey) -> Result<(), TransactionError> {
        if public_key.to_address() != self.from {
            return Err(TransactionError::SenderMismatch);
        }
        public_key
            .verify(self.signing_hash().as_bytes(), &self.signature)
            .map_err(|_| TransactionError::VerificationFailed)
    }
}

/// Outcome of executing one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Hash of the executed transaction.
    pub tx_hash: Hash,
    /// Whether the transfer was applied.
    pub success: bool,
    /// Gas actually consumed.
    pub gas_used: u64,
}

impl Receipt {
    /// Receipt for an applied transaction.
    pub fn success(tx_hash: Hash, gas_used: u64) -> Self {
        Self {
            tx_hash,
            success: true,
            gas_used,
        }
    }

    /// Receipt for a rejected transaction; no gas is charged because no
    /// state was touched.
    pub fn failure(tx_hash: Hash) -> Self {
        Self {
            tx_hash,
            success: false,
            gas_used: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_defaults() {
        let tx = Transaction::transfer(Address([1; 20]), Address([2; 20]), 500, 0, 2);
        assert_eq!(tx.gas_limit, TRANSFER_GAS);
        assert!(tx.input.is_empty());
        assert_eq!(tx.cost(), 500 + TRANSFER_GAS * 2);
    }

    #[test]
    fn test_sign_and_verify() {
        let kp = Keypair::generate();
        let tx = Transaction::transfer(kp.address(), Address([2; 20]), 100, 0, 1).signed(&kp);
        assert!(tx.verify(&kp.public_key).is_ok());
    }

    #[test]
    fn test_verify_rejects_foreign_key() {
        let kp = Keypair::generate();
        let other = Keypair::generate();
        let tx = Transaction::transfer(kp.address(), Address([2; 20]), 100, 0, 1).signed(&kp);
        assert!(matches!(
            tx.verify(&other.public_key),
            Err(TransactionError::SenderMismatch)
        ));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let kp = Keypair::generate();
        let mut tx = Transaction::transfer(kp.address(), Address([2; 20]), 100, 0, 1).signed(&kp);
        tx.value = 1_000_000;
        assert!(matches!(
            tx.verify(&kp.public_key),
            Err(TransactionError::VerificationFailed)
        ));
    }

    #[test]
    fn test_hash_covers_signature() {
        let kp = Keypair::generate();
        let unsigned = Transaction::transfer(kp.address(), Address([2; 20]), 100, 0, 1);
        let signed = unsigned.clone().signed(&kp);
        assert_eq!(unsigned.signing_hash(), signed.signing_hash());
        assert_ne!(unsigned.hash(), signed.hash());
    }

    #[test]
    fn test_receipts() {
        let h = crate::hash::hash(b"tx");
        assert!(Receipt::success(h, TRANSFER_GAS).success);
        let failed = Receipt::failure(h);
        assert!(!failed.success);
        assert_eq!(failed.gas_used, 0);
    }
}
