//! Account records stored in the state trie.

use crate::hash::Hash;
use serde::{Deserialize, Serialize};

/// Per-account ledger record: balance and nonce, plus the code hash and
/// storage root carried for contract accounts (both zero for plain
/// accounts in this system).
///
/// Accounts live inside the state trie as bincode-encoded values keyed by
/// address, so the record itself carries no address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Balance in the native unit.
    pub balance: u64,
    /// Number of transactions sent from this account.
    pub nonce: u64,
    /// Hash of associated code; `Hash::ZERO` when there is none.
    pub code_hash: Hash,
    /// Root of the account's own storage trie; `Hash::ZERO` when empty.
    pub storage_root: Hash,
}

impl Account {
    /// Create an account with the given balance.
    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance,
            nonce: 0,
            code_hash: Hash::ZERO,
            storage_root: Hash::ZERO,
        }
    }

    /// Encode for storage in the state trie.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("serialization should not fail")
    }

    /// Decode an account previously stored in the state trie.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// Check the account can cover `amount`.
    pub fn has_balance(&self, amount: u64) -> bool {
        self.balance >= amount
    }

    /// Add to the balance, saturating at the top of the range.
    pub fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Subtract from the balance. Returns false and leaves the account
    /// untouched when funds are insufficient.
    pub fn debit(&mut self, amount: u64) -> bool {
        if self.balance >= amount {
            self.balance -= amount;
            true
        } else {
            false
        }
    }

    /// Increment the nonce.
    pub fn increment_nonce(&mut self) {
        self.nonce = self.nonce.saturating_add(1);
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::with_balance(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_account_is_empty() {
        let account = Account::default();
        assert_eq!(account.balance, 0);
        assert_eq!(account.nonce, 0);
        assert_eq!(account.code_hash, Hash::ZERO);
        assert_eq!(account.storage_root, Hash::ZERO);
    }

    #[test]
    fn test_credit_and_debit() {
        let mut account = Account::with_balance(100);

        account.credit(50);
        assert_eq!(account.balance, 150);

        assert!(account.debit(120));
        assert_eq!(account.balance, 30);

        assert!(!account.debit(31));
        assert_eq!(account.balance, 30);
    }

    #[test]
    fn test_nonce_increment() {
        let mut account = Account::default();
        account.increment_nonce();
        account.increment_nonce();
        assert_eq!(account.nonce, 2);
    }

    #[test]
    fn test_bytes_roundtrip() {
        let mut account = Account::with_balance(777);
        account.nonce = 3;
        let decoded = Account::from_bytes(&account.to_bytes()).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(Account::from_bytes(&[0xFF]).is_err());
    }
}
