//! Account-level façade over the raw trie state.
//!
//! The trie stores opaque bytes; this seam gives the pool and the
//! transfer machine a typed view of accounts keyed by address.

use nanoledger_core::{Account, Address, Hash};
use nanoledger_kvstore::KvStore;
use nanoledger_trie::{State, TrieError};
use thiserror::Error;

/// Errors from account state access.
#[derive(Debug, Error)]
pub enum StateDbError {
    #[error("trie error: {0}")]
    Trie(#[from] TrieError),

    /// The trie holds bytes for this address that do not decode as an
    /// account record. Distinct from absence.
    #[error("corrupt account record for {0}")]
    CorruptAccount(Address),
}

/// Result type for account state operations.
pub type Result<T> = std::result::Result<T, StateDbError>;

/// Read/write access to accounts at a tracked state root.
pub trait StateDb {
    /// The current root commitment.
    fn state_root(&self) -> Hash;

    /// Re-point the view at a previously committed root.
    fn set_state_root(&mut self, root: Hash) -> Result<()>;

    /// Fetch an account, `None` when the address has no record.
    fn account(&self, address: &Address) -> Result<Option<Account>>;

    /// Write an account record, producing a new root.
    fn put_account(&mut self, address: &Address, account: &Account) -> Result<()>;
}

/// The trie-backed [`StateDb`].
pub struct TrieStateDb<'a, D: KvStore> {
    db: &'a D,
    state: State<'a, D>,
}

impl<'a, D: KvStore> TrieStateDb<'a, D> {
    /// A view over an empty trie.
    pub fn empty(db: &'a D) -> Self {
        Self {
            db,
            state: State::empty(db),
        }
    }

    /// Open a view at a committed root. Fails if the root node is
    /// missing or corrupt.
    pub fn open(db: &'a D, root: Hash) -> Result<Self> {
        let state = State::open(db, root)?;
        Ok(Self { db, state })
    }

    /// Balance of an account, zero when absent.
    pub fn balance(&self, address: &Address) -> Result<u64> {
        Ok(self.account(address)?.map(|a| a.balance).unwrap_or(0))
    }

    /// Nonce of an account, zero when absent.
    pub fn nonce(&self, address: &Address) -> Result<u64> {
        Ok(self.account(address)?.map(|a| a.nonce).unwrap_or(0))
    }
}

impl<D: KvStore> StateDb for TrieStateDb<'_, D> {
    fn state_root(&self) -> Hash {
        self.state.root()
    }

    fn set_state_root(&mut self, root: Hash) -> Result<()> {
        self.state = State::open(self.db, root)?;
        Ok(())
    }

    fn account(&self, address: &Address) -> Result<Option<Account>> {
        match self.state.load(address.as_ref()) {
            Ok(bytes) => Account::from_bytes(&bytes)
                .map(Some)
                .map_err(|_| StateDbError::CorruptAccount(*address)),
            Err(TrieError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put_account(&mut self, address: &Address, account: &Account) -> Result<()> {
        self.state
            .store(address.as_ref(), &account.to_bytes())
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nanoledger_kvstore::SledDb;

    #[test]
    fn test_absent_account_is_none() {
        let db = SledDb::open_temporary().unwrap();
        let state = TrieStateDb::empty(&db);
        let addr = Address::from_bytes([1; 20]);

        assert!(state.account(&addr).unwrap().is_none());
        assert_eq!(state.balance(&addr).unwrap(), 0);
        assert_eq!(state.nonce(&addr).unwrap(), 0);
    }

    #[test]
    fn test_put_and_reload_account() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let addr = Address::from_bytes([2; 20]);

        let mut account = Account::with_balance(1_000);
        account.nonce = 4;
        state.put_account(&addr, &account).unwrap();

        assert_eq!(state.account(&addr).unwrap().unwrap(), account);
        assert_ne!(state.state_root(), Hash::ZERO);
    }

    #[test]
    fn test_set_state_root_rewinds_view() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let addr = Address::from_bytes([3; 20]);

        state
            .put_account(&addr, &Account::with_balance(100))
            .unwrap();
        let snapshot = state.state_root();

        state
            .put_account(&addr, &Account::with_balance(900))
            .unwrap();
        assert_eq!(state.balance(&addr).unwrap(), 900);

        state.set_state_root(snapshot).unwrap();
        assert_eq!(state.balance(&addr).unwrap(), 100);
    }

    #[test]
    fn test_set_state_root_rejects_unknown_root() {
        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let bogus = nanoledger_core::hash(b"elsewhere");
        assert!(state.set_state_root(bogus).is_err());
    }

    #[test]
    fn test_corrupt_record_is_not_absence() {
        use nanoledger_kvstore::KvStore;

        let db = SledDb::open_temporary().unwrap();
        let mut state = TrieStateDb::empty(&db);
        let addr = Address::from_bytes([4; 20]);

        let account = Account::with_balance(5);
        state.put_account(&addr, &account).unwrap();

        // overwrite the value bytes behind the account's content address
        let value_addr = nanoledger_core::hash(&account.to_bytes());
        db.put(value_addr.as_ref(), &[0xFF]).unwrap();

        assert!(matches!(
            state.account(&addr),
            Err(StateDbError::CorruptAccount(a)) if a == addr
        ));
    }
}
