//! sled adapter for the [`KvStore`] contract.

use crate::{KvError, KvStore, Result};
use sled::Db;
use std::path::Path;

/// A [`KvStore`] backed by a sled database.
pub struct SledDb {
    db: Db,
}

impl SledDb {
    /// Open (or create) a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Open an in-memory database that is discarded on drop (for testing).
    pub fn open_temporary() -> Result<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Flush and release the database.
    pub fn close(self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}

impl KvStore for SledDb {
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        Ok(self.db.contains_key(key)?)
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.db.remove(key)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db.flush().map(|_| ()).map_err(KvError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get() {
        let store = SledDb::open_temporary().unwrap();

        store.put(b"key", b"value").unwrap();
        assert_eq!(store.get(b"key").unwrap(), Some(b"value".to_vec()));
        assert_eq!(store.get(b"missing").unwrap(), None);
    }

    #[test]
    fn test_put_overwrites() {
        let store = SledDb::open_temporary().unwrap();

        store.put(b"key", b"old").unwrap();
        store.put(b"key", b"new").unwrap();
        assert_eq!(store.get(b"key").unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_exists_and_delete() {
        let store = SledDb::open_temporary().unwrap();

        store.put(b"key", b"value").unwrap();
        assert!(store.exists(b"key").unwrap());

        store.delete(b"key").unwrap();
        assert!(!store.exists(b"key").unwrap());

        // deleting an absent key is a no-op
        store.delete(b"key").unwrap();
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db");

        let store = SledDb::open(&path).unwrap();
        store.put(b"persisted", b"yes").unwrap();
        store.close().unwrap();

        let store = SledDb::open(&path).unwrap();
        assert_eq!(store.get(b"persisted").unwrap(), Some(b"yes".to_vec()));
    }
}
