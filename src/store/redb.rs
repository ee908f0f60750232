//! Redb (Rust embedded database) backend for entry storage.
//!
//! Entries live in a single table keyed by the hex object id, each value the
//! entry's JSON document. redb transactions are synchronous, so every
//! operation runs on tokio's blocking pool.
//!
//! Lookups by email scan the table; the store is meant for local runs and
//! tests, not large collections.
//!
//! # Configuration Example
//! ```toml
//! backend = "redb"
//! redb_path = "/data/contacts.redb"
//! ```

use crate::entry::Entry;
use crate::error::StoreError;
use crate::store::{EntryStore, assigned_id};
use async_trait::async_trait;
use bson::oid::ObjectId;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;
use std::sync::Arc;

const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

/// Redb backend for persistent entry storage.
///
/// Every write is its own committed transaction, so single-document
/// operations are atomic and durable. The `Arc<Database>` is shared with the
/// blocking tasks.
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a redb database at `path` and make sure the entries
    /// table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(StoreError::backend)?;

        let write_txn = db.begin_write().map_err(StoreError::backend)?;
        {
            let _table = write_txn.open_table(ENTRIES).map_err(StoreError::backend)?;
        }
        write_txn.commit().map_err(StoreError::backend)?;

        Ok(Self { db: Arc::new(db) })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(StoreError::backend)?
    }
}

fn scan(db: &Database) -> Result<Vec<Entry>, StoreError> {
    let read_txn = db.begin_read().map_err(StoreError::backend)?;
    let table = read_txn.open_table(ENTRIES).map_err(StoreError::backend)?;

    let mut entries = Vec::new();
    for item in table.iter().map_err(StoreError::backend)? {
        let (_, value) = item.map_err(StoreError::backend)?;
        entries.push(serde_json::from_slice(value.value())?);
    }
    Ok(entries)
}

fn put(db: &Database, id: ObjectId, mut entry: Entry, must_exist: bool) -> Result<(), StoreError> {
    let key = id.to_hex();
    entry.id = Some(key.clone());
    let value = serde_json::to_vec(&entry)?;

    let write_txn = db.begin_write().map_err(StoreError::backend)?;
    {
        let mut table = write_txn.open_table(ENTRIES).map_err(StoreError::backend)?;
        let exists = table
            .get(key.as_str())
            .map_err(StoreError::backend)?
            .is_some();

        match (exists, must_exist) {
            (false, true) => return Err(StoreError::NotFound),
            (true, false) => return Err(StoreError::Backend(format!("duplicate key: {key}"))),
            _ => {}
        }

        table
            .insert(key.as_str(), value.as_slice())
            .map_err(StoreError::backend)?;
    }
    write_txn.commit().map_err(StoreError::backend)?;
    Ok(())
}

#[async_trait]
impl EntryStore for RedbStore {
    async fn find_all(&self) -> Result<Vec<Entry>, StoreError> {
        self.blocking(scan).await
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Entry>, StoreError> {
        self.blocking(move |db| {
            let read_txn = db.begin_read().map_err(StoreError::backend)?;
            let table = read_txn.open_table(ENTRIES).map_err(StoreError::backend)?;

            let key = id.to_hex();
            let entry = match table.get(key.as_str()).map_err(StoreError::backend)? {
                Some(value) => Some(serde_json::from_slice(value.value())?),
                None => None,
            };
            Ok(entry)
        })
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError> {
        let email = email.to_string();
        self.blocking(move |db| {
            let entries = scan(db)?;
            Ok(entries.into_iter().find(|entry| entry.email == email))
        })
        .await
    }

    async fn insert(&self, entry: Entry) -> Result<ObjectId, StoreError> {
        let id = assigned_id(&entry);
        self.blocking(move |db| put(db, id, entry, false)).await?;
        Ok(id)
    }

    async fn replace(&self, id: ObjectId, entry: Entry) -> Result<(), StoreError> {
        self.blocking(move |db| put(db, id, entry, true)).await
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        self.blocking(move |db| {
            let write_txn = db.begin_write().map_err(StoreError::backend)?;
            {
                let mut table = write_txn.open_table(ENTRIES).map_err(StoreError::backend)?;
                table
                    .remove(id.to_hex().as_str())
                    .map_err(StoreError::backend)?;
            }
            write_txn.commit().map_err(StoreError::backend)?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn entry(email: &str) -> Entry {
        Entry::new("Grace", "Hopper", email, "555-0199")
    }

    #[tokio::test]
    async fn test_redb_store_roundtrip() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = RedbStore::open(temp_file.path()).unwrap();

        let id = store.insert(entry("grace@example.com")).await.unwrap();
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.id, Some(id.to_hex()));
        assert_eq!(found.email, "grace@example.com");

        assert_eq!(store.find_by_id(ObjectId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redb_store_find_by_email() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = RedbStore::open(temp_file.path()).unwrap();

        store.insert(entry("one@example.com")).await.unwrap();
        let id = store.insert(entry("two@example.com")).await.unwrap();

        let found = store.find_by_email("two@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, Some(id.to_hex()));
        let missing = store.find_by_email("three@example.com").await.unwrap();
        assert!(missing.is_none());
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_redb_store_replace_and_delete() {
        let temp_file = NamedTempFile::new().unwrap();
        let store = RedbStore::open(temp_file.path()).unwrap();

        let id = store.insert(entry("grace@example.com")).await.unwrap();
        store.replace(id, entry("hopper@example.com")).await.unwrap();
        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.email, "hopper@example.com");

        store.delete(id).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.find_by_id(id).await.unwrap().is_none());

        let err = store.replace(id, entry("x@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_redb_store_survives_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        let id = {
            let store = RedbStore::open(temp_file.path()).unwrap();
            store.insert(entry("grace@example.com")).await.unwrap()
        };

        let store = RedbStore::open(temp_file.path()).unwrap();
        assert!(store.find_by_id(id).await.unwrap().is_some());
    }
}
