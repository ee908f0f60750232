use crate::entry::Entry;
use crate::error::StoreError;
use async_trait::async_trait;
use bson::oid::ObjectId;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A collection of entry documents.
///
/// Implementations only move documents in and out; email normalization,
/// uniqueness and validation belong to [`AddressBook`](crate::AddressBook).
/// Entries handed out by a store always carry their id.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Every document, in the backend's scan order.
    async fn find_all(&self) -> Result<Vec<Entry>, StoreError>;
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Entry>, StoreError>;
    /// The first document whose email equals `email` exactly.
    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError>;
    /// Insert a new document and return its id. A well-formed `entry.id` is
    /// kept; otherwise the store assigns one.
    async fn insert(&self, entry: Entry) -> Result<ObjectId, StoreError>;
    /// Replace the whole document stored under `id`. Fails with
    /// [`StoreError::NotFound`] when there is none.
    async fn replace(&self, id: ObjectId, entry: Entry) -> Result<(), StoreError>;
    /// Remove the document stored under `id`. Removing nothing is not an error.
    async fn delete(&self, id: ObjectId) -> Result<(), StoreError>;
}

/// Configuration for selecting and building a backend.
///
/// # Example
/// ```
/// use contacts::BackendConfig;
///
/// // In-memory (for testing)
/// let config = BackendConfig::in_memory();
///
/// // MongoDB collection
/// let config = BackendConfig::mongo("mongodb://localhost:27017", "addressbook", "entries");
///
/// // Embedded single-file store
/// let config = BackendConfig::redb("/data/contacts.redb");
/// ```
#[derive(Clone, Debug, Default)]
pub enum BackendConfig {
    /// A MongoDB collection. Requires the `mongo` feature.
    Mongo {
        uri: String,
        database: String,
        collection: String,
    },
    /// A redb database file. Requires the `embedded` feature.
    Redb { path: String },
    /// A process-local map, lost on exit.
    #[default]
    InMemory,
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn mongo(
        uri: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        BackendConfig::Mongo {
            uri: uri.into(),
            database: database.into(),
            collection: collection.into(),
        }
    }

    pub fn redb<P: Into<String>>(path: P) -> Self {
        BackendConfig::Redb { path: path.into() }
    }

    /// Open the configured backend.
    ///
    /// Backends compiled out by their feature flag fail with a
    /// [`StoreError::Backend`].
    pub async fn connect(&self) -> Result<Arc<dyn EntryStore>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            BackendConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                #[cfg(feature = "mongo")]
                {
                    Ok(Arc::new(
                        MongoStore::connect(uri, database, collection).await?,
                    ))
                }
                #[cfg(not(feature = "mongo"))]
                {
                    let _ = (uri, database, collection);
                    Err(StoreError::backend("mongo backend not compiled in"))
                }
            }
            BackendConfig::Redb { path } => {
                #[cfg(feature = "embedded")]
                {
                    Ok(Arc::new(RedbStore::open(path)?))
                }
                #[cfg(not(feature = "embedded"))]
                {
                    let _ = path;
                    Err(StoreError::backend("redb backend not compiled in"))
                }
            }
        }
    }
}

/// An in-memory collection keyed by object id.
///
/// Object ids grow with creation time, so scans come back in insertion order.
pub struct InMemoryStore {
    documents: RwLock<BTreeMap<ObjectId, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<ObjectId, Entry>>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<ObjectId, Entry>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Entry>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Entry>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError> {
        Ok(self
            .read()?
            .values()
            .find(|entry| entry.email == email)
            .cloned())
    }

    async fn insert(&self, mut entry: Entry) -> Result<ObjectId, StoreError> {
        let id = assigned_id(&entry);
        let mut documents = self.write()?;
        if documents.contains_key(&id) {
            return Err(StoreError::Backend(format!("duplicate key: {id}")));
        }
        entry.id = Some(id.to_hex());
        documents.insert(id, entry);
        Ok(id)
    }

    async fn replace(&self, id: ObjectId, mut entry: Entry) -> Result<(), StoreError> {
        let mut documents = self.write()?;
        let slot = documents.get_mut(&id).ok_or(StoreError::NotFound)?;
        entry.id = Some(id.to_hex());
        *slot = entry;
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        self.write()?.remove(&id);
        Ok(())
    }
}

/// The id an insert stores under: the entry's own when it parses, a fresh one
/// otherwise.
pub(crate) fn assigned_id(entry: &Entry) -> ObjectId {
    entry
        .id
        .as_deref()
        .and_then(|id| ObjectId::parse_str(id).ok())
        .unwrap_or_else(ObjectId::new)
}

/// MongoDB collection backend.
#[cfg(feature = "mongo")]
pub mod mongo;

#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

/// Embedded redb backend.
#[cfg(feature = "embedded")]
pub mod redb;

#[cfg(feature = "embedded")]
pub use self::redb::RedbStore;
