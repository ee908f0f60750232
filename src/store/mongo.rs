//! MongoDB backend for entry storage.
//!
//! Each entry is one document in the configured collection:
//!
//! ```json
//! { "_id": ObjectId("..."), "first_name": "...", "last_name": "...",
//!   "email": "...", "phone": "..." }
//! ```
//!
//! String fields missing from a stored document read back as empty strings,
//! so a partial document fails entry validation instead of failing the read.
//!
//! # Configuration Example
//! ```toml
//! backend = "mongo"
//! mongo_uri = "mongodb://localhost:27017"
//! database = "addressbook"
//! collection = "entries"
//! ```

use crate::entry::Entry;
use crate::error::StoreError;
use crate::store::{EntryStore, assigned_id};
use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

/// Stored shape of an entry: the id is a real object id, not its hex form.
#[derive(Serialize, Deserialize, Debug)]
struct EntryDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    phone: String,
}

impl EntryDocument {
    fn new(id: ObjectId, entry: Entry) -> Self {
        Self {
            id: Some(id),
            first_name: entry.first_name,
            last_name: entry.last_name,
            email: entry.email,
            phone: entry.phone,
        }
    }
}

impl From<EntryDocument> for Entry {
    fn from(document: EntryDocument) -> Self {
        Entry {
            id: document.id.map(|id| id.to_hex()),
            first_name: document.first_name,
            last_name: document.last_name,
            email: document.email,
            phone: document.phone,
        }
    }
}

/// Entries stored in one MongoDB collection.
///
/// The driver's client is a pooled handle that is safe to share; this store
/// adds no locking of its own.
pub struct MongoStore {
    collection: Collection<EntryDocument>,
}

impl MongoStore {
    /// Connect to `uri` and bind to `database.collection`.
    ///
    /// The server is pinged once so that a bad URI or an unreachable server
    /// fails at startup rather than on the first request.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::backend)?;

        client
            .database(database)
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(StoreError::backend)?;

        tracing::info!(database, collection, "connected to mongodb");

        Ok(Self::with_client(&client, database, collection))
    }

    /// Bind to `database.collection` on an existing client.
    pub fn with_client(client: &Client, database: &str, collection: &str) -> Self {
        Self {
            collection: client.database(database).collection(collection),
        }
    }
}

#[async_trait]
impl EntryStore for MongoStore {
    async fn find_all(&self) -> Result<Vec<Entry>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {}, None)
            .await
            .map_err(StoreError::backend)?;
        let documents: Vec<EntryDocument> =
            cursor.try_collect().await.map_err(StoreError::backend)?;

        Ok(documents.into_iter().map(Entry::from).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Entry>, StoreError> {
        let document = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(StoreError::backend)?;

        Ok(document.map(Entry::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Entry>, StoreError> {
        let document = self
            .collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(StoreError::backend)?;

        Ok(document.map(Entry::from))
    }

    async fn insert(&self, entry: Entry) -> Result<ObjectId, StoreError> {
        let id = assigned_id(&entry);
        let document = EntryDocument::new(id, entry);

        self.collection
            .insert_one(&document, None)
            .await
            .map_err(StoreError::backend)?;

        Ok(id)
    }

    async fn replace(&self, id: ObjectId, entry: Entry) -> Result<(), StoreError> {
        let document = EntryDocument::new(id, entry);

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, &document, None)
            .await
            .map_err(StoreError::backend)?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        self.collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }
}
