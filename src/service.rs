use crate::csv_io;
use crate::entry::{Entry, Validate, parse_id};
use crate::error::{ImportError, ServiceError, StoreError};
use crate::store::{BackendConfig, EntryStore};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// The operations the HTTP layer needs from an address book.
///
/// [`AddressBook`] is the real implementation; handler tests substitute a
/// fake.
#[async_trait]
pub trait ContactService: Send + Sync {
    /// Every entry, in store scan order.
    async fn all_entries(&self) -> Result<Vec<Entry>, ServiceError>;

    /// The entry stored under `id`.
    ///
    /// A malformed id fails with [`ServiceError::InvalidId`]. A well-formed id
    /// with no entry fails with the store's not-found error, which callers
    /// see as an ordinary storage error.
    async fn entry_by_id(&self, id: &str) -> Result<Entry, ServiceError>;

    /// Store a new entry and return it as stored, id included.
    async fn add_entry(&self, entry: Entry) -> Result<Entry, ServiceError>;

    /// Replace the entry stored under `entry.id` with `entry`. Nothing of the
    /// old document is kept.
    async fn update_entry(&self, entry: Entry) -> Result<(), ServiceError>;

    /// Remove the entry stored under `id`; removing a missing entry succeeds.
    async fn delete_entry_by_id(&self, id: &str) -> Result<(), ServiceError>;

    /// Export every entry to a temp CSV file rewound to its start. Dropping
    /// the handle deletes the file.
    async fn entries_to_csv(&self) -> Result<NamedTempFile, ServiceError>;

    /// Apply every row of the CSV file at `path`: rows with an id update,
    /// rows without one are added.
    ///
    /// Rows whose email is taken are skipped and collected; once the file is
    /// done, a non-empty collection comes back as an [`ImportError`] with
    /// [`ServiceError::EmailExists`]. Any other failure stops the import at
    /// that row and is returned with the rows skipped so far.
    async fn csv_to_entries(&self, path: &Path) -> Result<(), ImportError>;
}

/// A [`ContactService`] over any [`EntryStore`].
///
/// Every write validates the entry, lowercases its email, and checks the email
/// is not owned by a different entry before reaching the store.
pub struct AddressBook {
    store: Arc<dyn EntryStore>,
}

impl AddressBook {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Self { store }
    }

    /// Open the backend described by `config`.
    pub async fn connect(config: &BackendConfig) -> Result<Self, StoreError> {
        Ok(Self::new(config.connect().await?))
    }

    /// The email of `entry` must not belong to another valid entry.
    ///
    /// A stored match that fails validation is a stale or partial document
    /// and does not count. A match with the same id is the entry itself.
    async fn check_email_available(&self, entry: &Entry) -> Result<(), ServiceError> {
        match self.store.find_by_email(&entry.email).await? {
            Some(existing) if existing.validate().is_ok() && existing.id != entry.id => {
                tracing::debug!(
                    email = %entry.email,
                    owner = existing.id.as_deref().unwrap_or_default(),
                    "email already taken"
                );
                Err(ServiceError::EmailExists)
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ContactService for AddressBook {
    async fn all_entries(&self) -> Result<Vec<Entry>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    async fn entry_by_id(&self, id: &str) -> Result<Entry, ServiceError> {
        let id = parse_id(id)?;
        let entry = self.store.find_by_id(id).await?;
        entry.ok_or(ServiceError::Store(StoreError::NotFound))
    }

    async fn add_entry(&self, mut entry: Entry) -> Result<Entry, ServiceError> {
        entry.validate()?;
        entry.normalize_email();
        if let Some(id) = entry.id.as_deref() {
            entry.id = Some(parse_id(id)?.to_hex());
        }
        self.check_email_available(&entry).await?;

        let id = self.store.insert(entry).await?;
        tracing::debug!(id = %id, "entry added");

        let stored = self.store.find_by_id(id).await?;
        stored.ok_or(ServiceError::Store(StoreError::NotFound))
    }

    async fn update_entry(&self, mut entry: Entry) -> Result<(), ServiceError> {
        entry.validate()?;
        let id = parse_id(entry.id.as_deref().unwrap_or_default())?;
        entry.id = Some(id.to_hex());
        entry.normalize_email();
        self.check_email_available(&entry).await?;

        self.store.replace(id, entry).await?;
        tracing::debug!(id = %id, "entry replaced");
        Ok(())
    }

    async fn delete_entry_by_id(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        self.store.delete(id).await?;
        tracing::debug!(id = %id, "entry deleted");
        Ok(())
    }

    async fn entries_to_csv(&self) -> Result<NamedTempFile, ServiceError> {
        let entries = self.all_entries().await?;
        let count = entries.len();

        let file = tokio::task::spawn_blocking(move || csv_io::export_to_temp_file(&entries))
            .await
            .map_err(ServiceError::join)??;

        tracing::debug!(count, path = %file.path().display(), "entries exported");
        Ok(file)
    }

    async fn csv_to_entries(&self, path: &Path) -> Result<(), ImportError> {
        let path = path.to_path_buf();
        let entries = tokio::task::spawn_blocking(move || csv_io::read_file(&path))
            .await
            .map_err(ServiceError::join)??;

        let total = entries.len();
        let mut failed = Vec::new();

        for entry in entries {
            let result = match entry.id {
                Some(_) => self.update_entry(entry.clone()).await,
                None => self.add_entry(entry.clone()).await.map(|_| ()),
            };

            match result {
                Ok(()) => {}
                Err(ServiceError::EmailExists) => failed.push(entry),
                Err(err) => {
                    tracing::warn!(error = %err, row = %entry.email, "csv import aborted");
                    return Err(ImportError::new(failed, err));
                }
            }
        }

        if failed.is_empty() {
            tracing::info!(rows = total, "csv import applied");
            Ok(())
        } else {
            tracing::warn!(
                rows = total,
                conflicts = failed.len(),
                "csv import skipped rows with taken emails"
            );
            Err(ImportError::new(failed, ServiceError::EmailExists))
        }
    }
}
