//! Error types produced by the address book.
//!
//! Errors are layered the same way the code is:
//!
//! | Error | Raised by | Meaning |
//! |-------|-----------|---------|
//! | [`ValidationError`] | [`Entry::validate`](crate::Entry) | a required field is empty |
//! | [`StoreError`] | [`EntryStore`](crate::EntryStore) backends | the collection failed or has no such document |
//! | [`ServiceError`] | [`ContactService`](crate::ContactService) | everything a service call can fail with |
//! | [`ImportError`] | CSV import | the rows that conflicted plus the error that ended the run |
//!
//! Callers map these onto transport status codes; the service never does.

use crate::entry::Entry;
use thiserror::Error;

/// A required entry field is empty.
///
/// Only the first failing field is reported; validation short-circuits.
///
/// ```
/// use contacts::ValidationError;
///
/// assert_eq!(
///     ValidationError::Email.to_string(),
///     "Email field cannot be empty or null"
/// );
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// First or last name is empty.
    #[error("Name field cannot be empty or null")]
    Name,
    #[error("Email field cannot be empty or null")]
    Email,
    #[error("Phone field cannot be empty or null")]
    Phone,
}

/// Failures reported by a storage backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No document matched the selector.
    #[error("not found")]
    NotFound,
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_data() || e.is_syntax() || e.is_eof() {
            StoreError::Decode(e.to_string())
        } else {
            StoreError::Encode(e.to_string())
        }
    }
}

/// Everything a [`ContactService`](crate::ContactService) call can fail with.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The identifier is not a well-formed object id.
    #[error("ID value is invalid")]
    InvalidId,

    /// Another entry already owns the email address.
    #[error("Email already exists")]
    EmailExists,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Storage failures, including a lookup that found nothing.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Blocking-pool failures surface as I/O errors.
    pub(crate) fn join(err: tokio::task::JoinError) -> Self {
        ServiceError::Io(std::io::Error::other(err))
    }
}

/// Result of a CSV import that did not apply cleanly.
///
/// `failed` holds every row rejected because its email was taken. When
/// `source` is [`ServiceError::EmailExists`] the whole file was processed and
/// only those rows were skipped; any other `source` stopped the import at the
/// row that raised it.
#[derive(Error, Debug)]
#[error("{source}")]
pub struct ImportError {
    pub failed: Vec<Entry>,
    pub source: ServiceError,
}

impl ImportError {
    pub fn new(failed: Vec<Entry>, source: ServiceError) -> Self {
        Self { failed, source }
    }

    /// True when the import ran to the end and only email conflicts were skipped.
    pub fn is_partial(&self) -> bool {
        matches!(self.source, ServiceError::EmailExists)
    }
}

impl From<ServiceError> for ImportError {
    fn from(source: ServiceError) -> Self {
        Self::new(Vec::new(), source)
    }
}
