//! Address-book entries over a document store.
//!
//! This crate is everything below the HTTP layer of the contacts server:
//!
//! - [`Entry`], the stored record, and its [`Validate`] rule
//! - [`EntryStore`], the document-collection seam, with MongoDB, redb and
//!   in-memory backends selected through [`BackendConfig`]
//! - [`ContactService`], the operations handlers call, implemented by
//!   [`AddressBook`]
//! - CSV export and import with per-row conflict reporting
//!
//! ## Example
//!
//! ```
//! use contacts::{AddressBook, BackendConfig, ContactService, Entry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let book = AddressBook::connect(&BackendConfig::in_memory()).await?;
//!
//! let stored = book
//!     .add_entry(Entry::new("Ada", "Lovelace", "Ada@Example.com", "555-0100"))
//!     .await?;
//! assert!(stored.id.is_some());
//! assert_eq!(stored.email, "ada@example.com");
//! # Ok(())
//! # }
//! ```

pub mod csv_io;
mod entry;
mod error;
mod service;
mod store;

pub use entry::{Entry, Validate, parse_id};
pub use error::{ImportError, ServiceError, StoreError, ValidationError};
pub use service::{AddressBook, ContactService};
pub use store::{BackendConfig, EntryStore, InMemoryStore};

#[cfg(feature = "mongo")]
pub use store::MongoStore;

#[cfg(feature = "embedded")]
pub use store::RedbStore;
