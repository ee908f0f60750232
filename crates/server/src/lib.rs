//! Contacts Server - HTTP REST API for the address book
//!
//! This crate exposes a [`contacts::ContactService`] over HTTP:
//!
//! - **Entries**: list, fetch, add, replace and delete single entries as JSON
//! - **CSV**: download the whole book as `entries.csv`, or upload a CSV file
//!   to add and update entries in bulk
//!
//! # Features
//!
//! - **Backends**: MongoDB, redb or in-memory, chosen by configuration
//! - **Middleware**: JSON content type, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: every failure answers `{"err": "<message>"}`
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `GET /entry` - List entries
//! - `GET /entry/{id}` - Get entry by ID
//! - `POST /entry` - Add entry
//! - `PUT /entry` - Replace entry (body carries `_id`)
//! - `DELETE /entry/{id}` - Delete entry
//! - `GET /csv/entry` - Export entries as CSV
//! - `POST /csv/entry` - Import entries from the multipart `file` field

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{BackendKind, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
