//! API route handlers
//!
//! Routes are organized by resource:
//!
//! - `entry`: single-entry CRUD over JSON
//! - `csv`: bulk export and import of the whole address book

pub mod csv;
pub mod entry;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
