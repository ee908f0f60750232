use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use contacts::{Entry, ServiceError, Validate};
use std::sync::Arc;

/// Decode a JSON entry body and check its required fields.
///
/// The raw body is parsed here rather than through the `Json` extractor so
/// that every decode failure answers 400 with an `{"err": ...}` body.
pub fn decode_and_validate(body: &[u8]) -> ServerResult<Entry> {
    let entry: Entry = serde_json::from_slice(body)?;
    entry.validate()?;
    Ok(entry)
}

/// A malformed id is the caller's fault, anything else is ours.
fn reject_invalid_id(err: ServiceError) -> ServerError {
    match err {
        ServiceError::InvalidId => ServerError::Rejected(err),
        err => ServerError::Service(err),
    }
}

/// List every entry
pub async fn list_entries(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let entries = state.service.all_entries().await?;
    Ok(Json(entries))
}

/// Fetch one entry
///
/// An id that parses but matches nothing still answers 200, with the error in
/// the body.
pub async fn get_entry(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    match state.service.entry_by_id(&id).await {
        Ok(entry) => Ok(Json(entry)),
        Err(err @ ServiceError::InvalidId) => Err(ServerError::Rejected(err)),
        Err(err) => Err(ServerError::Unresolved(err)),
    }
}

/// Add an entry and return it as stored
///
/// A taken email is reported as a server error.
pub async fn create_entry(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let entry = decode_and_validate(&body)?;

    let stored = state
        .service
        .add_entry(entry)
        .await
        .map_err(reject_invalid_id)?;

    Ok(Json(stored))
}

/// Replace an existing entry, answering 202 with no body
pub async fn update_entry(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<impl IntoResponse> {
    let entry = decode_and_validate(&body)?;
    if entry.id.is_none() {
        return Err(ServerError::MissingId);
    }

    state
        .service
        .update_entry(entry)
        .await
        .map_err(|err| match err {
            ServiceError::InvalidId | ServiceError::EmailExists => ServerError::Rejected(err),
            err => ServerError::Service(err),
        })?;

    Ok(StatusCode::ACCEPTED)
}

/// Remove an entry; removing a missing one also answers 200
pub async fn delete_entry(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    state
        .service
        .delete_entry_by_id(&id)
        .await
        .map_err(reject_invalid_id)?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contacts::ValidationError;

    #[test]
    fn test_decode_and_validate() {
        let entry = decode_and_validate(
            br#"{"first_name":"Ada","last_name":"Lovelace","email":"ada@example.com","phone":"1"}"#,
        )
        .unwrap();
        assert_eq!(entry.first_name, "Ada");
        assert!(entry.id.is_none());
    }

    #[test]
    fn test_decode_reports_first_missing_field() {
        let body = br#"{"first_name":"Ada","last_name":"Lovelace"}"#;
        let err = decode_and_validate(body).unwrap_err();
        assert!(matches!(
            err,
            ServerError::Validation(ValidationError::Email)
        ));
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        let err = decode_and_validate(b"{not json").unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
