use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use contacts::Entry;
use serde::Serialize;
use std::sync::Arc;

/// Form field carrying the uploaded file
const FILE_FIELD: &str = "file";

/// Body returned when some rows were skipped because their email is taken
#[derive(Debug, Serialize)]
pub struct CsvImportFailure {
    pub err: String,
    pub invalid_entries: Vec<Entry>,
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

/// Download every entry as `entries.csv`
pub async fn export_entries(State(state): State<Arc<ServerState>>) -> ServerResult<Response> {
    let file = state.service.entries_to_csv().await?;
    let body = tokio::fs::read(file.path()).await?;
    drop(file);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=entries.csv"),
        ],
        body,
    )
        .into_response())
}

/// Import the `file` part of a multipart upload
///
/// The part must declare `text/csv`. Rows skipped for a taken email come back
/// with 200 and the skipped rows; a clean import answers 202.
pub async fn import_entries(
    State(state): State<Arc<ServerState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<Response> {
    let mut multipart =
        multipart.map_err(|rejection| ServerError::BadRequest(rejection.body_text()))?;

    let field = loop {
        match multipart.next_field().await? {
            Some(field) if field.name() == Some(FILE_FIELD) => break field,
            Some(_) => continue,
            None => {
                return Err(ServerError::BadRequest(format!(
                    "missing form field: {FILE_FIELD}"
                )));
            }
        }
    };

    if field.content_type() != Some("text/csv") {
        return Err(ServerError::InvalidFileType);
    }
    let data = field.bytes().await?;

    let upload = tempfile::Builder::new()
        .prefix("upload.")
        .suffix(".csv")
        .tempfile()?;
    tokio::fs::write(upload.path(), &data).await?;
    tracing::debug!(bytes = data.len(), path = %upload.path().display(), "csv upload stored");

    match state.service.csv_to_entries(upload.path()).await {
        Ok(()) => Ok(StatusCode::ACCEPTED.into_response()),
        Err(err) if err.is_partial() => {
            let body = CsvImportFailure {
                err: err.to_string(),
                invalid_entries: err.failed,
            };
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(err) => Err(ServerError::Service(err.source)),
    }
}
