use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contacts::{ServiceError, ValidationError};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Each endpoint decides which service failures are the caller's fault; the
/// same [`ServiceError`] can therefore surface as [`ServerError::Rejected`],
/// [`ServerError::Unresolved`] or [`ServerError::Service`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing field: _id")]
    MissingId,

    #[error("Invalid file type")]
    InvalidFileType,

    /// A service failure caused by the request.
    #[error("{0}")]
    Rejected(ServiceError),

    /// A failed lookup still answered with 200.
    #[error("{0}")]
    Unresolved(ServiceError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_)
            | ServerError::BadRequest(_)
            | ServerError::MissingId
            | ServerError::InvalidFileType
            | ServerError::Rejected(_) => StatusCode::BAD_REQUEST,
            ServerError::Unresolved(_) => StatusCode::OK,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Service(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        tracing::warn!("http error: {} (code={})", message, status.as_u16());

        (status, Json(json!({ "err": message }))).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}
