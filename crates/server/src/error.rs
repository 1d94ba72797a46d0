use crate::envelope::Envelope;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use notekeep::{NoteId, ValidationError};
use store::StoreError;

pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned for every 5xx; the cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Payload too large: max {0}KiB allowed")]
    PayloadTooLarge(usize),

    #[error("Note {0} not found")]
    NotFound(NoteId),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound(_) | ServerError::RouteNotFound => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message. Server-side causes are never exposed.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Validation(err) => err.first_message().to_string(),
            ServerError::PayloadTooLarge(max_kb) => {
                format!("request body too large (max {max_kb} KiB)")
            }
            ServerError::NotFound(_) => "note not found".to_string(),
            ServerError::RouteNotFound => "route not found".to_string(),
            ServerError::MethodNotAllowed => "method not allowed".to_string(),
            ServerError::Storage(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ServerError::NotFound(id),
            other => ServerError::Storage(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        (status, Envelope::failure(self.public_message())).into_response()
    }
}
