//! Maps `BoardError` onto HTTP responses. Storage failures are logged here
//! and reported to the client as an opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domains::BoardError;

#[derive(Debug)]
pub struct ApiError(pub BoardError);

impl From<BoardError> for ApiError {
    fn from(err: BoardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            BoardError::NotFound(kind, key) => {
                (StatusCode::NOT_FOUND, format!("{kind} {key} not found"))
            }
            BoardError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            BoardError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            BoardError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            BoardError::Storage(err) => {
                tracing::error!(error = ?err, "unhandled storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_owned(),
                )
            }
        };
        (status, message).into_response()
    }
}
