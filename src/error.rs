use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Every outcome a caller can act on gets its own variant; the only error this
/// service ever swallows is an audit-log append failure (see [`crate::rsvp`]).
/// Nothing is retried internally — a user re-submitting the form is the retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("RSVP has already been submitted")]
    AlreadySubmitted,

    #[error("item has already been purchased")]
    AlreadyPurchased,

    #[error("invalid guest data")]
    InvalidGuestData,

    #[error("malformed payload")]
    MalformedPayload,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadySubmitted | AppError::AlreadyPurchased => StatusCode::CONFLICT,
            AppError::InvalidGuestData | AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
