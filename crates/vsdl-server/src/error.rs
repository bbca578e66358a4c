//! Maps the protocol-level failure kinds in spec §7 onto HTTP status codes.

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found")]
    NotFound,

    #[error("invalid policy")]
    InvalidPolicy,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("malformed request")]
    Malformed,

    #[error("policy does not cover record")]
    PolicyRecordMismatch,

    #[error("internal error")]
    Internal,
}

impl From<vsdl_core::Error> for ApiError {
    fn from(e: vsdl_core::Error) -> Self {
        match e {
            vsdl_core::Error::RecordNotFound(_) => ApiError::NotFound,
            vsdl_core::Error::InvalidPolicy(_) => ApiError::InvalidPolicy,
            vsdl_core::Error::PolicyRecordMismatch { .. } => ApiError::PolicyRecordMismatch,
            vsdl_core::Error::DuplicateField(_) => ApiError::Malformed,
            vsdl_core::Error::Malformed => ApiError::Malformed,
            vsdl_core::Error::InvalidToken => ApiError::InvalidToken,
            vsdl_core::Error::TokenNotFound => ApiError::NotFound,
            vsdl_core::Error::Internal(_) => ApiError::Internal,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // InvalidToken is surfaced with a generic reason only; detailed
        // reasons never leave the process (spec §7: avoid oracle behavior).
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found"),
            ApiError::InvalidPolicy => (StatusCode::BAD_REQUEST, "invalid policy"),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid token"),
            ApiError::Malformed => (StatusCode::BAD_REQUEST, "malformed request"),
            ApiError::PolicyRecordMismatch => (StatusCode::INTERNAL_SERVER_ERROR, "policy does not cover record"),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        };
        (status, Json(ErrorBody { error: message.to_string() })).into_response()
    }
}
