//! Error types for gt-api
//!
//! Client errors carry a human-readable message returned as
//! `{ "message": ... }`. Everything else becomes an empty 500 and is logged.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::ml::ClassifierError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or out-of-range parameter (400)
    #[error("{0}")]
    BadRequest(String),

    /// Failed admin check or banned actor (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Referenced record does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Request conflicts with stored state (409)
    #[error("{0}")]
    Conflict(String),

    /// Plant classifier failure (500)
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Storage failure (500)
    #[error("Storage error: {0}")]
    Storage(gt_common::Error),
}

impl ApiError {
    pub fn missing_param(param: &str) -> Self {
        ApiError::BadRequest(format!(
            "Missing required '{}' parameter in request body.",
            param
        ))
    }

    pub fn missing_text(param: &str) -> Self {
        ApiError::BadRequest(format!("Parameter '{}' must be a non-empty String.", param))
    }

    pub fn negative(param: &str) -> Self {
        ApiError::BadRequest(format!("Parameter '{}' may not be negative.", param))
    }

    pub fn not_positive(param: &str) -> Self {
        ApiError::BadRequest(format!("Parameter '{}' must be positive.", param))
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("User is not authorized to perform this action.".to_string())
    }

    pub fn not_found(kind: &str) -> Self {
        gt_common::Error::not_found(kind).into()
    }
}

impl From<gt_common::Error> for ApiError {
    fn from(err: gt_common::Error) -> Self {
        match err {
            gt_common::Error::NotFound(msg) => ApiError::NotFound(msg),
            gt_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            gt_common::Error::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Storage(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            failure => {
                error!(error = %failure, "Request failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
