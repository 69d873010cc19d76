//! JSON body extractor with API-shaped rejections

use axum::extract::FromRequest;

use crate::ApiError;

/// `axum::Json` whose rejection is a 400 `{ "message": ... }`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
