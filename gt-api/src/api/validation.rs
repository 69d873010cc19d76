//! Request parameter checks
//!
//! Each helper takes the raw (optional) field and its wire name, and yields the
//! checked value or a 400 carrying the matching message.

use crate::db::Page;
use crate::{ApiError, ApiResult};

/// Field must be present
pub fn require<T>(value: Option<T>, param: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::missing_param(param))
}

/// Field must be present and non-negative
pub fn require_id(value: Option<i64>, param: &str) -> ApiResult<i64> {
    let id = require(value, param)?;
    non_negative(id, param)
}

/// Field may be absent, but must be non-negative when present
pub fn optional_id(value: Option<i64>, param: &str) -> ApiResult<Option<i64>> {
    value.map(|id| non_negative(id, param)).transpose()
}

/// Field must be present and not blank
pub fn require_text(value: Option<String>, param: &str) -> ApiResult<String> {
    let text = require(value, param)?;
    if text.trim().is_empty() {
        return Err(ApiError::missing_text(param));
    }
    Ok(text)
}

/// `startIndex >= 0` and `max > 0`
pub fn page(start_index: Option<i64>, max: Option<i64>) -> ApiResult<Page> {
    let start_index = require_id(start_index, "startIndex")?;
    let max = require(max, "max")?;
    if max <= 0 {
        return Err(ApiError::not_positive("max"));
    }
    Ok(Page::new(start_index, max))
}

/// Optional `maxPhotos`, falling back to the configured default
pub fn max_photos(value: Option<i64>, default: u32) -> ApiResult<i64> {
    Ok(optional_id(value, "maxPhotos")?.unwrap_or(i64::from(default)))
}

fn non_negative(value: i64, param: &str) -> ApiResult<i64> {
    if value < 0 {
        return Err(ApiError::negative(param));
    }
    Ok(value)
}
