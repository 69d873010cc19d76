//! Photo report endpoints: filing, lookup, moderation and the admin queue

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use gt_common::models::{Ban, NewPhotoReport, PhotoReport, ReportAction};
use gt_common::time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::auth::{require_admin, require_unbanned};
use super::validation::{optional_id, page, require_id, require_text};
use super::ApiJson;
use crate::db::{Page, ReportFilter};
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /photoReports/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoReportRequest {
    pub user_id: Option<i64>,
    pub photo_id: Option<i64>,
    pub report_text: Option<String>,
}

impl AddPhotoReportRequest {
    fn validate(self) -> ApiResult<NewPhotoReport> {
        Ok(NewPhotoReport {
            user_id: require_id(self.user_id, "userId")?,
            photo_id: require_id(self.photo_id, "photoId")?,
            report_text: require_text(self.report_text, "reportText")?,
        })
    }
}

/// Body of `POST /photoReports/byId`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoReportIdRequest {
    pub photo_report_id: Option<i64>,
}

/// Body of `POST /photoReports/remove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePhotoReportRequest {
    pub admin_id: Option<i64>,
    pub photo_report_id: Option<i64>,
}

/// Body of `POST /photoReports/handle`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlePhotoReportRequest {
    pub admin_id: Option<i64>,
    pub photo_report_id: Option<i64>,
    pub admin_action: Option<i64>,
    /// Ban expiry for action 2; absent means permanent
    pub expiration_date: Option<DateTime<Utc>>,
}

struct HandleReport {
    admin_id: i64,
    photo_report_id: i64,
    action: ReportAction,
    expiration_date: Option<DateTime<Utc>>,
}

impl HandlePhotoReportRequest {
    fn validate(self) -> ApiResult<HandleReport> {
        Ok(HandleReport {
            admin_id: require_id(self.admin_id, "adminId")?,
            photo_report_id: require_id(self.photo_report_id, "photoReportId")?,
            action: ReportAction::try_from(require_id(self.admin_action, "adminAction")?)?,
            expiration_date: self.expiration_date.map(time::truncate),
        })
    }
}

/// Body of `POST /photoReports/list/byDate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotoReportsRequest {
    pub admin_id: Option<i64>,
    pub start_index: Option<i64>,
    pub max: Option<i64>,
    pub handled_by: Option<i64>,
    pub unhandled_only: Option<bool>,
}

impl ListPhotoReportsRequest {
    fn validate(self) -> ApiResult<(i64, ReportFilter, Page)> {
        let admin_id = require_id(self.admin_id, "adminId")?;
        let page = page(self.start_index, self.max)?;
        let handled_by = optional_id(self.handled_by, "handledBy")?;
        let unhandled_only = self.unhandled_only.unwrap_or(false);

        let filter = match (handled_by, unhandled_only) {
            (Some(_), true) => {
                return Err(ApiError::BadRequest(
                    "Parameter 'unhandledOnly' must be false if parameter 'handledBy' is defined."
                        .to_string(),
                ))
            }
            (Some(handled_by), false) => ReportFilter::HandledBy(handled_by),
            (None, true) => ReportFilter::Unhandled,
            (None, false) => ReportFilter::All,
        };
        Ok((admin_id, filter, page))
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoReportResponse {
    pub report: PhotoReport,
}

#[derive(Debug, Serialize)]
pub struct HandledReportResponse {
    pub report: PhotoReport,
    /// Present only when the uploader was banned
    pub ban: Option<Ban>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoReportListResponse {
    pub photo_reports: Vec<PhotoReport>,
}

/// POST /photoReports/add
pub async fn add_photo_report(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddPhotoReportRequest>,
) -> ApiResult<Json<PhotoReportResponse>> {
    let new_report = request.validate()?;

    require_unbanned(&state.store, new_report.user_id).await?;
    if state.store.get_photo(new_report.photo_id).await?.is_none() {
        return Err(ApiError::not_found("Photo"));
    }

    let report = state.store.add_photo_report(&new_report).await?;
    info!(
        report_id = report.id,
        photo_id = report.photo_id,
        user_id = report.user_id,
        "Photo reported"
    );

    Ok(Json(PhotoReportResponse { report }))
}

/// POST /photoReports/byId
pub async fn photo_report_by_id(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PhotoReportIdRequest>,
) -> ApiResult<Json<PhotoReportResponse>> {
    let report_id = require_id(request.photo_report_id, "photoReportId")?;
    let report = state
        .store
        .get_photo_report(report_id)
        .await?
        .ok_or_else(|| ApiError::not_found("PhotoReport"))?;

    Ok(Json(PhotoReportResponse { report }))
}

/// POST /photoReports/handle
///
/// Action `0` dismisses, `1` removes the photo, `2` removes the photo and
/// bans its uploader. All effects commit together. A report already handled
/// answers 409.
pub async fn handle_photo_report(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<HandlePhotoReportRequest>,
) -> ApiResult<Json<HandledReportResponse>> {
    let handle = request.validate()?;
    require_admin(&state.store, handle.admin_id).await?;

    let handled = state
        .store
        .handle_photo_report(
            handle.photo_report_id,
            handle.action,
            handle.admin_id,
            handle.expiration_date,
        )
        .await?;

    Ok(Json(HandledReportResponse {
        report: handled.report,
        ban: handled.ban,
    }))
}

/// POST /photoReports/list/byDate
///
/// Oldest first. `handledBy` and `unhandledOnly: true` are mutually exclusive.
pub async fn list_photo_reports_by_date(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ListPhotoReportsRequest>,
) -> ApiResult<Json<PhotoReportListResponse>> {
    let (admin_id, filter, page) = request.validate()?;
    require_admin(&state.store, admin_id).await?;

    let photo_reports = state.store.list_photo_reports_by_date(filter, page).await?;
    Ok(Json(PhotoReportListResponse { photo_reports }))
}

/// POST /photoReports/remove
pub async fn remove_photo_report(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RemovePhotoReportRequest>,
) -> ApiResult<Json<Value>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    let report_id = require_id(request.photo_report_id, "photoReportId")?;
    require_admin(&state.store, admin_id).await?;

    if !state.store.remove_photo_report(report_id).await? {
        return Err(ApiError::not_found("PhotoReport"));
    }

    info!(report_id, admin_id, "Photo report removed");
    Ok(Json(json!({})))
}

/// Build photo report routes
pub fn photo_report_routes() -> Router<AppState> {
    Router::new()
        .route("/photoReports/add", post(add_photo_report))
        .route("/photoReports/byId", post(photo_report_by_id))
        .route("/photoReports/handle", post(handle_photo_report))
        .route("/photoReports/list/byDate", post(list_photo_reports_by_date))
        .route("/photoReports/remove", post(remove_photo_report))
}
