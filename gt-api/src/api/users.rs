//! User endpoints: accounts, bans and admin promotion

use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use gt_common::models::{Account, Ban};
use gt_common::time;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::auth::require_admin;
use super::validation::require_id;
use super::ApiJson;
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /users/add` and `POST /users/byId`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdRequest {
    pub user_id: Option<i64>,
}

/// Body of `POST /users/makeAdmin` and `POST /users/remove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRequest {
    pub admin_id: Option<i64>,
    pub user_id: Option<i64>,
}

impl AdminUserRequest {
    fn validate(self) -> ApiResult<(i64, i64)> {
        Ok((
            require_id(self.admin_id, "adminId")?,
            require_id(self.user_id, "userId")?,
        ))
    }
}

/// Body of `POST /users/ban`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    pub admin_id: Option<i64>,
    pub user_id: Option<i64>,
    /// Absent means permanent
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Account,
}

#[derive(Debug, Serialize)]
pub struct BanResponse {
    pub ban: Ban,
}

/// POST /users/add
///
/// 409 if the id is taken.
pub async fn add_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UserIdRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = require_id(request.user_id, "userId")?;
    let user = state.store.add_account(user_id).await?;

    info!(user_id, "User added");
    Ok(Json(UserResponse { user }))
}

/// POST /users/byId
pub async fn user_by_id(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UserIdRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = require_id(request.user_id, "userId")?;
    let user = state
        .store
        .get_account(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(UserResponse { user }))
}

/// POST /users/ban (admin)
pub async fn ban_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<BanUserRequest>,
) -> ApiResult<Json<BanResponse>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    let user_id = require_id(request.user_id, "userId")?;
    require_admin(&state.store, admin_id).await?;

    let ban = state
        .store
        .add_ban(user_id, admin_id, request.expiration_date.map(time::truncate))
        .await?;

    Ok(Json(BanResponse { ban }))
}

/// POST /users/makeAdmin (admin)
///
/// The promoted account keeps its ban history.
pub async fn make_admin(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdminUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let (admin_id, user_id) = request.validate()?;
    require_admin(&state.store, admin_id).await?;

    let user = state
        .store
        .promote_to_admin(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(UserResponse { user }))
}

/// POST /users/remove (admin)
pub async fn remove_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AdminUserRequest>,
) -> ApiResult<Json<Value>> {
    let (admin_id, user_id) = request.validate()?;
    require_admin(&state.store, admin_id).await?;

    if !state.store.remove_account(user_id).await? {
        return Err(ApiError::not_found("User"));
    }

    info!(user_id, admin_id, "User removed");
    Ok(Json(json!({})))
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/add", post(add_user))
        .route("/users/byId", post(user_by_id))
        .route("/users/ban", post(ban_user))
        .route("/users/makeAdmin", post(make_admin))
        .route("/users/remove", post(remove_user))
}
