//! Photo endpoints: upload, lookup, removal, voting and listings

use axum::{extract::State, routing::post, Json, Router};
use gt_common::models::{NewPhoto, Photo, Vote};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::auth::require_unbanned;
use super::validation::{optional_id, page, require, require_id, require_text};
use super::ApiJson;
use crate::db::{Page, PhotoFilter};
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /photos/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoRequest {
    pub user_id: Option<i64>,
    pub plant_id: Option<i64>,
    pub image: Option<String>,
}

impl AddPhotoRequest {
    fn validate(self) -> ApiResult<NewPhoto> {
        Ok(NewPhoto {
            user_id: require_id(self.user_id, "userId")?,
            plant_id: require_id(self.plant_id, "plantId")?,
            image: require_text(self.image, "image")?,
        })
    }
}

/// Body of `POST /photos/byId` and `POST /photos/remove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoIdRequest {
    pub photo_id: Option<i64>,
}

/// Body of `POST /photos/vote`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub photo_id: Option<i64>,
    pub user_id: Option<i64>,
    /// `1` up, `-1` down, `0` withdraw
    pub vote: Option<i64>,
}

struct CastVote {
    photo_id: i64,
    user_id: i64,
    vote: Vote,
}

impl VoteRequest {
    fn validate(self) -> ApiResult<CastVote> {
        Ok(CastVote {
            photo_id: require_id(self.photo_id, "photoId")?,
            user_id: require_id(self.user_id, "userId")?,
            vote: Vote::try_from(require(self.vote, "vote")?)?,
        })
    }
}

/// Body of both photo listings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotosRequest {
    pub start_index: Option<i64>,
    pub max: Option<i64>,
    pub user_id: Option<i64>,
    pub plant_id: Option<i64>,
}

impl ListPhotosRequest {
    fn validate(self) -> ApiResult<(PhotoFilter, Page)> {
        let page = page(self.start_index, self.max)?;
        let filter = match (
            optional_id(self.user_id, "userId")?,
            optional_id(self.plant_id, "plantId")?,
        ) {
            (None, None) => PhotoFilter::All,
            (Some(user_id), None) => PhotoFilter::ByUser(user_id),
            (None, Some(plant_id)) => PhotoFilter::ByPlant(plant_id),
            (Some(_), Some(_)) => {
                return Err(ApiError::BadRequest(
                    "Parameters 'userId' and 'plantId' may not both be defined.".to_string(),
                ))
            }
        };
        Ok((filter, page))
    }
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub photo: Photo,
}

#[derive(Debug, Serialize)]
pub struct PhotoListResponse {
    pub photos: Vec<Photo>,
}

/// POST /photos/add
///
/// The uploader must exist and not be banned; the plant must exist.
pub async fn add_photo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddPhotoRequest>,
) -> ApiResult<Json<PhotoResponse>> {
    let new_photo = request.validate()?;

    require_unbanned(&state.store, new_photo.user_id).await?;
    if state.store.get_plant(new_photo.plant_id).await?.is_none() {
        return Err(ApiError::not_found("Plant"));
    }

    let photo = state.store.add_photo(&new_photo).await?;
    info!(
        photo_id = photo.id,
        plant_id = photo.plant_id,
        user_id = photo.user_id,
        "Photo added"
    );

    Ok(Json(PhotoResponse { photo }))
}

/// POST /photos/byId
pub async fn photo_by_id(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PhotoIdRequest>,
) -> ApiResult<Json<PhotoResponse>> {
    let photo_id = require_id(request.photo_id, "photoId")?;
    let photo = state
        .store
        .get_photo(photo_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Photo"))?;

    Ok(Json(PhotoResponse { photo }))
}

/// POST /photos/remove
pub async fn remove_photo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PhotoIdRequest>,
) -> ApiResult<Json<Value>> {
    let photo_id = require_id(request.photo_id, "photoId")?;
    if !state.store.remove_photo(photo_id).await? {
        return Err(ApiError::not_found("Photo"));
    }

    info!(photo_id, "Photo removed");
    Ok(Json(json!({})))
}

/// POST /photos/vote
///
/// Moves the voter between the up/down sets; vote `0` withdraws.
pub async fn vote_photo(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VoteRequest>,
) -> ApiResult<Json<PhotoResponse>> {
    let cast = request.validate()?;

    require_unbanned(&state.store, cast.user_id).await?;
    let photo = state
        .store
        .cast_vote(cast.photo_id, cast.user_id, cast.vote)
        .await?
        .ok_or_else(|| ApiError::not_found("Photo"))?;

    Ok(Json(PhotoResponse { photo }))
}

/// POST /photos/list/byDate
pub async fn list_photos_by_date(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ListPhotosRequest>,
) -> ApiResult<Json<PhotoListResponse>> {
    let (filter, page) = request.validate()?;
    let photos = state.store.list_photos_by_date(filter, page).await?;
    Ok(Json(PhotoListResponse { photos }))
}

/// POST /photos/list/byRating
pub async fn list_photos_by_rating(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ListPhotosRequest>,
) -> ApiResult<Json<PhotoListResponse>> {
    let (filter, page) = request.validate()?;
    let photos = state.store.list_photos_by_rating(filter, page).await?;
    Ok(Json(PhotoListResponse { photos }))
}

/// Build photo routes
pub fn photo_routes() -> Router<AppState> {
    Router::new()
        .route("/photos/add", post(add_photo))
        .route("/photos/byId", post(photo_by_id))
        .route("/photos/remove", post(remove_photo))
        .route("/photos/vote", post(vote_photo))
        .route("/photos/list/byDate", post(list_photos_by_date))
        .route("/photos/list/byRating", post(list_photos_by_rating))
}
