//! Plant endpoints: catalogue management, lookup, search and image identification

use axum::{extract::State, routing::post, Json, Router};
use gt_common::models::{NewPlant, Photo, Plant};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::auth::require_admin;
use super::validation::{max_photos, require, require_id, require_text};
use super::ApiJson;
use crate::db::Store;
use crate::ml::Point;
use crate::{ApiError, ApiResult, AppState};

/// Body of `POST /plants/add`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlantRequest {
    pub admin_id: Option<i64>,
    pub name: Option<String>,
    pub bio: Option<String>,
}

/// Body of `POST /plants/byId`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantByIdRequest {
    pub plant_id: Option<i64>,
    pub max_photos: Option<i64>,
}

/// Image submitted for identification
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    /// Encoded image, passed through to the classifier
    pub data: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Body of `POST /plants/byImage`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantsByImageRequest {
    pub image: Option<ImagePayload>,
    pub max_photos: Option<i64>,
}

struct IdentifyImage {
    data: String,
    width: f64,
    height: f64,
    max_photos: i64,
}

impl PlantsByImageRequest {
    fn validate(self, default_max_photos: u32) -> ApiResult<IdentifyImage> {
        let image = require(self.image, "image")?;
        Ok(IdentifyImage {
            data: require_text(image.data, "image.data")?,
            width: dimension(image.width, "image.width")?,
            height: dimension(image.height, "image.height")?,
            max_photos: max_photos(self.max_photos, default_max_photos)?,
        })
    }
}

fn dimension(value: Option<f64>, param: &str) -> ApiResult<f64> {
    let value = require(value, param)?;
    if !(value.is_finite() && value > 0.0) {
        return Err(ApiError::not_positive(param));
    }
    Ok(value)
}

/// Body of `POST /plants/byQuery`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantsByQueryRequest {
    pub query: Option<String>,
    pub max_photos: Option<i64>,
}

/// Body of `POST /plants/update`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlantRequest {
    pub admin_id: Option<i64>,
    pub plant_id: Option<i64>,
    pub bio: Option<String>,
}

/// Body of `POST /plants/remove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePlantRequest {
    pub admin_id: Option<i64>,
    pub plant_id: Option<i64>,
}

/// A plant with its top-rated photos
#[derive(Debug, Serialize)]
pub struct PlantWithPhotos {
    pub plant: Plant,
    pub photos: Vec<Photo>,
}

/// One identified plant in a submitted image
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMatch {
    pub plant: Plant,
    pub photos: Vec<Photo>,
    pub score: f64,
    pub top_left: Point,
    pub bottom_right: Point,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub plant: Plant,
}

async fn with_photos(store: &Store, plant: Plant, max_photos: i64) -> ApiResult<PlantWithPhotos> {
    let photos = store.top_plant_photos(plant.id, max_photos).await?;
    Ok(PlantWithPhotos { plant, photos })
}

/// POST /plants/add (admin)
pub async fn add_plant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<AddPlantRequest>,
) -> ApiResult<Json<PlantWithPhotos>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    let new_plant = NewPlant {
        name: require_text(request.name, "name")?,
        bio: require_text(request.bio, "bio")?,
    };
    require_admin(&state.store, admin_id).await?;

    let plant = state.store.add_plant(&new_plant).await?;
    info!(plant_id = plant.id, name = %plant.name, admin_id, "Plant added");

    let response = with_photos(&state.store, plant, i64::from(state.plants_max_photos)).await?;
    Ok(Json(response))
}

/// POST /plants/byId
pub async fn plant_by_id(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlantByIdRequest>,
) -> ApiResult<Json<PlantWithPhotos>> {
    let plant_id = require_id(request.plant_id, "plantId")?;
    let max_photos = max_photos(request.max_photos, state.plants_max_photos)?;

    let plant = state
        .store
        .get_plant(plant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plant"))?;

    Ok(Json(with_photos(&state.store, plant, max_photos).await?))
}

/// POST /plants/byImage
///
/// Runs the classifier and returns one result per detection, with the box
/// converted to pixel corners of the submitted image. Detections naming an
/// unknown plant are skipped.
pub async fn plants_by_image(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlantsByImageRequest>,
) -> ApiResult<Json<ResultsResponse<ImageMatch>>> {
    let identify = request.validate(state.plants_max_photos)?;

    let prediction = state.classifier.predict(&identify.data).await?;
    let detections = prediction.detections()?;
    debug!(detections = detections.len(), "Image classified");

    let mut results = Vec::with_capacity(detections.len());
    for detection in detections {
        let Some(plant) = state.store.get_plant(detection.plant_id).await? else {
            warn!(
                plant_id = detection.plant_id,
                "Classifier predicted a plant that is not in the catalogue"
            );
            continue;
        };

        let photos = state
            .store
            .top_plant_photos(plant.id, identify.max_photos)
            .await?;
        let (top_left, bottom_right) = detection.bbox.to_pixels(identify.width, identify.height);

        results.push(ImageMatch {
            plant,
            photos,
            score: detection.score,
            top_left,
            bottom_right,
        });
    }

    Ok(Json(ResultsResponse { results }))
}

/// POST /plants/byQuery
///
/// Case-insensitive substring match over name and bio.
pub async fn plants_by_query(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlantsByQueryRequest>,
) -> ApiResult<Json<ResultsResponse<PlantWithPhotos>>> {
    let query = require_text(request.query, "query")?;
    let max_photos = max_photos(request.max_photos, state.plants_max_photos)?;

    let plants = state.store.search_plants(query.trim()).await?;
    let mut results = Vec::with_capacity(plants.len());
    for plant in plants {
        results.push(with_photos(&state.store, plant, max_photos).await?);
    }

    Ok(Json(ResultsResponse { results }))
}

/// POST /plants/update (admin)
///
/// Only the bio is mutable.
pub async fn update_plant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UpdatePlantRequest>,
) -> ApiResult<Json<PlantResponse>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    let plant_id = require_id(request.plant_id, "plantId")?;
    let bio = require_text(request.bio, "bio")?;
    require_admin(&state.store, admin_id).await?;

    let mut plant = state
        .store
        .get_plant(plant_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plant"))?;
    plant.set_bio(bio);

    if !state.store.update_plant(&plant).await? {
        return Err(ApiError::not_found("Plant"));
    }

    info!(plant_id, admin_id, "Plant bio updated");
    Ok(Json(PlantResponse { plant }))
}

/// POST /plants/remove (admin)
pub async fn remove_plant(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RemovePlantRequest>,
) -> ApiResult<Json<Value>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    let plant_id = require_id(request.plant_id, "plantId")?;
    require_admin(&state.store, admin_id).await?;

    if !state.store.remove_plant(plant_id).await? {
        return Err(ApiError::not_found("Plant"));
    }

    info!(plant_id, admin_id, "Plant removed");
    Ok(Json(json!({})))
}

/// Build plant routes
pub fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/plants/add", post(add_plant))
        .route("/plants/byId", post(plant_by_id))
        .route("/plants/byImage", post(plants_by_image))
        .route("/plants/byQuery", post(plants_by_query))
        .route("/plants/update", post(update_plant))
        .route("/plants/remove", post(remove_plant))
}
