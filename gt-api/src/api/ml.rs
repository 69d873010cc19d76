//! Classifier maintenance endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use super::auth::require_admin;
use super::validation::require_id;
use super::ApiJson;
use crate::{ApiResult, AppState};

/// Body of `POST /mlModel/training/immediate`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrainRequest {
    pub admin_id: Option<i64>,
}

/// POST /mlModel/training/immediate (admin)
///
/// Spawns the retrain request and answers immediately; the outcome is only
/// logged.
pub async fn retrain_immediately(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RetrainRequest>,
) -> ApiResult<Json<Value>> {
    let admin_id = require_id(request.admin_id, "adminId")?;
    require_admin(&state.store, admin_id).await?;

    let classifier = state.classifier.clone();
    tokio::spawn(async move {
        if let Err(e) = classifier.retrain().await {
            error!(error = %e, "Classifier retraining failed");
        }
    });

    info!(admin_id, "Classifier retraining requested");
    Ok(Json(json!({})))
}

/// Build classifier routes
pub fn ml_routes() -> Router<AppState> {
    Router::new().route("/mlModel/training/immediate", post(retrain_immediately))
}
