//! gt-api library interface
//!
//! Exposes the router and its state so integration tests can drive the
//! service without binding a socket.

pub mod api;
pub mod db;
pub mod error;
pub mod ml;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::db::Store;
use crate::ml::Classifier;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Storage engine
    pub store: Store,
    /// Plant classifier boundary
    pub classifier: Arc<dyn Classifier>,
    /// Photos attached to each plant when `maxPhotos` is omitted
    pub plants_max_photos: u32,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(store: Store, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            store,
            classifier,
            plants_max_photos: gt_common::config::DEFAULT_PLANTS_MAX_PHOTOS,
            startup_time: Utc::now(),
        }
    }

    pub fn with_plants_max_photos(mut self, plants_max_photos: u32) -> Self {
        self.plants_max_photos = plants_max_photos;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::photo_routes())
        .merge(api::photo_report_routes())
        .merge(api::plant_routes())
        .merge(api::ml_routes())
        .merge(api::user_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
