//! HTTP client for a remote plant classifier
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /predict` with `{"image": <data>}` answers a [`Prediction`]
//! - `POST /retrain` answers any 2xx once training has been scheduled

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{Classifier, ClassifierError, Prediction};

const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);

/// Retraining requests may block while the job is queued
const RETRAIN_TIMEOUT: Duration = Duration::from_secs(300);

/// Classifier reached over HTTP
pub struct HttpClassifier {
    http_client: Client,
    base_url: String,
}

impl HttpClassifier {
    /// `base_url` without a trailing slash, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClassifierError> {
        let http_client = Client::builder().timeout(PREDICT_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

async fn check_status(response: Response) -> Result<Response, ClassifierError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClassifierError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(&self, image: &str) -> Result<Prediction, ClassifierError> {
        debug!(url = %self.base_url, "Requesting plant prediction");

        let response = self
            .http_client
            .post(self.endpoint("predict"))
            .json(&json!({ "image": image }))
            .send()
            .await?;

        let prediction: Prediction = check_status(response).await?.json().await?;
        debug!(num_results = prediction.num_results, "Prediction received");
        Ok(prediction)
    }

    async fn retrain(&self) -> Result<(), ClassifierError> {
        let response = self
            .http_client
            .post(self.endpoint("retrain"))
            .timeout(RETRAIN_TIMEOUT)
            .send()
            .await?;

        check_status(response).await?;
        info!(url = %self.base_url, "Classifier retraining scheduled");
        Ok(())
    }
}
