//! Plant classifier boundary
//!
//! The classifier is an external service. The route layer only sees the
//! [`Classifier`] trait: `predict` returns per-detection classes, scores and
//! normalized bounding boxes; `retrain` kicks off an out-of-band training job.

mod http;

pub use http::HttpClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classifier failures
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// No classifier endpoint configured
    #[error("No plant classifier is configured")]
    Unavailable,

    /// Transport failure talking to the classifier
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Classifier answered with a non-success status
    #[error("Classifier returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Prediction arrays disagree with `numResults`
    #[error("Malformed prediction: {0}")]
    MalformedPrediction(String),
}

/// Raw classifier output
///
/// Detection `i` is `classes[i]`, `scores[i]` and `boxes[4*i..4*i+4]`, the box
/// being `(minY, minX, maxY, maxX)` as fractions of the image height/width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub num_results: usize,
    pub classes: Vec<i64>,
    pub scores: Vec<f64>,
    pub boxes: Vec<f64>,
}

impl Prediction {
    /// Split the parallel arrays into detections
    pub fn detections(&self) -> Result<Vec<Detection>, ClassifierError> {
        let n = self.num_results;
        if self.classes.len() != n || self.scores.len() != n || self.boxes.len() != n * 4 {
            return Err(ClassifierError::MalformedPrediction(format!(
                "numResults={} but got {} classes, {} scores, {} box coordinates",
                n,
                self.classes.len(),
                self.scores.len(),
                self.boxes.len()
            )));
        }

        Ok((0..n)
            .map(|i| Detection {
                plant_id: self.classes[i],
                score: self.scores[i],
                bbox: NormalizedBox {
                    min_y: self.boxes[i * 4],
                    min_x: self.boxes[i * 4 + 1],
                    max_y: self.boxes[i * 4 + 2],
                    max_x: self.boxes[i * 4 + 3],
                },
            })
            .collect())
    }
}

/// One classifier detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Predicted class, which is a plant id
    pub plant_id: i64,
    pub score: f64,
    pub bbox: NormalizedBox,
}

/// Bounding box in [0, 1] image fractions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub min_y: f64,
    pub min_x: f64,
    pub max_y: f64,
    pub max_x: f64,
}

/// Pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl NormalizedBox {
    /// Top-left and bottom-right corners in pixels
    pub fn to_pixels(&self, width: f64, height: f64) -> (Point, Point) {
        (
            Point {
                x: self.min_x * width,
                y: self.min_y * height,
            },
            Point {
                x: self.max_x * width,
                y: self.max_y * height,
            },
        )
    }
}

/// Plant classifier service
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Detect plants in an encoded image
    async fn predict(&self, image: &str) -> Result<Prediction, ClassifierError>;

    /// Request a retraining run
    async fn retrain(&self) -> Result<(), ClassifierError>;
}

/// Stand-in used when no classifier endpoint is configured
pub struct UnavailableClassifier;

#[async_trait]
impl Classifier for UnavailableClassifier {
    async fn predict(&self, _image: &str) -> Result<Prediction, ClassifierError> {
        Err(ClassifierError::Unavailable)
    }

    async fn retrain(&self) -> Result<(), ClassifierError> {
        Err(ClassifierError::Unavailable)
    }
}
