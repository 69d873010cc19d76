//! Integration tests for the GreenThumb HTTP API
//!
//! Drives `build_router` through `tower::ServiceExt::oneshot` against an
//! in-memory database and a scripted classifier.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::Notify;
use tower::ServiceExt;

use gt_api::db::Store;
use gt_api::ml::{Classifier, ClassifierError, Prediction, UnavailableClassifier};
use gt_api::{build_router, AppState};

const ADMIN: i64 = 1;

/// Classifier answering a fixed prediction and counting retrain calls
#[derive(Default)]
struct ScriptedClassifier {
    prediction: Mutex<Option<Prediction>>,
    retrains: AtomicUsize,
    retrained: Notify,
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn predict(&self, _image: &str) -> Result<Prediction, ClassifierError> {
        self.prediction
            .lock()
            .unwrap()
            .clone()
            .ok_or(ClassifierError::Unavailable)
    }

    async fn retrain(&self) -> Result<(), ClassifierError> {
        self.retrains.fetch_add(1, Ordering::SeqCst);
        self.retrained.notify_one();
        Ok(())
    }
}

struct TestApp {
    router: Router,
    store: Store,
    classifier: Arc<ScriptedClassifier>,
}

impl TestApp {
    async fn new() -> Self {
        let store = Store::in_memory().await.unwrap();
        store.ensure_admin(ADMIN).await.unwrap();

        let classifier = Arc::new(ScriptedClassifier::default());
        let state = AppState::new(store.clone(), classifier.clone());

        Self {
            router: build_router(state),
            store,
            classifier,
        }
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }

    async fn add_user(&self, id: i64) {
        let (status, _) = self.post("/users/add", json!({ "userId": id })).await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn add_plant(&self, name: &str, bio: &str) -> i64 {
        let (status, body) = self
            .post(
                "/plants/add",
                json!({ "adminId": ADMIN, "name": name, "bio": bio }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["plant"]["id"].as_i64().unwrap()
    }

    async fn add_photo(&self, plant_id: i64, user_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/photos/add",
                json!({ "userId": user_id, "plantId": plant_id, "image": "https://img/fern.jpg" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["photo"]["id"].as_i64().unwrap()
    }

    async fn add_report(&self, photo_id: i64, user_id: i64) -> i64 {
        let (status, body) = self
            .post(
                "/photoReports/add",
                json!({ "userId": user_id, "photoId": photo_id, "reportText": "Not a plant." }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["report"]["id"].as_i64().unwrap()
    }

    async fn vote(&self, photo_id: i64, user_id: i64, vote: i64) -> Value {
        let (status, body) = self
            .post(
                "/photos/vote",
                json!({ "photoId": photo_id, "userId": user_id, "vote": vote }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["photo"].clone()
    }
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}

// ============================================================================
// Plants
// ============================================================================

#[tokio::test]
async fn test_add_plant_returns_plant_and_empty_photos() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/plants/add",
            json!({ "adminId": 1, "name": "Fern", "bio": "Leafy." }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["plant"]["id"].is_i64());
    assert_eq!(body["plant"]["name"], "Fern");
    assert_eq!(body["plant"]["bio"], "Leafy.");
    assert_eq!(body["photos"], json!([]));
}

#[tokio::test]
async fn test_admin_routes_reject_non_admin() {
    let app = TestApp::new().await;
    app.add_user(7).await;

    let (status, body) = app
        .post(
            "/plants/add",
            json!({ "adminId": 7, "name": "Fern", "bio": "Leafy." }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User is not authorized to perform this action.");

    let (status, _) = app
        .post("/mlModel/training/immediate", json!({ "adminId": 7 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post("/users/ban", json!({ "adminId": 404, "userId": 7 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_add_plant_validation_messages() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/plants/add", json!({ "adminId": ADMIN, "bio": "Leafy." }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing required 'name' parameter in request body.");

    let (status, body) = app
        .post(
            "/plants/add",
            json!({ "adminId": ADMIN, "name": "", "bio": "Leafy." }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'name' must be a non-empty String.");
}

#[tokio::test]
async fn test_plant_by_id_limits_photos() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    for _ in 0..5 {
        app.add_photo(fern, 2).await;
    }

    let (status, body) = app.post("/plants/byId", json!({ "plantId": fern })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plant"]["name"], "Fern");
    assert_eq!(body["photos"].as_array().unwrap().len(), 3);

    let (_, body) = app
        .post("/plants/byId", json!({ "plantId": fern, "maxPhotos": 1 }))
        .await;
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);

    let (status, body) = app.post("/plants/byId", json!({ "plantId": 999 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "The requested Plant object could not be found in the database."
    );
}

#[tokio::test]
async fn test_update_and_remove_plant() {
    let app = TestApp::new().await;
    let fern = app.add_plant("Fern", "Leafy.").await;

    let (status, body) = app
        .post(
            "/plants/update",
            json!({ "adminId": ADMIN, "plantId": fern, "bio": "Very leafy." }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plant"]["bio"], "Very leafy.");
    assert_eq!(body["plant"]["name"], "Fern");

    let (status, body) = app
        .post("/plants/remove", json!({ "adminId": ADMIN, "plantId": fern }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = app
        .post("/plants/remove", json!({ "adminId": ADMIN, "plantId": fern }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plants_by_query_matches_name_and_bio() {
    let app = TestApp::new().await;
    let fern = app.add_plant("Boston Fern", "Leafy.").await;
    let cactus = app.add_plant("Cactus", "Spiky cousin of no fern.").await;
    app.add_plant("Moss", "Soft.").await;

    let (status, body) = app.post("/plants/byQuery", json!({ "query": "fern" })).await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    let found: Vec<i64> = results
        .iter()
        .map(|r| r["plant"]["id"].as_i64().unwrap())
        .collect();
    assert_eq!(found, vec![fern, cactus]);
    assert_eq!(results[0]["photos"], json!([]));

    let maple = app.add_plant("Érable", "Leaves turn red.").await;
    let (status, body) = app.post("/plants/byQuery", json!({ "query": "éRABLE" })).await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["plant"]["id"], maple);

    let (status, _) = app.post("/plants/byQuery", json!({ "query": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_plants_by_image_converts_boxes_and_skips_unknown_plants() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    app.add_photo(fern, 2).await;

    *app.classifier.prediction.lock().unwrap() = Some(Prediction {
        num_results: 2,
        classes: vec![fern, 999],
        scores: vec![0.9, 0.4],
        boxes: vec![0.25, 0.5, 0.75, 1.0, 0.0, 0.0, 1.0, 1.0],
    });

    let (status, body) = app
        .post(
            "/plants/byImage",
            json!({ "image": { "data": "aGVsbG8=", "width": 200, "height": 100 } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["plant"]["id"], fern);
    assert_eq!(results[0]["score"], 0.9);
    assert_eq!(results[0]["topLeft"], json!({ "x": 100.0, "y": 25.0 }));
    assert_eq!(results[0]["bottomRight"], json!({ "x": 200.0, "y": 75.0 }));
    assert_eq!(results[0]["photos"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_plants_by_image_malformed_prediction_is_internal_error() {
    let app = TestApp::new().await;
    *app.classifier.prediction.lock().unwrap() = Some(Prediction {
        num_results: 1,
        classes: vec![1],
        scores: vec![],
        boxes: vec![0.0, 0.0, 1.0, 1.0],
    });

    let (status, body) = app
        .post(
            "/plants/byImage",
            json!({ "image": { "data": "aGVsbG8=", "width": 10, "height": 10 } }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_plants_by_image_without_classifier() {
    let store = Store::in_memory().await.unwrap();
    let app = build_router(AppState::new(store, Arc::new(UnavailableClassifier)));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/plants/byImage")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "image": { "data": "aGVsbG8=", "width": 10, "height": 10 } })
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Photos
// ============================================================================

#[tokio::test]
async fn test_add_photo_preserves_fields() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;

    let (status, body) = app
        .post(
            "/photos/add",
            json!({ "userId": 2, "plantId": fern, "image": "https://img/fern.jpg" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let photo = &body["photo"];
    assert!(photo["id"].is_i64());
    assert_eq!(photo["userId"], 2);
    assert_eq!(photo["plantId"], fern);
    assert_eq!(photo["image"], "https://img/fern.jpg");
    assert_eq!(photo["upvoteIds"], json!([]));
    assert_eq!(photo["downvoteIds"], json!([]));
    assert!(photo["uploadDate"].is_string());

    let (status, fetched) = app
        .post("/photos/byId", json!({ "photoId": photo["id"] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&fetched["photo"], photo);
}

#[tokio::test]
async fn test_add_photo_references_must_exist() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;

    let (status, body) = app
        .post(
            "/photos/add",
            json!({ "userId": 2, "plantId": 999, "image": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "The requested Plant object could not be found in the database."
    );

    let (status, _) = app
        .post(
            "/photos/add",
            json!({ "userId": 55, "plantId": fern, "image": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post(
            "/photos/add",
            json!({ "userId": -3, "plantId": fern, "image": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'userId' may not be negative.");
}

#[tokio::test]
async fn test_remove_photo() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;

    let (status, body) = app.post("/photos/remove", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = app.post("/photos/byId", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/photos/remove", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vote_is_set_membership() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;

    let voted = app.vote(photo, 3, 1).await;
    assert_eq!(voted["upvoteIds"], json!([3]));

    let voted = app.vote(photo, 3, 1).await;
    assert_eq!(voted["upvoteIds"], json!([3]));

    let voted = app.vote(photo, 3, -1).await;
    assert_eq!(voted["upvoteIds"], json!([]));
    assert_eq!(voted["downvoteIds"], json!([3]));

    let voted = app.vote(photo, 3, 0).await;
    assert_eq!(voted["downvoteIds"], json!([]));

    let (status, body) = app
        .post("/photos/vote", json!({ "photoId": photo, "userId": 3, "vote": 2 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'vote' is invalid.");
}

#[tokio::test]
async fn test_list_by_date_is_newest_first_and_windowed() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let moss = app.add_plant("Moss", "Soft.").await;

    let mut added = Vec::new();
    for plant in [fern, moss, fern, moss] {
        added.push(app.add_photo(plant, 2).await);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    app.add_photo(fern, 3).await;

    let (status, body) = app
        .post(
            "/photos/list/byDate",
            json!({ "startIndex": 0, "max": 10, "userId": 2 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut expected = added.clone();
    expected.reverse();
    assert_eq!(ids(&body["photos"]), expected);

    let (_, body) = app
        .post(
            "/photos/list/byDate",
            json!({ "startIndex": 3, "max": 10, "userId": 2 }),
        )
        .await;
    assert_eq!(ids(&body["photos"]), vec![added[0]]);

    let (_, body) = app
        .post(
            "/photos/list/byDate",
            json!({ "startIndex": 0, "max": 10, "plantId": moss }),
        )
        .await;
    assert_eq!(ids(&body["photos"]), vec![added[3], added[1]]);

    let (_, body) = app
        .post("/photos/list/byDate", json!({ "startIndex": 0, "max": 10 }))
        .await;
    let dates: Vec<String> = body["photos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["uploadDate"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates.len(), 5);
    let parsed: Vec<chrono::DateTime<chrono::Utc>> =
        dates.iter().map(|d| d.parse().unwrap()).collect();
    assert!(parsed.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn test_list_by_rating_orders_by_net_votes() {
    let app = TestApp::new().await;
    for id in 2..=5 {
        app.add_user(id).await;
    }
    let fern = app.add_plant("Fern", "Leafy.").await;
    let low = app.add_photo(fern, 2).await;
    let high = app.add_photo(fern, 2).await;
    let middle = app.add_photo(fern, 2).await;

    app.vote(high, 3, 1).await;
    app.vote(high, 4, 1).await;
    app.vote(middle, 3, 1).await;
    app.vote(low, 5, -1).await;

    let (status, body) = app
        .post(
            "/photos/list/byRating",
            json!({ "startIndex": 0, "max": 10, "plantId": fern }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["photos"]), vec![high, middle, low]);
}

#[tokio::test]
async fn test_list_pagination_validation() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/photos/list/byDate", json!({ "startIndex": 0, "max": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'max' must be positive.");

    let (status, body) = app
        .post("/photos/list/byRating", json!({ "startIndex": -1, "max": 5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'startIndex' may not be negative.");

    let (status, body) = app.post("/photos/list/byDate", json!({ "max": 5 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required 'startIndex' parameter in request body."
    );

    let (status, _) = app
        .post(
            "/photos/list/byDate",
            json!({ "startIndex": 0, "max": 5, "userId": 1, "plantId": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/photos/byId")
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (status, _) = app.post("/photos/byId", json!({ "photoId": "seven" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Photo reports
// ============================================================================

#[tokio::test]
async fn test_handle_report_remove_photo() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;
    let report = app.add_report(photo, 3).await;

    let (status, body) = app
        .post(
            "/photoReports/handle",
            json!({ "photoReportId": report, "adminAction": 1, "adminId": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ban"], Value::Null);

    let (status, _) = app.post("/photos/byId", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .post("/photoReports/byId", json!({ "photoReportId": report }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["report"]["adminAction"], 1);
    assert_eq!(body["report"]["adminId"], 1);
    assert!(body["report"]["handleDate"].is_string());
    assert_eq!(body["report"]["photoId"], photo);
}

#[tokio::test]
async fn test_handle_report_remove_and_ban() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;
    let report = app.add_report(photo, 3).await;

    let (status, body) = app
        .post(
            "/photoReports/handle",
            json!({ "photoReportId": report, "adminAction": 2, "adminId": ADMIN }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ban"]["userId"], 2);
    assert_eq!(body["ban"]["adminId"], ADMIN);
    assert_eq!(body["ban"]["expirationDate"], Value::Null);

    let (status, _) = app.post("/photos/byId", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uploader = app.store.get_account(2).await.unwrap().unwrap();
    assert_eq!(uploader.bans.len(), 1);
    assert_eq!(uploader.bans[0].admin_id, ADMIN);

    let (status, _) = app
        .post(
            "/photoReports/handle",
            json!({ "photoReportId": report, "adminAction": 2, "adminId": ADMIN }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.store.get_account(2).await.unwrap().unwrap().bans.len(), 1);
}

#[tokio::test]
async fn test_handle_report_rejects_bad_action() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/photoReports/handle",
            json!({ "photoReportId": 1, "adminAction": 3, "adminId": ADMIN }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Parameter 'adminAction' is invalid.");

    let (status, _) = app
        .post(
            "/photoReports/handle",
            json!({ "photoReportId": 404, "adminAction": 0, "adminId": ADMIN }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_listing_filters() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;
    let first = app.add_report(photo, 3).await;
    let second = app.add_report(photo, 3).await;

    app.post(
        "/photoReports/handle",
        json!({ "photoReportId": first, "adminAction": 0, "adminId": ADMIN }),
    )
    .await;

    let (status, body) = app
        .post(
            "/photoReports/list/byDate",
            json!({ "adminId": ADMIN, "startIndex": 0, "max": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["photoReports"]), vec![first, second]);

    let (_, body) = app
        .post(
            "/photoReports/list/byDate",
            json!({ "adminId": ADMIN, "startIndex": 0, "max": 10, "unhandledOnly": true }),
        )
        .await;
    assert_eq!(ids(&body["photoReports"]), vec![second]);

    let (_, body) = app
        .post(
            "/photoReports/list/byDate",
            json!({ "adminId": ADMIN, "startIndex": 0, "max": 10, "handledBy": ADMIN }),
        )
        .await;
    assert_eq!(ids(&body["photoReports"]), vec![first]);

    let (status, _) = app
        .post(
            "/photoReports/list/byDate",
            json!({
                "adminId": ADMIN,
                "startIndex": 0,
                "max": 10,
                "handledBy": ADMIN,
                "unhandledOnly": true
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remove_report() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;
    let report = app.add_report(photo, 2).await;

    let (status, _) = app
        .post(
            "/photoReports/remove",
            json!({ "adminId": ADMIN, "photoReportId": report }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post("/photoReports/byId", json!({ "photoReportId": report }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["message"],
        "The requested PhotoReport object could not be found in the database."
    );
}

// ============================================================================
// Users and bans
// ============================================================================

#[tokio::test]
async fn test_add_and_fetch_user() {
    let app = TestApp::new().await;

    let (status, body) = app.post("/users/add", json!({ "userId": 42 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], json!({ "id": 42, "admin": false, "bans": [] }));

    let (status, _) = app.post("/users/add", json!({ "userId": 42 })).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app.post("/users/byId", json!({ "userId": ADMIN })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["admin"], true);

    let (status, _) = app.post("/users/byId", json!({ "userId": 43 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ban_expiration_is_echoed_at_stored_precision() {
    let app = TestApp::new().await;
    app.add_user(5).await;
    app.add_user(6).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 6).await;
    let report = app.add_report(photo, 5).await;
    let precise = "2030-01-01T00:00:00.123456789Z";

    let (status, body) = app
        .post(
            "/users/ban",
            json!({ "adminId": ADMIN, "userId": 5, "expirationDate": precise }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ban"]["expirationDate"], "2030-01-01T00:00:00.123Z");

    let (_, user) = app.post("/users/byId", json!({ "userId": 5 })).await;
    assert_eq!(user["user"]["bans"][0], body["ban"]);

    let (status, body) = app
        .post(
            "/photoReports/handle",
            json!({
                "photoReportId": report,
                "adminAction": 2,
                "adminId": ADMIN,
                "expirationDate": precise
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ban"]["expirationDate"], "2030-01-01T00:00:00.123Z");

    let (_, uploader) = app.post("/users/byId", json!({ "userId": 6 })).await;
    assert_eq!(uploader["user"]["bans"][0], body["ban"]);
}

#[tokio::test]
async fn test_make_admin_preserves_bans() {
    let app = TestApp::new().await;
    app.add_user(5).await;

    let (_, first) = app
        .post(
            "/users/ban",
            json!({ "adminId": ADMIN, "userId": 5, "expirationDate": "2000-01-01T00:00:00Z" }),
        )
        .await;
    let (_, second) = app
        .post("/users/ban", json!({ "adminId": ADMIN, "userId": 5 }))
        .await;

    let (status, body) = app
        .post("/users/makeAdmin", json!({ "adminId": ADMIN, "userId": 5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["admin"], true);

    let mut bans: Vec<Value> = body["user"]["bans"].as_array().unwrap().clone();
    bans.sort_by_key(|ban| ban["id"].as_i64().unwrap());
    assert_eq!(bans, vec![first["ban"].clone(), second["ban"].clone()]);

    let (status, _) = app
        .post("/users/makeAdmin", json!({ "adminId": ADMIN, "userId": 99 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_banned_user_cannot_post() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    app.add_user(3).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 3).await;

    let (status, _) = app
        .post(
            "/users/ban",
            json!({ "adminId": ADMIN, "userId": 2, "expirationDate": "2000-01-01T00:00:00Z" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // Expired ban does not block
    app.vote(photo, 2, 1).await;

    let (status, _) = app
        .post("/users/ban", json!({ "adminId": ADMIN, "userId": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .post(
            "/photos/add",
            json!({ "userId": 2, "plantId": fern, "image": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User is not authorized to perform this action.");

    let (status, _) = app
        .post("/photos/vote", json!({ "photoId": photo, "userId": 2, "vote": -1 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/photoReports/add",
            json!({ "userId": 2, "photoId": photo, "reportText": "spam" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_remove_user_cascades() {
    let app = TestApp::new().await;
    app.add_user(2).await;
    let fern = app.add_plant("Fern", "Leafy.").await;
    let photo = app.add_photo(fern, 2).await;

    let (status, body) = app
        .post("/users/remove", json!({ "adminId": ADMIN, "userId": 2 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    let (status, _) = app.post("/photos/byId", json!({ "photoId": photo })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post("/users/remove", json!({ "adminId": ADMIN, "userId": 2 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Classifier maintenance and health
// ============================================================================

#[tokio::test]
async fn test_retrain_is_triggered() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/mlModel/training/immediate", json!({ "adminId": ADMIN }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({}));

    tokio::time::timeout(Duration::from_secs(5), app.classifier.retrained.notified())
        .await
        .unwrap();
    assert_eq!(app.classifier.retrains.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gt-api");
    assert!(body["uptimeSeconds"].is_u64());
}
