//! End-to-end request flow through the router, with in-memory stores.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use recs_api::rest::AppState;
use recs_api::server::build_router;
use recs_core::config::ComposerConfig;
use recs_core::types::StoreKind;
use recs_core::{ItemId, RecsError, RecsResult, SimilarItems};
use recs_events::EventStore;
use recs_personalization::snapshot::{PersonalRow, PopularRow, SimilarRow};
use recs_personalization::{Composer, OfflineStore, SimilarityStore, SimilaritySource};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

fn similarity() -> SimilarityStore {
    let rows = [
        (3911, 200, 0.9),
        (3911, 300, 0.8),
        (8449, 700, 0.95),
        (8449, 200, 0.4),
        (1168, 800, 0.6),
    ]
    .into_iter()
    .map(|(item_id_1, item_id_2, score)| SimilarRow {
        item_id_1,
        item_id_2,
        score,
    });
    SimilarityStore::from_rows(rows)
}

fn offline() -> OfflineStore {
    let personal = [(28073, 11), (28073, 12), (54633, 21), (54633, 22)]
        .into_iter()
        .map(|(user_id, item_id)| PersonalRow { user_id, item_id });
    let popular = [10, 20, 30, 40, 50, 60]
        .into_iter()
        .map(|item_id| PopularRow { item_id });
    OfflineStore::from_rows(personal, popular)
}

fn app_with(similarity: Arc<dyn SimilaritySource>) -> Router {
    let composer = Composer::new(
        Arc::new(EventStore::new(10)),
        similarity,
        Arc::new(offline()),
        Duration::from_millis(200),
        3,
    );
    build_router(AppState {
        composer: Arc::new(composer),
        defaults: ComposerConfig::default(),
        node_id: "test-node".to_string(),
        start_time: Instant::now(),
    })
}

fn app() -> Router {
    app_with(Arc::new(similarity()))
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn ids(value: &Value) -> Vec<ItemId> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect()
}

struct Down;

#[async_trait]
impl SimilaritySource for Down {
    async fn similar_items(&self, _item_id: ItemId, _k: usize) -> RecsResult<SimilarItems> {
        Err(RecsError::unreachable(StoreKind::Similarity, "connection refused"))
    }

    async fn ping(&self) -> RecsResult<()> {
        Err(RecsError::unreachable(StoreKind::Similarity, "connection refused"))
    }
}

#[tokio::test]
async fn test_health_reports_healthy() {
    let app = app();
    let (status, body) = send(&app, "GET", "/healthy").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["components"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_default_users_get_same_recs() {
    let app = app();
    let (_, user_5) = send(&app, "POST", "/recommendations?user_id=5&k=5").await;
    let (_, user_1) = send(&app, "POST", "/recommendations?user_id=1&k=5").await;
    assert_eq!(ids(&user_5["recs"]), vec![10, 20, 30, 40, 50]);
    assert_eq!(user_5["recs"], user_1["recs"]);
}

#[tokio::test]
async fn test_personal_user_gets_personal_recs() {
    let app = app();
    let (status, body) = send(&app, "POST", "/recommendations?user_id=28073&k=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["recs"]), vec![11, 12]);
}

#[tokio::test]
async fn test_online_history_flow() {
    let app = app();
    for item in [3911, 1168, 109123, 8449] {
        let uri = format!("/events/put?user_id=54633&item_id={item}");
        let (status, body) = send(&app, "POST", &uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], "OK");
    }

    let (_, history) = send(&app, "POST", "/events/get?user_id=54633&k=10").await;
    assert_eq!(ids(&history["events"]), vec![8449, 109123, 1168, 3911]);

    // default num_events = 3: 8449, 109123 (unknown), 1168
    let (_, online) = send(&app, "POST", "/recommendations_online?user_id=54633").await;
    assert_eq!(ids(&online["recs"]), vec![700, 800, 200]);

    let (_, online) =
        send(&app, "POST", "/recommendations_online?user_id=54633&k=5&num_events=4").await;
    assert_eq!(ids(&online["recs"]), vec![700, 200, 300, 800]);

    let (_, offline) = send(&app, "POST", "/recommendations_offline?user_id=54633&k=5").await;
    assert_eq!(ids(&offline["recs"]), vec![21, 22]);

    // online [700, 800, 200] x offline [21, 22]
    let (_, blended) = send(&app, "POST", "/recommendations?user_id=54633&k=5").await;
    assert_eq!(ids(&blended["recs"]), vec![700, 21, 800, 22]);
}

#[tokio::test]
async fn test_similar_items_endpoint() {
    let app = app();
    let (status, body) = send(&app, "POST", "/similar_items?item_id=3911&k=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["item_ids"]), vec![200]);
    assert_eq!(body["scores"][0].as_f64(), Some(0.9));

    let (_, body) = send(&app, "POST", "/similar_items?item_id=1&k=3").await;
    assert!(body["item_ids"].as_array().unwrap().is_empty());
    assert!(body["scores"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_stats_count_each_path() {
    let app = app();
    send(&app, "POST", "/offline/get_recs?user_id=5&k=2").await;
    send(&app, "POST", "/offline/get_recs?user_id=28073&k=2").await;
    send(&app, "POST", "/recommendations?user_id=28073&k=2").await;

    let (status, stats) = send(&app, "GET", "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["personal_hits"], 2);
    assert_eq!(stats["default_hits"], 1);
    assert_eq!(stats["request_personal_count"], 2);
    assert_eq!(stats["request_default_count"], 1);
}

#[tokio::test]
async fn test_unreachable_store_surfaces_as_bad_gateway() {
    let app = app_with(Arc::new(Down));
    send(&app, "POST", "/events/put?user_id=1&item_id=3911").await;

    let (status, body) = send(&app, "POST", "/recommendations_online?user_id=1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "upstream_unreachable");

    let (status, body) = send(&app, "GET", "/healthy").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");

    // no online history means no similarity call
    let (status, _) = send(&app, "POST", "/recommendations?user_id=2").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_oversized_k_rejected() {
    let app = app();
    let (status, body) = send(&app, "POST", "/recommendations?user_id=1&k=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn test_missing_user_id_rejected() {
    let app = app();
    let (status, _) = send(&app, "POST", "/recommendations?k=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
