//! REST API handlers for events, similarity, offline/online/blended
//! recommendations, request stats, and operational probes.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use recs_core::config::ComposerConfig;
use recs_core::types::HealthReport;
use recs_core::{ItemId, RecsError, UserId};
use recs_personalization::Composer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

/// Upper bound accepted for `k` and `num_events`.
const MAX_K: usize = 1000;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<Composer>,
    pub defaults: ComposerConfig,
    pub node_id: String,
    pub start_time: Instant,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventPutParams {
    #[param(value_type = i64)]
    pub user_id: UserId,
    #[param(value_type = i64)]
    pub item_id: ItemId,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserParams {
    #[param(value_type = i64)]
    pub user_id: UserId,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OnlineParams {
    #[param(value_type = i64)]
    pub user_id: UserId,
    pub k: Option<usize>,
    pub num_events: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SimilarParams {
    #[param(value_type = i64)]
    pub item_id: ItemId,
    pub k: Option<usize>,
}

fn bounded(
    value: Option<usize>,
    default: usize,
) -> Result<usize, (StatusCode, Json<ErrorResponse>)> {
    let value = value.unwrap_or(default);
    if value > MAX_K {
        metrics::counter!("api.validation_errors").increment(1);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "invalid_request".to_string(),
                message: format!("'k' and 'num_events' must not exceed {MAX_K}"),
            }),
        ));
    }
    Ok(value)
}

fn store_error(e: RecsError) -> (StatusCode, Json<ErrorResponse>) {
    metrics::counter!("api.errors").increment(1);
    match e {
        RecsError::UpstreamUnreachable { .. } => {
            error!(error = %e, "Upstream store unreachable");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: "upstream_unreachable".to_string(),
                    message: e.to_string(),
                }),
            )
        }
        other => {
            error!(error = %other, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal_error".to_string(),
                    message: "Internal processing error".to_string(),
                }),
            )
        }
    }
}

/// POST /events/put — Append an item to the user's recent history.
#[utoipa::path(
    post,
    path = "/events/put",
    tag = "Events",
    params(EventPutParams),
    responses(
        (status = 200, description = "Event recorded", body = PutResponse),
        (status = 502, description = "Event store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_event_put(
    State(state): State<AppState>,
    Query(params): Query<EventPutParams>,
) -> ApiResult<PutResponse> {
    state
        .composer
        .record_event(params.user_id, params.item_id)
        .await
        .map_err(store_error)?;
    Ok(Json(PutResponse {
        result: "OK".to_string(),
    }))
}

/// POST /events/get — Most recent items for a user, newest first.
#[utoipa::path(
    post,
    path = "/events/get",
    tag = "Events",
    params(UserParams),
    responses(
        (status = 200, description = "Recent events", body = EventsResponse),
        (status = 502, description = "Event store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_event_get(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<EventsResponse> {
    let k = bounded(params.k, state.defaults.default_events_k)?;
    let events = state
        .composer
        .recent_events(params.user_id, k)
        .await
        .map_err(store_error)?;
    Ok(Json(EventsResponse { events }))
}

/// POST /similar_items — Items similar to `item_id` with their scores.
#[utoipa::path(
    post,
    path = "/similar_items",
    tag = "Similarity",
    params(SimilarParams),
    responses(
        (status = 200, description = "Index-aligned ids and scores", body = recs_core::SimilarItems),
        (status = 502, description = "Similarity store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_similar_items(
    State(state): State<AppState>,
    Query(params): Query<SimilarParams>,
) -> ApiResult<recs_core::SimilarItems> {
    let k = bounded(params.k, state.defaults.default_similar_k)?;
    let items = state
        .composer
        .similar_items(params.item_id, k)
        .await
        .map_err(store_error)?;
    Ok(Json(items))
}

/// POST /offline/get_recs — Raw offline store lookup.
#[utoipa::path(
    post,
    path = "/offline/get_recs",
    tag = "Offline",
    params(UserParams),
    responses(
        (status = 200, description = "Offline item ids", body = [i64]),
        (status = 502, description = "Offline store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_offline_get_recs(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<Vec<ItemId>> {
    let k = bounded(params.k, state.defaults.default_k_offline)?;
    let recs = state
        .composer
        .offline(params.user_id, k)
        .await
        .map_err(store_error)?;
    Ok(Json(recs))
}

/// GET /stats — Offline store request counters.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "Offline",
    responses(
        (status = 200, description = "Request counters", body = StatsResponse),
        (status = 502, description = "Offline store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let stats = state
        .composer
        .offline_stats()
        .await
        .map_err(store_error)?;
    Ok(Json(StatsResponse {
        personal_hits: stats.personal_hits,
        default_hits: stats.default_hits,
        request_personal_count: stats.personal_hits,
        request_default_count: stats.default_hits,
    }))
}

/// POST /recommendations_offline — Personal ranking or popularity fallback.
#[utoipa::path(
    post,
    path = "/recommendations_offline",
    tag = "Recommendations",
    params(UserParams),
    responses(
        (status = 200, description = "Offline recommendations", body = RecsResponse),
        (status = 502, description = "Upstream store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_recommendations_offline(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<RecsResponse> {
    let k = bounded(params.k, state.defaults.default_k_offline)?;
    let recs = state
        .composer
        .offline(params.user_id, k)
        .await
        .map_err(store_error)?;
    Ok(Json(RecsResponse { recs }))
}

/// POST /recommendations_online — Recommendations from recent events.
#[utoipa::path(
    post,
    path = "/recommendations_online",
    tag = "Recommendations",
    params(OnlineParams),
    responses(
        (status = 200, description = "Online recommendations", body = RecsResponse),
        (status = 502, description = "Upstream store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_recommendations_online(
    State(state): State<AppState>,
    Query(params): Query<OnlineParams>,
) -> ApiResult<RecsResponse> {
    let k = bounded(params.k, state.defaults.default_k_online)?;
    let num_events = bounded(params.num_events, state.defaults.default_num_events)?;
    let recs = state
        .composer
        .online(params.user_id, k, num_events)
        .await
        .map_err(store_error)?;
    Ok(Json(RecsResponse { recs }))
}

/// POST /recommendations — Blended online and offline recommendations.
#[utoipa::path(
    post,
    path = "/recommendations",
    tag = "Recommendations",
    params(UserParams),
    responses(
        (status = 200, description = "Blended recommendations", body = RecsResponse),
        (status = 502, description = "Upstream store unreachable", body = ErrorResponse),
    )
)]
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> ApiResult<RecsResponse> {
    let k = bounded(params.k, state.defaults.default_k_blended)?;
    let recs = state
        .composer
        .blended(params.user_id, k)
        .await
        .map_err(store_error)?;
    Ok(Json(RecsResponse { recs }))
}

/// GET /healthy — Aggregate reachability of the three stores.
#[utoipa::path(
    get,
    path = "/healthy",
    tag = "Operations",
    responses(
        (status = 200, description = "All stores reachable", body = HealthReport),
        (status = 503, description = "At least one store unreachable", body = HealthReport),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = state.composer.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// GET /live — Liveness probe.
#[utoipa::path(
    get,
    path = "/live",
    tag = "Operations",
    responses((status = 200, description = "Process is alive", body = LivenessResponse))
)]
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct PutResponse {
    pub result: String,
}

#[derive(Serialize, ToSchema)]
pub struct EventsResponse {
    #[schema(value_type = Vec<i64>)]
    pub events: Vec<ItemId>,
}

#[derive(Serialize, ToSchema)]
pub struct RecsResponse {
    #[schema(value_type = Vec<i64>)]
    pub recs: Vec<ItemId>,
}

/// Counters under both the current and the legacy key names.
#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    pub personal_hits: u64,
    pub default_hits: u64,
    pub request_personal_count: u64,
    pub request_default_count: u64,
}

#[derive(Serialize, ToSchema)]
pub struct LivenessResponse {
    pub node_id: String,
    pub uptime_secs: u64,
}
