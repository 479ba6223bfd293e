//! OpenAPI specification for the recommendation service.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recs Express API",
        version = "0.1.0",
        description = "Online, offline, and blended recommendations composed from an event store, an item-similarity table, and precomputed rankings.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Events", description = "Recent user activity"),
        (name = "Similarity", description = "Item-to-item similarity lookups"),
        (name = "Offline", description = "Personal and popularity rankings, request stats"),
        (name = "Recommendations", description = "Offline, online, and blended recommendation lists"),
        (name = "Operations", description = "Health and liveness probes"),
    ),
    paths(
        crate::rest::handle_event_put,
        crate::rest::handle_event_get,
        crate::rest::handle_similar_items,
        crate::rest::handle_offline_get_recs,
        crate::rest::handle_stats,
        crate::rest::handle_recommendations_offline,
        crate::rest::handle_recommendations_online,
        crate::rest::handle_recommendations,
        crate::rest::health_check,
        crate::rest::liveness,
    ),
    components(schemas(
        recs_core::SimilarItems,
        recs_core::RequestStats,
        recs_core::types::StoreKind,
        recs_core::types::ComponentHealth,
        recs_core::types::OverallHealth,
        recs_core::types::ProbeResult,
        recs_core::types::HealthReport,
        crate::rest::ErrorResponse,
        crate::rest::PutResponse,
        crate::rest::EventsResponse,
        crate::rest::RecsResponse,
        crate::rest::StatsResponse,
        crate::rest::LivenessResponse,
    ))
)]
pub struct ApiDoc;
