//! API server: HTTP REST endpoints plus the Prometheus metrics listener.

use crate::rest::{self, AppState};
use crate::swagger::ApiDoc;
use axum::routing::{get, post};
use axum::{Json, Router};
use recs_core::config::AppConfig;
use recs_personalization::Composer;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;

pub struct ApiServer {
    config: AppConfig,
    composer: Arc<Composer>,
}

impl ApiServer {
    pub fn new(config: AppConfig, composer: Arc<Composer>) -> Self {
        Self { config, composer }
    }

    pub fn router(&self) -> Router {
        build_router(AppState {
            composer: self.composer.clone(),
            defaults: self.config.composer.clone(),
            node_id: self.config.node_id.clone(),
            start_time: Instant::now(),
        })
    }

    /// Serve HTTP until `shutdown` resolves.
    pub async fn start_http<F>(&self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = SocketAddr::new(self.config.api.host.parse()?, self.config.api.http_port);

        info!(addr = %addr, "Starting HTTP server");

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }

    /// Install the Prometheus recorder and its scrape listener.
    pub fn start_metrics(&self) -> anyhow::Result<()> {
        if !self.config.metrics.enabled {
            info!("Metrics exporter disabled");
            return Ok(());
        }

        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::new(
                self.config.api.host.parse()?,
                self.config.metrics.port,
            ))
            .install()?;

        info!(port = self.config.metrics.port, "Metrics exporter started");
        Ok(())
    }
}

/// Routes for every store and composer operation.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Event store
        .route("/events/put", post(rest::handle_event_put))
        .route("/events/get", post(rest::handle_event_get))
        // Similarity store
        .route("/similar_items", post(rest::handle_similar_items))
        // Offline store
        .route("/offline/get_recs", post(rest::handle_offline_get_recs))
        .route("/stats", get(rest::handle_stats))
        // Composer
        .route(
            "/recommendations_offline",
            post(rest::handle_recommendations_offline),
        )
        .route(
            "/recommendations_online",
            post(rest::handle_recommendations_online),
        )
        .route("/recommendations", post(rest::handle_recommendations))
        // Operational endpoints
        .route("/healthy", get(rest::health_check))
        .route("/live", get(rest::liveness))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
