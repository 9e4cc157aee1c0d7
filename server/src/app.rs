use axum::Router;
use axum::http::Method;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::routes;
use crate::state::AppState;

pub(crate) fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/search", axum::routing::get(routes::api::search))
        .route(
            "/api/search/last",
            axum::routing::get(routes::api::last_search),
        )
        .route(
            "/api/search/events",
            axum::routing::get(routes::sse::search_events),
        )
        .route("/api/health", axum::routing::get(routes::api::health))
        .route("/api/metrics", axum::routing::get(routes::api::metrics))
        .layer(CompressionLayer::new())
        .layer(
            // Browser popups are the expected consumer; read-only API.
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .with_state(state)
}
