use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Service pages
        .route("/", get(handlers::root))
        .route("/about/", get(handlers::about))
        .route("/points/", get(handlers::points))
        .route("/health", get(handlers::health_check))

        // Features
        .route("/api/v1/features", get(handlers::list_features))
        .route("/api/v1/features/{id}", get(handlers::get_feature))
        .route("/api/v1/table", get(handlers::table))

        // Search
        .route("/api/v1/suggestions", get(handlers::suggestions))
        .route("/api/v1/search", post(handlers::search))

        // Background layers
        .route("/api/v1/layers", get(handlers::list_layers))

        .with_state(state)
}

/// CORS for the browser front-end; unparsable origins are skipped
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
