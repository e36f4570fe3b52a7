use crate::{
    metrics::{exporter::create_metrics_router, middleware::metrics_middleware},
    middleware::{access_log::access_log_middleware, cors::with_cors_headers},
    state::app_state::AppState,
};
use axum::{middleware as axum_middleware, routing::any, Router};
use std::sync::Arc;

pub mod health;
pub mod transcribe;
pub mod translate;

/// Path prefix of the serverless deployment; kept so existing frontends work unchanged.
pub const FUNCTIONS_PREFIX: &str = "/.netlify/functions";

// Handlers take any method and answer OPTIONS/405 themselves, so every
// rejection carries a JSON body.
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", any(health::health_check))
        .route("/transcribe", any(transcribe::handle_transcription))
        .route("/translate", any(translate::handle_translation))
        .route("/languages", any(health::list_languages))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(health::health_check))
        .merge(api_routes())
        .nest(FUNCTIONS_PREFIX, api_routes())
        .merge(create_metrics_router())
        .with_state(app_state)
}

/// Router plus the middleware stack; CORS headers outermost.
pub fn create_app(app_state: Arc<AppState>) -> Router {
    let router = create_router(app_state)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(axum_middleware::from_fn(access_log_middleware));
    with_cors_headers(router)
}
