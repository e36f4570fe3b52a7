use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

use crate::handlers::utils::early_response;
use crate::state::app_state::AppState;

pub fn create_metrics_router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", any(metrics_endpoint))
}

async fn metrics_endpoint(method: Method) -> Response {
    if let Some(response) = early_response(&method, Some(&Method::GET)) {
        return response;
    }

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            output,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Metrics unavailable", "message": e.to_string()})),
        )
            .into_response(),
    }
}
