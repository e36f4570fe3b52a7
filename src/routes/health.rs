use axum::{http::Method, response::Response};

use crate::handlers::health_handler;

/// Health check endpoint
pub async fn health_check(method: Method) -> Response {
    health_handler::health_check(method).await
}

pub async fn list_languages(method: Method) -> Response {
    health_handler::list_languages(method).await
}
