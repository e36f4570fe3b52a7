use axum::{
    http::Method,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    handlers::utils::early_response,
    models::responses::{
        timestamp_now, HealthResponse, LanguageEntry, LanguagesResponse,
    },
    services::language::LANGUAGE_CODES,
};

pub const HEALTH_MESSAGE: &str = "OneWhat API - speech recognition and translation gateway";

/// Static status payload; answers every method.
pub async fn health_check(method: Method) -> Response {
    if let Some(response) = early_response(&method, None) {
        return response;
    }

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        message: HEALTH_MESSAGE.to_string(),
        timestamp: timestamp_now(),
    })
    .into_response()
}

/// Language tags with a fixed code mapping. Other tags are still accepted.
pub async fn list_languages(method: Method) -> Response {
    if let Some(response) = early_response(&method, Some(&Method::GET)) {
        return response;
    }

    let supported_languages: Vec<LanguageEntry> = LANGUAGE_CODES
        .iter()
        .map(|&(tag, code)| LanguageEntry { tag, code })
        .collect();

    Json(LanguagesResponse {
        total: supported_languages.len(),
        supported_languages,
    })
    .into_response()
}
