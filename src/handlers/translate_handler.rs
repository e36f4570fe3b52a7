use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::error;

use crate::{
    app_error::{AppError, Operation},
    client::inference::InferenceClient,
    handlers::utils::{early_response, parse_json_body},
    models::{
        requests::TranslateRequest,
        responses::{timestamp_now, TranslateResponse},
        AccessLogMeta,
    },
    services::translation::translate,
    state::app_state::AppState,
};

pub async fn handle_translation(
    State(app_state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if let Some(response) = early_response(&method, Some(&Method::POST)) {
        return response;
    }

    match translate_body(&app_state, &body).await {
        Ok(payload) => {
            let model = payload.model.clone();
            let mut response = Json(payload).into_response();
            response.extensions_mut().insert(AccessLogMeta { model, error: None });
            response
        }
        Err(e) => e.into_response(),
    }
}

async fn translate_body(app_state: &AppState, body: &Bytes) -> Result<TranslateResponse, AppError> {
    let request: TranslateRequest = parse_json_body(body)?;
    // Validation happens before anything goes upstream
    let job = request.validate().map_err(AppError::InvalidRequest)?;

    let config = app_state.config_manager.get_config().await;
    let client = InferenceClient::new(&config.upstream).map_err(|e| {
        error!("Translation error: failed to build upstream client: {}", e);
        AppError::UpstreamUnavailable {
            operation: Operation::Translation,
            source: e,
        }
    })?;

    let outcome = translate(&client, &config.translation, &job).await?;

    // Echo the caller's tags, not the normalized codes
    Ok(TranslateResponse {
        translated_text: outcome.translated_text,
        source_language: job.source_language,
        target_language: job.target_language,
        model: outcome.model,
        timestamp: timestamp_now(),
    })
}
