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
        requests::TranscribeRequest,
        responses::{timestamp_now, TranscribeResponse},
        AccessLogMeta,
    },
    services::transcription::{decode_audio, transcribe},
    state::app_state::AppState,
};

pub async fn handle_transcription(
    State(app_state): State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if let Some(response) = early_response(&method, Some(&Method::POST)) {
        return response;
    }

    match transcribe_body(&app_state, &body).await {
        Ok((model, payload)) => {
            let mut response = Json(payload).into_response();
            response.extensions_mut().insert(AccessLogMeta { model, error: None });
            response
        }
        Err(e) => e.into_response(),
    }
}

async fn transcribe_body(
    app_state: &AppState,
    body: &Bytes,
) -> Result<(String, TranscribeResponse), AppError> {
    let request: TranscribeRequest = parse_json_body(body)?;
    let audio = request.audio().map_err(AppError::InvalidRequest)?;

    let config = app_state.config_manager.get_config().await;

    let audio = decode_audio(
        audio,
        request.content_type.as_deref(),
        &config.transcription.default_content_type,
    )
    .map_err(|e| {
        error!("Transcription error: audio payload could not be decoded: {}", e);
        AppError::from(e)
    })?;

    let client = InferenceClient::new(&config.upstream).map_err(|e| {
        error!("Transcription error: failed to build upstream client: {}", e);
        AppError::UpstreamUnavailable {
            operation: Operation::Transcription,
            source: e,
        }
    })?;

    let outcome = transcribe(&client, &config.transcription, audio).await?;

    Ok((
        outcome.model,
        TranscribeResponse {
            text: outcome.text,
            timestamp: timestamp_now(),
        },
    ))
}
