use axum::{body::Bytes, extract::State, http::Method, response::Response};
use std::sync::Arc;
use tracing::info;

use crate::{handlers::transcribe_handler, state::app_state::AppState};

pub async fn handle_transcription(
    state: State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    info!("Handling transcription request ({}, {} bytes)", method, body.len());
    transcribe_handler::handle_transcription(state, method, body).await
}
