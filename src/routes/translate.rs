use axum::{body::Bytes, extract::State, http::Method, response::Response};
use std::sync::Arc;
use tracing::info;

use crate::{handlers::translate_handler, state::app_state::AppState};

pub async fn handle_translation(
    state: State<Arc<AppState>>,
    method: Method,
    body: Bytes,
) -> Response {
    info!("Handling translation request ({})", method);
    translate_handler::handle_translation(state, method, body).await
}
