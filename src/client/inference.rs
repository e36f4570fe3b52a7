use crate::config::types::UpstreamConfig;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Failure of a single call to the inference service.
#[derive(Debug)]
pub enum InferenceError {
    /// The model (or the model/language-pair combination) does not exist upstream.
    NotFound { model: String, message: String },
    Status {
        model: String,
        status: StatusCode,
        message: String,
    },
    Transport(reqwest::Error),
    Decode { model: String, message: String },
}

impl InferenceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, InferenceError::NotFound { .. })
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            InferenceError::NotFound { model, .. }
            | InferenceError::Status { model, .. }
            | InferenceError::Decode { model, .. } => Some(model),
            InferenceError::Transport(_) => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            InferenceError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            InferenceError::Status { status, .. } => Some(*status),
            InferenceError::Transport(err) => err.status(),
            InferenceError::Decode { .. } => None,
        }
    }

    /// Upstream message without the model prefix, suitable for callers.
    pub fn message(&self) -> String {
        match self {
            InferenceError::NotFound { message, .. }
            | InferenceError::Status { message, .. }
            | InferenceError::Decode { message, .. } => message.clone(),
            InferenceError::Transport(err) if err.is_timeout() => {
                format!("Request to upstream timed out: {}", err)
            }
            InferenceError::Transport(err) if err.is_connect() => {
                format!("Failed to connect to upstream: {}", err)
            }
            InferenceError::Transport(err) => err.to_string(),
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InferenceError::NotFound { model, message } => {
                write!(f, "Model `{}` not found upstream: {}", model, message)
            }
            InferenceError::Status {
                model,
                status,
                message,
            } => write!(f, "Model `{}` returned {}: {}", model, status, message),
            InferenceError::Transport(err) => write!(f, "External request failed: {}", err),
            InferenceError::Decode { model, message } => {
                write!(f, "Model `{}` returned an unreadable body: {}", model, message)
            }
        }
    }
}

impl std::error::Error for InferenceError {}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        InferenceError::Transport(err)
    }
}

/// Client for the hosted inference API (`POST {base_url}/models/{model}`).
///
/// Built per request from a config snapshot; nothing is shared between requests.
pub struct InferenceClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl InferenceClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, InferenceError> {
        let http = Client::builder().build()?;
        Ok(InferenceClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolve_api_key(),
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    /// Sends raw audio bytes to a speech-recognition model.
    pub async fn run_audio(
        &self,
        model: &str,
        audio: Vec<u8>,
        content_type: &str,
        timeout: Duration,
    ) -> Result<Value, InferenceError> {
        debug!(
            "Inference audio request: model={}, {} bytes, content_type={}",
            model,
            audio.len(),
            content_type
        );
        let request = self
            .request(model, timeout)
            .header(header::CONTENT_TYPE, content_type)
            .body(audio);
        self.send(model, request).await
    }

    /// Sends a JSON payload to a text model.
    pub async fn run_json(
        &self,
        model: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<Value, InferenceError> {
        debug!("Inference JSON request: model={}", model);
        let request = self.request(model, timeout).json(payload);
        self.send(model, request).await
    }

    fn request(&self, model: &str, timeout: Duration) -> RequestBuilder {
        let builder = self.http.post(self.model_url(model)).timeout(timeout);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn send(&self, model: &str, request: RequestBuilder) -> Result<Value, InferenceError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(InferenceError::NotFound {
                model: model.to_string(),
                message: upstream_message(status, &body),
            });
        }
        if !status.is_success() {
            return Err(InferenceError::Status {
                model: model.to_string(),
                status,
                message: upstream_message(status, &body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| InferenceError::Decode {
            model: model.to_string(),
            message: e.to_string(),
        })
    }
}

/// Picks the most useful message out of an upstream error body.
///
/// Order: the `error` field of a JSON body, the raw body text, the status reason.
fn upstream_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        match value.get("error") {
            Some(Value::String(message)) if !message.is_empty() => return message.clone(),
            Some(Value::Array(messages)) if !messages.is_empty() => {
                return messages
                    .iter()
                    .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                    .collect::<Vec<_>>()
                    .join("; ");
            }
            _ => {}
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}
