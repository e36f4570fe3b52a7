use crate::client::inference::InferenceError;
use crate::models::AccessLogMeta;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

pub const UNSUPPORTED_PAIR_MESSAGE: &str = "Model not available. Try different language pair.";

/// Which upstream operation a failure belongs to; selects the error label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Transcription,
    Translation,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Transcription => "transcription",
            Operation::Translation => "translation",
        }
    }

    pub fn failure_label(&self) -> &'static str {
        match self {
            Operation::Transcription => "Transcription failed",
            Operation::Translation => "Translation failed",
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    MethodNotAllowed(Method),
    MalformedAudio(String),
    UpstreamUnavailable {
        operation: Operation,
        source: InferenceError,
    },
    UnsupportedPair {
        source_language: String,
        target_language: String,
    },
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::MalformedAudio(_)
            | AppError::UpstreamUnavailable { .. }
            | AppError::UnsupportedPair { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "Invalid request",
            AppError::MethodNotAllowed(_) => "Method not allowed",
            AppError::MalformedAudio(_) => Operation::Transcription.failure_label(),
            AppError::UpstreamUnavailable { operation, .. } => operation.failure_label(),
            AppError::UnsupportedPair { .. } => Operation::Translation.failure_label(),
        }
    }

    /// Human-readable text returned to the caller.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidRequest(msg) => msg.clone(),
            AppError::MethodNotAllowed(method) => {
                format!("Method {} is not allowed on this endpoint", method)
            }
            AppError::MalformedAudio(msg) => format!("Audio payload is not valid base64: {}", msg),
            AppError::UpstreamUnavailable { source, .. } => source.message(),
            AppError::UnsupportedPair { .. } => UNSUPPORTED_PAIR_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::UpstreamUnavailable { operation, source } => {
                write!(f, "{} upstream error: {}", operation.as_str(), source)
            }
            AppError::UnsupportedPair {
                source_language,
                target_language,
            } => write!(
                f,
                "Unsupported language pair {} -> {}",
                source_language, target_language
            ),
            other => write!(f, "{}: {}", other.label(), other.message()),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::UpstreamUnavailable { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();

        let body = Json(json!({
            "error": self.label(),
            "message": message,
        }));

        let mut response = (status, body).into_response();

        // Error details for the access log
        let model = match &self {
            AppError::UpstreamUnavailable { source, .. } => source.model().unwrap_or("-"),
            _ => "-",
        }
        .to_string();
        response.extensions_mut().insert(AccessLogMeta {
            model,
            error: Some(self.to_string()),
        });

        response
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::MalformedAudio(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_request_is_400() {
        let response =
            AppError::InvalidRequest("Missing required fields: text".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Invalid request");
        assert_eq!(body["message"], "Missing required fields: text");
    }

    #[tokio::test]
    async fn test_method_not_allowed_is_405() {
        let response = AppError::MethodNotAllowed(Method::GET).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_upstream_failure_carries_upstream_message() {
        let err = AppError::UpstreamUnavailable {
            operation: Operation::Transcription,
            source: InferenceError::Status {
                model: "openai/whisper-large-v3".to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "Model is currently loading".to_string(),
            },
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let meta = response.extensions().get::<AccessLogMeta>().cloned().unwrap();
        assert_eq!(meta.model, "openai/whisper-large-v3");
        let body = body_json(response).await;
        assert_eq!(body["error"], "Transcription failed");
        assert_eq!(body["message"], "Model is currently loading");
    }

    #[tokio::test]
    async fn test_unsupported_pair() {
        let err = AppError::UnsupportedPair {
            source_language: "xx_Yyyy".to_string(),
            target_language: "eng_Latn".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported language pair xx_Yyyy -> eng_Latn"
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Translation failed");
        assert_eq!(body["message"], UNSUPPORTED_PAIR_MESSAGE);
    }

    #[test]
    fn test_base64_error_conversion() {
        let err: AppError = base64::DecodeError::InvalidByte(0, b'!').into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.label(), "Transcription failed");
    }
}
