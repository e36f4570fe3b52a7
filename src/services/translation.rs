use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::app_error::{AppError, Operation};
use crate::client::inference::{InferenceClient, InferenceError};
use crate::config::types::{TranslationConfig, TranslationModel};
use crate::metrics::prometheus::{observe_upstream, TRANSLATION_FALLBACKS};
use crate::models::requests::TranslationJob;
use crate::models::upstream::UpstreamOutput;
use crate::services::language::normalize_language;

const M2M100_MODEL: &str = "facebook/m2m100_418M";

impl TranslationModel {
    /// Upstream model identifier for a normalized language pair.
    pub fn model_id(&self, source_code: &str, target_code: &str) -> String {
        match self {
            TranslationModel::OpusMt => {
                format!("Helsinki-NLP/opus-mt-{}-{}", source_code, target_code)
            }
            TranslationModel::M2m100 => M2M100_MODEL.to_string(),
        }
    }

    pub fn payload(&self, text: &str, source_code: &str, target_code: &str) -> Value {
        match self {
            // The pair is part of the model id
            TranslationModel::OpusMt => json!({ "inputs": text }),
            TranslationModel::M2m100 => json!({
                "inputs": text,
                "parameters": { "src_lang": source_code, "tgt_lang": target_code },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub translated_text: String,
    /// Model that actually served the request.
    pub model: String,
}

/// Translates `job`, retrying once on the fallback model when the primary
/// model or language pair does not exist upstream.
///
/// The primary call gets the normalized codes; the fallback gets the tags as
/// the caller sent them. Calls are strictly sequential.
pub async fn translate(
    client: &InferenceClient,
    config: &TranslationConfig,
    job: &TranslationJob,
) -> Result<TranslationOutcome, AppError> {
    let source_code = normalize_language(&job.source_language);
    let target_code = normalize_language(&job.target_language);
    let timeout = Duration::from_secs(config.timeout_secs);

    let primary_model = config.primary.model_id(&source_code, &target_code);
    let payload = config.primary.payload(&job.text, &source_code, &target_code);

    let primary_error = match call_model(client, &primary_model, &payload, timeout).await {
        Ok(value) => {
            return Ok(TranslationOutcome {
                translated_text: text_or_input(value, &job.text),
                model: primary_model,
            })
        }
        Err(e) => e,
    };

    error!(
        "Translation error: model={}, status={:?}, message={}",
        primary_model,
        primary_error.status(),
        primary_error.message()
    );

    if !primary_error.is_not_found() {
        return Err(AppError::UpstreamUnavailable {
            operation: Operation::Translation,
            source: primary_error,
        });
    }

    let Some(fallback_model) = config.fallback_model.as_deref() else {
        warn!(
            "No fallback model configured for {} -> {}",
            job.source_language, job.target_language
        );
        return Err(unsupported_pair(job));
    };

    info!(
        "Model {} not found, falling back to {}",
        primary_model, fallback_model
    );
    TRANSLATION_FALLBACKS.inc();

    let payload = json!({
        "inputs": job.text,
        "parameters": {
            "src_lang": job.source_language,
            "tgt_lang": job.target_language,
        },
    });

    match call_model(client, fallback_model, &payload, timeout).await {
        Ok(value) => Ok(TranslationOutcome {
            translated_text: text_or_input(value, &job.text),
            model: fallback_model.to_string(),
        }),
        Err(e) => {
            error!(
                "Fallback translation error: model={}, status={:?}, message={}",
                fallback_model,
                e.status(),
                e.message()
            );
            Err(unsupported_pair(job))
        }
    }
}

async fn call_model(
    client: &InferenceClient,
    model: &str,
    payload: &Value,
    timeout: Duration,
) -> Result<Value, InferenceError> {
    let start = Instant::now();
    let result = match client.run_json(model, payload, timeout).await {
        // 2xx with an unreadable body carries no text; the input text stands in
        Err(InferenceError::Decode { model, message }) => {
            warn!("Model {} returned a non-JSON body: {}", model, message);
            Ok(Value::Null)
        }
        other => other,
    };
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) if e.is_not_found() => "not_found",
        Err(_) => "error",
    };
    observe_upstream(
        Operation::Translation.as_str(),
        outcome,
        start.elapsed().as_secs_f64(),
    );
    result
}

/// Never returns an empty translation: falls back to the input text.
fn text_or_input(value: Value, input: &str) -> String {
    UpstreamOutput::from_value(value)
        .extract_text()
        .unwrap_or(input)
        .to_string()
}

fn unsupported_pair(job: &TranslationJob) -> AppError {
    AppError::UnsupportedPair {
        source_language: job.source_language.clone(),
        target_language: job.target_language.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::UpstreamConfig;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FALLBACK: &str = "facebook/mbart-large-50-many-to-many-mmt";

    fn test_client(base_url: &str) -> InferenceClient {
        InferenceClient::new(&UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn job(text: &str, source: &str, target: &str) -> TranslationJob {
        TranslationJob {
            text: text.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
        }
    }

    #[test]
    fn test_model_ids() {
        assert_eq!(
            TranslationModel::OpusMt.model_id("en", "es"),
            "Helsinki-NLP/opus-mt-en-es"
        );
        assert_eq!(TranslationModel::M2m100.model_id("en", "es"), M2M100_MODEL);
        assert_eq!(
            TranslationModel::M2m100.payload("Hello", "en", "es"),
            json!({"inputs": "Hello", "parameters": {"src_lang": "en", "tgt_lang": "es"}})
        );
    }

    #[tokio::test]
    async fn primary_success_makes_no_fallback_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-en-es"))
            .and(body_json(json!({"inputs": "Hello"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"translation_text": "Hola"}])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Hello", "eng_Latn", "spa_Latn"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Hola");
        assert_eq!(outcome.model, "Helsinki-NLP/opus-mt-en-es");
    }

    #[tokio::test]
    async fn unmapped_tags_use_prefix() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-xx-en"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"translation_text": "Hi"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Xx", "xx_Yyyy", "eng_Latn"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Hi");
    }

    #[tokio::test]
    async fn missing_text_falls_back_to_input() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Hello", "eng_Latn", "fra_Latn"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Hello");
        assert_eq!(outcome.model, "Helsinki-NLP/opus-mt-en-fr");
    }

    #[tokio::test]
    async fn non_json_success_falls_back_to_input() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-en-es"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Hello", "eng_Latn", "spa_Latn"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Hello");
        assert_eq!(outcome.model, "Helsinki-NLP/opus-mt-en-es");
    }

    #[tokio::test]
    async fn non_json_fallback_success_falls_back_to_input() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-hi-ko"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Namaste", "hin_Deva", "kor_Hang"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Namaste");
        assert_eq!(outcome.model, FALLBACK);
    }

    #[tokio::test]
    async fn not_found_triggers_exactly_one_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-hi-ko"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"error": "Model not found"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .and(body_json(json!({
                "inputs": "Namaste",
                "parameters": {"src_lang": "hin_Deva", "tgt_lang": "kor_Hang"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{"generated_text": "Annyeong"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Namaste", "hin_Deva", "kor_Hang"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.translated_text, "Annyeong");
        assert_eq!(outcome.model, FALLBACK);
    }

    #[tokio::test]
    async fn both_failing_is_unsupported_pair() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-xx-yy"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("?", "xx_Aaaa", "yy_Bbbb"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedPair { .. }));
        assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn other_failure_skips_fallback() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/Helsinki-NLP/opus-mt-en-de"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"error": "Model is loading"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/models/{}", FALLBACK)))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = translate(
            &test_client(&server.uri()),
            &TranslationConfig::default(),
            &job("Hello", "eng_Latn", "deu_Latn"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UpstreamUnavailable { .. }));
        assert_eq!(err.message(), "Model is loading");
    }

    #[tokio::test]
    async fn disabled_fallback_reports_unsupported_pair() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let config = TranslationConfig {
            fallback_model: None,
            ..Default::default()
        };
        let err = translate(
            &test_client(&server.uri()),
            &config,
            &job("Hello", "eng_Latn", "xx_Yyyy"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::UnsupportedPair { .. }));
    }

    #[tokio::test]
    async fn m2m100_sends_codes_as_parameters() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/models/{}", M2M100_MODEL)))
            .and(body_json(json!({
                "inputs": "Hello",
                "parameters": {"src_lang": "en", "tgt_lang": "ja"}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"translation_text": "Konnichiwa"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = TranslationConfig {
            primary: TranslationModel::M2m100,
            ..Default::default()
        };
        let outcome = translate(
            &test_client(&server.uri()),
            &config,
            &job("Hello", "eng_Latn", "jpn_Jpan"),
        )
        .await
        .unwrap();
        assert_eq!(outcome.model, M2M100_MODEL);
        assert_eq!(outcome.translated_text, "Konnichiwa");
    }
}
