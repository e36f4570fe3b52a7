use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::app_error::{AppError, Operation};
use crate::client::inference::{InferenceClient, InferenceError};
use crate::config::types::TranscriptionConfig;
use crate::metrics::prometheus::observe_upstream;
use crate::models::upstream::UpstreamOutput;

/// Standard alphabet; trailing `=` padding may be present or not, and
/// non-zero bits in the last symbol are ignored.
const AUDIO_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Decodes the `audioBase64` payload.
///
/// Accepts a bare base64 string or a `data:<mime>;base64,<payload>` URL, whose
/// MIME type is used when the caller gave none. ASCII whitespace is ignored.
pub fn decode_audio(
    payload: &str,
    content_type: Option<&str>,
    default_content_type: &str,
) -> Result<DecodedAudio, base64::DecodeError> {
    let (data_url_type, encoded) = split_data_url(payload.trim());

    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = AUDIO_BASE64.decode(compact)?;

    let content_type = content_type
        .filter(|ct| !ct.is_empty())
        .or(data_url_type)
        .unwrap_or(default_content_type)
        .to_string();

    Ok(DecodedAudio {
        bytes,
        content_type,
    })
}

fn split_data_url(payload: &str) -> (Option<&str>, &str) {
    if let Some(rest) = payload.strip_prefix("data:") {
        if let Some((header, data)) = rest.split_once(',') {
            if let Some(mime) = header.strip_suffix(";base64") {
                let mime = (!mime.is_empty()).then_some(mime);
                return (mime, data);
            }
        }
    }
    (None, payload)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionOutcome {
    pub text: String,
    pub model: String,
}

/// Sends the audio to the configured speech-recognition model. No retry, no fallback.
pub async fn transcribe(
    client: &InferenceClient,
    config: &TranscriptionConfig,
    audio: DecodedAudio,
) -> Result<TranscriptionOutcome, AppError> {
    let model = config.model.as_str();
    let start = Instant::now();

    let result = client
        .run_audio(
            model,
            audio.bytes,
            &audio.content_type,
            Duration::from_secs(config.timeout_secs),
        )
        .await;
    let elapsed = start.elapsed().as_secs_f64();

    let value = match result {
        Ok(value) => value,
        Err(e) => {
            observe_upstream(Operation::Transcription.as_str(), "error", elapsed);
            error!(
                "Transcription error: model={}, status={:?}, message={}",
                model,
                e.status(),
                e.message()
            );
            return Err(AppError::UpstreamUnavailable {
                operation: Operation::Transcription,
                source: e,
            });
        }
    };

    let output = UpstreamOutput::from_value(value);
    let Some(text) = output.extract_text() else {
        observe_upstream(Operation::Transcription.as_str(), "empty", elapsed);
        error!("Transcription error: model={} returned no text", model);
        return Err(AppError::UpstreamUnavailable {
            operation: Operation::Transcription,
            source: InferenceError::Decode {
                model: model.to_string(),
                message: "Upstream response did not contain a transcript".to_string(),
            },
        });
    };

    observe_upstream(Operation::Transcription.as_str(), "success", elapsed);
    info!(
        "Transcription succeeded: model={}, {} chars in {:.3}s",
        model,
        text.len(),
        elapsed
    );

    Ok(TranscriptionOutcome {
        text: text.to_string(),
        model: model.to_string(),
    })
}
