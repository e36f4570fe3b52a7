use serde::{Deserialize, Serialize};

/// Body of `POST /transcribe`.
///
/// Fields are optional so a missing field becomes a 400 naming it instead of a parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeRequest {
    pub audio_base64: Option<String>,
    /// Overrides the audio MIME type sent upstream.
    pub content_type: Option<String>,
}

impl TranscribeRequest {
    /// Returns the audio payload, or the error message when it is absent.
    pub fn audio(&self) -> Result<&str, String> {
        match self.audio_base64.as_deref().map(str::trim) {
            Some(audio) if !audio.is_empty() => Ok(audio),
            _ => Err("Missing audioBase64".to_string()),
        }
    }
}

/// Body of `POST /translate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub source_language: Option<String>,
    pub target_language: Option<String>,
}

/// A translate request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub text: String,
    pub source_language: String,
    pub target_language: String,
}

impl TranslateRequest {
    /// Checks the required fields, naming every missing one in the error.
    pub fn validate(self) -> Result<TranslationJob, String> {
        fn present(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let text = present(self.text);
        let source_language = present(self.source_language);
        let target_language = present(self.target_language);

        match (text, source_language, target_language) {
            (Some(text), Some(source_language), Some(target_language)) => Ok(TranslationJob {
                text,
                source_language,
                target_language,
            }),
            (text, source, target) => {
                let missing: Vec<&str> = [
                    ("text", text.is_none()),
                    ("sourceLanguage", source.is_none()),
                    ("targetLanguage", target.is_none()),
                ]
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| *name)
                .collect();
                Err(format!("Missing required fields: {}", missing.join(", ")))
            }
        }
    }
}
