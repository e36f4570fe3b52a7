use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_API_KEY_ENV: &str = "HUGGINGFACE_API_KEY";
const DEFAULT_SPEECH_MODEL: &str = "openai/whisper-large-v3";
const DEFAULT_FALLBACK_MODEL: &str = "facebook/mbart-large-50-many-to-many-mmt";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub upstream: UpstreamConfig,
    pub transcription: TranscriptionConfig,
    pub translation: TranslationConfig,
}

/// Where the inference service lives and how to authenticate against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_env: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Bearer credential for the upstream service.
    ///
    /// Priority:
    /// 1. inline `api_key` from the config file
    /// 2. the environment variable named by `api_key_env`
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    pub model: String,
    pub default_content_type: String,
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SPEECH_MODEL.to_string(),
            default_content_type: "audio/wav".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Primary translation model family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationModel {
    /// One `Helsinki-NLP/opus-mt-{src}-{tgt}` model per language pair.
    #[default]
    OpusMt,
    /// A single many-to-many model taking the codes as parameters.
    M2m100,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub primary: TranslationModel,
    pub fallback_model: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            primary: TranslationModel::default(),
            fallback_model: Some(DEFAULT_FALLBACK_MODEL.to_string()),
            timeout_secs: 30,
        }
    }
}
