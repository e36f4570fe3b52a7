use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// Current UTC time as RFC 3339 with milliseconds, e.g. `2026-10-19T08:15:30.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscribeResponse {
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub model: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageEntry {
    pub tag: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub supported_languages: Vec<LanguageEntry>,
    pub total: usize,
}
