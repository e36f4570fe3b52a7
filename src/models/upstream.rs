use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;

/// One generated item as returned by the inference API.
///
/// Translation models fill `translation_text`, text-generation models
/// `generated_text`, speech recognition `text`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub translation_text: Option<String>,
    #[serde(default)]
    pub generated_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl GeneratedText {
    pub fn text(&self) -> Option<&str> {
        [&self.translation_text, &self.generated_text, &self.text]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|text| !text.is_empty())
    }
}

/// Shapes the inference API answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamOutput {
    ListResult(Vec<GeneratedText>),
    ScalarResult(GeneratedText),
    Empty(IgnoredAny),
}

impl UpstreamOutput {
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(UpstreamOutput::Empty(IgnoredAny))
    }

    /// Text of the first list element, or of the scalar object.
    pub fn extract_text(&self) -> Option<&str> {
        match self {
            UpstreamOutput::ListResult(items) => items.first().and_then(GeneratedText::text),
            UpstreamOutput::ScalarResult(item) => item.text(),
            UpstreamOutput::Empty(_) => None,
        }
    }
}
