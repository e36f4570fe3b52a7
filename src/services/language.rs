use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Extended language tags and the two-letter codes the translation models expect.
pub const LANGUAGE_CODES: [(&str, &str); 12] = [
    ("eng_Latn", "en"),
    ("spa_Latn", "es"),
    ("fra_Latn", "fr"),
    ("deu_Latn", "de"),
    ("ita_Latn", "it"),
    ("por_Latn", "pt"),
    ("rus_Cyrl", "ru"),
    ("zho_Hans", "zh"),
    ("jpn_Jpan", "ja"),
    ("kor_Hang", "ko"),
    ("ara_Arab", "ar"),
    ("hin_Deva", "hi"),
];

static LANGUAGE_CODE_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| LANGUAGE_CODES.iter().copied().collect());

/// Maps a language tag to the code sent upstream.
///
/// Known tags go through the fixed map; anything else keeps its first two
/// characters (`xx_Yyyy` -> `xx`, `en` -> `en`).
pub fn normalize_language(tag: &str) -> String {
    if let Some(code) = LANGUAGE_CODE_MAP.get(tag) {
        return (*code).to_string();
    }
    tag.chars().take(2).collect()
}
