pub mod language;
pub mod transcription;
pub mod translation;
