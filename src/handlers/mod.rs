pub mod health_handler;
pub mod transcribe_handler;
pub mod translate_handler;
pub mod utils;
