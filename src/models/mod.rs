pub mod requests;
pub mod responses;
pub mod upstream;

/// Handler-provided details picked up by the access log middleware.
#[derive(Clone)]
pub struct AccessLogMeta {
    pub model: String,
    pub error: Option<String>,
}
