use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use std::net::SocketAddr;

use crate::app_error::AppError;

const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
const HEADER_X_REAL_IP: &str = "x-real-ip";

/// Client IP for logging.
///
/// Order:
/// 1. `X-Forwarded-For`, first entry
/// 2. `X-Real-IP`
/// 3. the TCP peer address
pub fn get_client_ip(headers: &HeaderMap, addr: Option<SocketAddr>) -> String {
    if let Some(xff) = headers.get(HEADER_X_FORWARDED_FOR) {
        if let Ok(xff_str) = xff.to_str() {
            let raw_ip = xff_str.split(',').next().unwrap_or(xff_str).trim();
            return clean_ip(raw_ip);
        }
    }

    if let Some(xri) = headers.get(HEADER_X_REAL_IP) {
        if let Ok(xri_str) = xri.to_str() {
            return clean_ip(xri_str.trim());
        }
    }

    if let Some(addr) = addr {
        return clean_ip(&addr.ip().to_string());
    }

    "unknown".to_string()
}

// Strips the IPv4-mapped IPv6 prefix
fn clean_ip(ip: &str) -> String {
    if let Some(ipv4) = ip.strip_prefix("::ffff:") {
        ipv4.to_string()
    } else {
        ip.to_string()
    }
}

/// Short-circuits requests a handler should not process.
///
/// OPTIONS is a CORS preflight and gets an empty 200; any method other than
/// `allowed` gets a 405. `None` means the handler should carry on.
pub fn early_response(method: &Method, allowed: Option<&Method>) -> Option<Response> {
    if *method == Method::OPTIONS {
        return Some(StatusCode::OK.into_response());
    }
    match allowed {
        Some(allowed) if method != allowed => {
            Some(AppError::MethodNotAllowed(method.clone()).into_response())
        }
        _ => None,
    }
}

/// Parses a JSON request body with simd-json.
///
/// An empty body reads as `{}` so missing fields surface as validation errors.
pub fn parse_json_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    // simd-json parses in place and needs a mutable buffer
    let mut buf = if body.iter().all(|b| b.is_ascii_whitespace()) {
        b"{}".to_vec()
    } else {
        body.to_vec()
    };

    simd_json::from_slice::<T>(&mut buf).map_err(|e| {
        AppError::InvalidRequest(format!("Request body is not valid JSON: {}", e))
    })
}
