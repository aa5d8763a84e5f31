//! Request body decoding shared by both transports.
//!
//! Only `application/json` (and `+json` media types) is decoded. Any other
//! content type, or an empty body, counts as no body at all.

use http::{header::CONTENT_TYPE, HeaderMap};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// Decodes a buffered request body. Malformed JSON, or a top-level value
/// that is neither an object nor an array, is a client error.
pub fn parse_json_body(headers: &HeaderMap, bytes: &[u8]) -> ApiResult<Option<Value>> {
    if !is_json_content_type(headers) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?;

    match value {
        Value::Object(_) | Value::Array(_) => Ok(Some(value)),
        _ => Err(ApiError::BadRequest(
            "Invalid JSON body: expected an object or array".to_string(),
        )),
    }
}
