//! Mapping of transport failures and error bodies onto [`ApiError`].

use policyhub_model::ApiError;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Error body as servers send it; every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorFields>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorFields {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Map<String, Value>>,
}

/// Converts a reqwest failure into the normalized taxonomy.
pub(crate) fn from_transport(err: &reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::timeout()
    } else if err.is_decode() {
        ApiError::new(500, "UNKNOWN_ERROR", format!("invalid response body: {err}"))
    } else {
        ApiError::network(err.to_string())
    }
}

/// Builds the error for a non-2xx response from its status and raw body.
///
/// A structured `{"error": {...}}` body supplies code, message and details;
/// missing parts fall back to `HTTP_ERROR` and `HTTP <status>: <reason>`.
pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> ApiError {
    let fields = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_default();
    let fallback = ApiError::http(status.as_u16(), status.canonical_reason().unwrap_or("Unknown"));

    let code = fields
        .code
        .filter(|c| !c.is_empty())
        .map_or(fallback.code, Into::into);
    let message = fields
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback.message);

    let mut err = ApiError::new(status.as_u16(), code, message);
    err.details = fields.details;
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_body_is_used_verbatim() {
        let body = br#"{"error":{"code":"POLICY_NOT_FOUND","message":"not found","details":{"name":"foo"}}}"#;
        let err = from_status(StatusCode::NOT_FOUND, body);
        assert_eq!(err.status, 404);
        assert_eq!(err.code, "POLICY_NOT_FOUND");
        assert_eq!(err.message, "not found");
        assert!(err.details.is_some());
    }

    #[test]
    fn test_unparseable_body_falls_back() {
        let err = from_status(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        assert_eq!(err.code, "HTTP_ERROR");
        assert_eq!(err.message, "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_partial_body_mixes_fallbacks() {
        let err = from_status(StatusCode::BAD_REQUEST, br#"{"error":{"code":"VALIDATION_ERROR"}}"#);
        assert_eq!(err.code, "VALIDATION_ERROR");
        assert_eq!(err.message, "HTTP 400: Bad Request");
    }
}
