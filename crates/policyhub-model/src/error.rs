//! Normalized API error type.
//!
//! Every failure surfaced to the state layer, whether it came from the
//! transport, a timeout, an HTTP status, or a structured server body, is
//! collapsed into one [`ApiError`] shape: `{status, code, message, details?}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Machine-readable error code.
///
/// The client-side codes are fixed; anything else a server declares is kept
/// verbatim in [`ErrorCode::Server`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    /// Transport failure (DNS, connection refused, offline).
    Network,
    /// The request exceeded the configured timeout.
    Timeout,
    /// Non-2xx response without a parseable structured error body.
    Http,
    /// Fallback for errors matching none of the other shapes.
    Unknown,
    /// Code taken verbatim from a structured server error body.
    Server(String),
}

impl ErrorCode {
    /// Wire representation of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Http => "HTTP_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
            Self::Server(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        match code.as_str() {
            "NETWORK_ERROR" => Self::Network,
            "TIMEOUT" => Self::Timeout,
            "HTTP_ERROR" => Self::Http,
            "UNKNOWN_ERROR" => Self::Unknown,
            _ => Self::Server(code),
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for ErrorCode {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Structured error object as it appears inside a response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Server-declared error code (e.g. `POLICY_NOT_FOUND`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

/// Normalized error returned by every API call.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// HTTP status, `0` for transport failures, `408` for timeouts.
    pub status: u16,
    /// Machine-readable code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Optional structured details from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Map<String, Value>>,
}

impl ApiError {
    /// Creates an error from its parts.
    pub fn new(status: u16, code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Transport-level failure.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(0, ErrorCode::Network, message)
    }

    /// Request timed out.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(408, ErrorCode::Timeout, "Request timed out")
    }

    /// Non-2xx response without a structured body.
    pub fn http(status: u16, reason: &str) -> Self {
        Self::new(status, ErrorCode::Http, format!("HTTP {status}: {reason}"))
    }

    /// Error value that matched none of the known shapes.
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(500, ErrorCode::Unknown, "An unexpected error occurred")
    }

    /// Builds an error from a structured server error body.
    #[must_use]
    pub fn from_body(status: u16, body: ErrorObject) -> Self {
        Self {
            status,
            code: ErrorCode::from(body.code),
            message: body.message,
            details: body.details,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Whether this error means the requested entity does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status == 404 || self.code.as_str().ends_with("_NOT_FOUND")
    }

    /// Whether a user-initiated retry has a chance of succeeding.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self.code {
            ErrorCode::Network | ErrorCode::Timeout => true,
            _ => self.status >= 500 || self.status == 429,
        }
    }

    /// Returns a short message suitable for a panel or toast.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self.code {
            ErrorCode::Network => "Network error occurred",
            ErrorCode::Timeout => "Request timed out",
            ErrorCode::Unknown => "An unexpected error occurred",
            ErrorCode::Http | ErrorCode::Server(_) => &self.message,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(500, ErrorCode::Unknown, format!("invalid response body: {err}"))
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
