//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `ApiError` used throughout the crate.
//! It centralizes error management, providing a consistent way to represent the
//! failure modes a client call can hit: transport-level failures, authorization
//! failures, rejected input, and server-side faults.
//!
//! Every failing response is normalized into a single user-facing message by
//! extracting the `detail` field of the server's JSON error payload, falling
//! back to a generic message when the payload carries none. A `From` impl for
//! `reqwest::Error` allows transport failures to be converted with the `?`
//! operator.

use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

/// Fallback message used when a failing response carries no `detail` payload.
pub const GENERIC_FAILURE: &str = "request failed";

/// Represents all possible errors a client operation can produce.
///
/// Each variant carries the normalized, user-facing message for the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport-level failure: the request never produced a usable response
    /// (connection refused, DNS failure, malformed body, ...).
    Network(String),
    /// The server rejected the credential (HTTP 401). Raising this error is
    /// always preceded by a forced de-authentication of the session.
    Auth(String),
    /// The server rejected the request content (other 4xx).
    Validation(String),
    /// The server failed while handling the request (5xx).
    Server(String),
}

impl ApiError {
    /// The normalized message carried by this error, suitable for direct
    /// display to a user.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Network(msg)
            | ApiError::Auth(msg)
            | ApiError::Validation(msg)
            | ApiError::Server(msg) => msg,
        }
    }

    /// Classifies a non-success response into an error variant, pulling the
    /// normalized message out of the response body.
    pub fn from_status(status: StatusCode, body: Option<&Value>) -> ApiError {
        let detail = extract_detail(body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Auth(detail)
        } else if status.is_server_error() {
            ApiError::Server(detail)
        } else {
            ApiError::Validation(detail)
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "Network Failure: {}", msg),
            ApiError::Auth(msg) => write!(f, "Authorization Failure: {}", msg),
            ApiError::Validation(msg) => write!(f, "Validation Failure: {}", msg),
            ApiError::Server(msg) => write!(f, "Server Failure: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Converts `reqwest::Error` into `ApiError::Network`.
///
/// Covers connection errors as well as body-decoding errors, both of which
/// mean the caller never saw a usable response.
impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> ApiError {
        ApiError::Network(error.to_string())
    }
}

/// Extracts the `detail` field from a server error payload.
///
/// String details are used verbatim. Structured details (e.g. a validation
/// error list) are serialized so no information is dropped. Anything else
/// falls back to [`GENERIC_FAILURE`].
pub fn extract_detail(body: Option<&Value>) -> String {
    match body.and_then(|v| v.get("detail")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => GENERIC_FAILURE.to_string(),
        Some(other) => other.to_string(),
    }
}
