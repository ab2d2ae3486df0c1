//
//  cloud-databases
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Cloud Databases service
//!
//! This module provides the types shared by every operation: the structured
//! error returned by failing calls and the raw response envelope returned
//! alongside typed results.
//!
//! # Overview
//!
//! - [`ApiError`] - Structured error carrying a kind, HTTP status, message,
//!   optional cause, optional decoded server payload and optional envelope
//! - [`ErrorKind`] - The closed taxonomy of failure kinds
//! - [`Envelope`] - Status, headers and raw body of one HTTP exchange
//! - [`DetailedResponse`] - Envelope plus the typed, possibly absent, result
//!
//! # Example
//!
//! ```rust
//! use cloud_databases::api::common::{ApiError, ErrorKind};
//!
//! fn describe(err: &ApiError) -> String {
//!     match err.kind() {
//!         ErrorKind::ServerError => format!("server said {}: {}", err.status(), err.message()),
//!         ErrorKind::Cancelled => "gave up waiting".to_string(),
//!         _ => err.to_string(),
//!     }
//! }
//! ```
//!
//! # Notes
//!
//! - `status()` is `0` whenever no HTTP response was produced
//! - Only `ServerError` and `ResponseProcessing` errors carry an envelope

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::api::context::CancelReason;

mod envelope;

pub use envelope::*;

/// Boxed error used as the wrapped cause of an [`ApiError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Marker carried by the error returned when a call is made without a service URL.
pub const ERRORMSG_SERVICE_URL_MISSING: &str = "service URL missing";

/// The kind of failure an [`ApiError`] represents.
///
/// | Kind | Cause | Retriable |
/// |------|-------|-----------|
/// | `Validation` | Missing required field, bad URL, unknown URL variable | no |
/// | `Configuration` | Empty service URL, unknown region, unknown auth type | no |
/// | `Authentication` | Authenticator failed to stamp credentials | no |
/// | `Cancelled` | Caller scope cancelled or timed out | no |
/// | `Transport` | Network, TLS or DNS failure | yes |
/// | `ServerError` | Non-2xx HTTP status | 429 and 5xx only |
/// | `ResponseProcessing` | 2xx status but the body could not be decoded | no |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Configuration,
    Authentication,
    Cancelled,
    Transport,
    ServerError,
    ResponseProcessing,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validation => "validation",
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::Cancelled => "cancelled",
            Self::Transport => "transport",
            Self::ServerError => "server error",
            Self::ResponseProcessing => "response processing",
        };
        f.write_str(name)
    }
}

/// Structured error returned by every failing operation.
///
/// `ApiError` is the single error type of the SDK. Each value carries exactly
/// one [`ErrorKind`] plus whatever context was available at the point of
/// failure.
///
/// # Partial results
///
/// A `ServerError` keeps the raw [`Envelope`] so callers can inspect the
/// response bytes. A `ResponseProcessing` error keeps it too, so the body that
/// failed to decode is still available for debugging. Every other kind has no
/// envelope.
///
/// # Example
///
/// ```rust
/// use cloud_databases::api::common::{ApiError, ErrorKind};
///
/// let err = ApiError::validation("id must be provided");
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert_eq!(err.status(), 0);
/// assert!(err.response().is_none());
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    status: u16,
    message: String,
    #[source]
    cause: Option<BoxError>,
    payload: Option<Value>,
    response: Option<Box<Envelope>>,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: 0,
            message: message.into(),
            cause: None,
            payload: None,
            response: None,
        }
    }

    /// A required field was missing or a caller-supplied value was malformed.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// The client is not configured well enough to send the request.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// The authenticator could not stamp credentials on the request.
    pub fn authentication(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self {
            cause,
            ..Self::new(ErrorKind::Authentication, message)
        }
    }

    /// The caller's scope fired before the call could complete.
    ///
    /// `last` is the outcome of the previous attempt when the scope fired
    /// during a retry backoff.
    pub fn cancelled(reason: CancelReason, last: Option<ApiError>) -> Self {
        let message = match &last {
            Some(last) => format!("request cancelled: {reason} (last attempt: {last})"),
            None => format!("request cancelled: {reason}"),
        };
        Self {
            cause: last.map(|err| Box::new(err) as BoxError),
            ..Self::new(ErrorKind::Cancelled, message)
        }
    }

    /// A network, TLS or DNS failure prevented the exchange.
    pub fn transport(message: impl Into<String>, cause: Option<BoxError>) -> Self {
        Self {
            cause,
            ..Self::new(ErrorKind::Transport, message)
        }
    }

    /// Builds a `ServerError` from a non-2xx response.
    ///
    /// The body is decoded as JSON when possible and a best-effort message is
    /// extracted from it with [`extract_error_message`]. When the body is not
    /// JSON the raw text is used instead.
    pub fn from_response(response: Envelope) -> Self {
        let payload = serde_json::from_slice::<Value>(&response.body).ok();
        let message = payload
            .as_ref()
            .and_then(extract_error_message)
            .unwrap_or_else(|| {
                let text = response.body_text();
                if text.trim().is_empty() {
                    format!("HTTP {} with empty body", response.status)
                } else {
                    format!("API error ({}): {}", response.status, text.trim())
                }
            });

        Self {
            kind: ErrorKind::ServerError,
            status: response.status,
            message,
            cause: None,
            payload,
            response: Some(Box::new(response)),
        }
    }

    /// A 2xx response whose body could not be decoded into the result type.
    pub fn response_processing(cause: serde_json::Error, response: Envelope) -> Self {
        Self {
            kind: ErrorKind::ResponseProcessing,
            status: response.status,
            message: format!("an error occurred while processing the response: {cause}"),
            cause: Some(Box::new(cause)),
            payload: None,
            response: Some(Box::new(response)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status of the response that produced this error, or `0`.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Decoded JSON body of a `ServerError`, if the server sent one.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// The raw response, kept for `ServerError` and `ResponseProcessing`.
    pub fn response(&self) -> Option<&Envelope> {
        self.response.as_deref()
    }

    pub fn into_response(self) -> Option<Envelope> {
        self.response.map(|response| *response)
    }

    /// Wrapped underlying error, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Returns `true` if the error is a `ServerError` with the given status.
    pub fn is_status(&self, status: u16) -> bool {
        self.kind == ErrorKind::ServerError && self.status == status
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_connect() {
            format!("connection failed: {err}")
        } else if err.is_timeout() {
            format!("request timed out: {err}")
        } else {
            format!("network error: {err}")
        };
        Self::transport(message, Some(Box::new(err)))
    }
}

/// Extracts a user-friendly message from a server error payload.
///
/// The service and the platform in front of it use a few different shapes.
/// They are tried in this order:
///
/// ```json
/// {"errors": [{"message": "Human readable message"}]}
/// {"errors": ["Human readable message"]}
/// {"errors": "Human readable message"}
/// {"message": "Human readable message"}
/// {"error": "Human readable message"}
/// {"error": {"message": "Human readable message"}}
/// {"errorMessage": "Human readable message"}
/// ```
///
/// Returns `None` if none of them match.
pub fn extract_error_message(payload: &Value) -> Option<String> {
    if let Some(errors) = payload.get("errors") {
        let first = match errors {
            Value::Array(items) => items.first().and_then(|item| match item {
                Value::String(message) => Some(message.clone()),
                other => other
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            Value::String(message) => Some(message.clone()),
            Value::Object(_) => errors
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        };
        if first.is_some() {
            return first;
        }
    }

    if let Some(message) = payload.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    match payload.get("error") {
        Some(Value::String(message)) => return Some(message.clone()),
        Some(error) => {
            if let Some(message) = error.get("message").and_then(Value::as_str) {
                return Some(message.to_string());
            }
        }
        None => {}
    }

    payload
        .get("errorMessage")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use reqwest::header::HeaderMap;
    use serde_json::json;

    fn envelope(status: u16, body: &str) -> Envelope {
        Envelope::new(status, HeaderMap::new(), Bytes::from(body.to_string()))
    }

    #[test]
    fn test_extract_errors_array() {
        let payload = json!({"errors": [{"message": "not found"}]});
        assert_eq!(extract_error_message(&payload).as_deref(), Some("not found"));
    }

    #[test]
    fn test_extract_errors_string_forms() {
        assert_eq!(
            extract_error_message(&json!({"errors": "Forbidden"})).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(
            extract_error_message(&json!({"errors": ["first", "second"]})).as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_extract_fallbacks() {
        assert_eq!(
            extract_error_message(&json!({"message": "bad"})).as_deref(),
            Some("bad")
        );
        assert_eq!(
            extract_error_message(&json!({"error": {"message": "nested"}})).as_deref(),
            Some("nested")
        );
        assert_eq!(
            extract_error_message(&json!({"errorMessage": "iam"})).as_deref(),
            Some("iam")
        );
        assert_eq!(extract_error_message(&json!({"other": 1})), None);
    }

    #[test]
    fn test_server_error_keeps_envelope_and_payload() {
        let err = ApiError::from_response(envelope(404, r#"{"errors":[{"message":"not found"}]}"#));
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(err.status(), 404);
        assert_eq!(err.message(), "not found");
        assert!(err.payload().is_some());
        assert_eq!(err.response().map(|r| r.status), Some(404));
        assert!(err.is_status(404));
    }

    #[test]
    fn test_server_error_with_plain_body() {
        let err = ApiError::from_response(envelope(502, "Bad Gateway"));
        assert_eq!(err.message(), "API error (502): Bad Gateway");
        assert!(err.payload().is_none());
    }

    #[test]
    fn test_cancelled_wraps_last_attempt() {
        let last = ApiError::from_response(envelope(500, r#"{"message":"boom"}"#));
        let err = ApiError::cancelled(CancelReason::DeadlineExceeded, Some(last));
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(err.status(), 0);
        assert!(err.message().contains("deadline exceeded"));
        assert!(err.message().contains("boom"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_response_processing_keeps_envelope() {
        let env = envelope(200, "} not json {");
        let cause = serde_json::from_slice::<Value>(&env.body).unwrap_err();
        let err = ApiError::response_processing(cause, env);
        assert_eq!(err.kind(), ErrorKind::ResponseProcessing);
        assert_eq!(err.status(), 200);
        assert_eq!(err.into_response().map(|r| r.status), Some(200));
    }
}
