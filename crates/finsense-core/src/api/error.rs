use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of API errors for consistent handling at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// Missing or malformed caller input (rejected locally or by the backend
    /// with 400/422)
    Validation,
    /// Missing, expired, or rejected credentials (401/403)
    Auth,
    /// Referenced server-side artifact absent (404)
    NotFound,
    /// Transport or timeout failure
    Network,
    /// Any other backend failure (5xx, undecodable body)
    Backend,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Validation => write!(f, "validation"),
            ApiErrorKind::Auth => write!(f, "auth"),
            ApiErrorKind::NotFound => write!(f, "not_found"),
            ApiErrorKind::Network => write!(f, "network"),
            ApiErrorKind::Backend => write!(f, "backend"),
        }
    }
}

/// Structured error carrying the original status and backend detail.
///
/// The backend's `detail` text is preserved unchanged so the presentation
/// layer can show it verbatim.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Error category
    pub kind: ApiErrorKind,
    /// HTTP status, when the backend answered at all
    pub status: Option<u16>,
    /// One-line summary suitable for display
    pub message: String,
    /// Backend-provided detail text, verbatim
    pub detail: Option<String>,
}

impl ApiError {
    /// Creates a new error with no status attached.
    fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a pre-network validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    /// Creates an auth error raised before any request was sent
    /// (e.g. no stored token for an authenticated-only operation).
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Auth, message)
    }

    /// Creates a transport/timeout error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// Classifies a failure response by status code and extracts the
    /// backend's `detail` field when the body is JSON.
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ApiErrorKind::Auth,
            404 => ApiErrorKind::NotFound,
            400 | 422 => ApiErrorKind::Validation,
            _ => ApiErrorKind::Backend,
        };

        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(detail) = json.get("detail").and_then(|v| v.as_str())
        {
            return Self {
                kind,
                status: Some(status),
                message: format!("HTTP {}: {}", status, detail),
                detail: Some(detail.to_string()),
            };
        }

        Self {
            kind,
            status: Some(status),
            message: format!("HTTP {}", status),
            detail: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// True when the failure should send the user to sign in again.
    pub fn requires_auth(&self) -> bool {
        self.kind == ApiErrorKind::Auth
    }

    /// Backend detail when present, the summary message otherwise.
    pub fn detail_or_message(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
