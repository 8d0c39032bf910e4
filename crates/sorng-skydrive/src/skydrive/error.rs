//! Error types for the SkyDrive / Live Connect integration.
//!
//! All public API surfaces in this crate return `SkyDriveResult<T>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias.
pub type SkyDriveResult<T> = Result<T, SkyDriveError>;

/// Error codes specific to SkyDrive operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkyDriveErrorCode {
    /// OAuth2 / token error.
    AuthFailed,
    /// Access token expired; refresh needed.
    TokenExpired,
    /// Insufficient OAuth scopes.
    InsufficientPermissions,
    /// Bad request / invalid parameter.
    InvalidRequest,
    /// Resource (file, folder) not found.
    NotFound,
    /// Name collision on upload, move or copy.
    Conflict,
    /// Throttled by the service.
    RateLimited,
    /// Storage quota exceeded.
    QuotaExceeded,
    /// Response lacks the shape an operation depends on.
    MalformedResponse,
    /// Response `type` is missing or not a known item kind.
    UnsupportedItem,
    /// Local file could not be opened, created, read or written.
    LocalIo,
    /// Refresh-token store failure.
    TokenStore,
    /// Network / connectivity error.
    NetworkError,
    /// (De)serialization error.
    SerializationError,
    /// Catch-all internal error.
    InternalError,
}

impl fmt::Display for SkyDriveErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Structured error returned by every public function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyDriveError {
    pub code: SkyDriveErrorCode,
    pub message: String,
    pub status: Option<u16>,
    /// Error code reported by the service (`resource_not_found`, …).
    pub service_code: Option<String>,
}

impl fmt::Display for SkyDriveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref sc) = self.service_code {
            write!(f, " (service: {})", sc)?;
        }
        Ok(())
    }
}

impl std::error::Error for SkyDriveError {}

impl SkyDriveError {
    /// Create from a code + message.
    pub fn new(code: SkyDriveErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            status: None,
            service_code: None,
        }
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::NetworkError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::InternalError, msg)
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::AuthFailed, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::NotFound, msg)
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::MalformedResponse, msg)
    }

    pub fn token_store(msg: impl Into<String>) -> Self {
        Self::new(SkyDriveErrorCode::TokenStore, msg)
    }

    /// Shortcut: the `type` discriminator is missing or unknown.
    pub fn unsupported_item(item_type: &str) -> Self {
        let shown = if item_type.is_empty() { "<missing>" } else { item_type };
        Self::new(
            SkyDriveErrorCode::UnsupportedItem,
            format!("{}: Unknown item type.", shown),
        )
    }

    /// Whether this error carries the given code.
    pub fn is(&self, code: SkyDriveErrorCode) -> bool {
        self.code == code
    }

    /// Build an error from a Live Connect error response body.
    ///
    /// The service code wins over the HTTP status when both are known, since
    /// Live Connect reports several distinct failures as plain HTTP 400.
    pub fn from_live_response(status: u16, body: &str) -> Self {
        let (service_code, service_msg) = Self::parse_live_error_body(body);

        let by_status = match status {
            401 => SkyDriveErrorCode::AuthFailed,
            403 => SkyDriveErrorCode::InsufficientPermissions,
            404 => SkyDriveErrorCode::NotFound,
            409 => SkyDriveErrorCode::Conflict,
            413 | 507 => SkyDriveErrorCode::QuotaExceeded,
            420 | 429 => SkyDriveErrorCode::RateLimited,
            _ if status >= 500 => SkyDriveErrorCode::InternalError,
            _ => SkyDriveErrorCode::InvalidRequest,
        };
        let code = service_code
            .as_deref()
            .and_then(Self::code_for_service_error)
            .unwrap_or(by_status);

        let message = service_msg.unwrap_or_else(|| format!("Live Connect error (HTTP {})", status));

        Self {
            code,
            message,
            status: Some(status),
            service_code,
        }
    }

    fn code_for_service_error(code: &str) -> Option<SkyDriveErrorCode> {
        let mapped = match code {
            "resource_already_exists" => SkyDriveErrorCode::Conflict,
            "resource_not_found" => SkyDriveErrorCode::NotFound,
            "request_url_invalid" | "request_parameter_invalid" | "request_body_invalid" => {
                SkyDriveErrorCode::InvalidRequest
            }
            "request_token_expired" => SkyDriveErrorCode::TokenExpired,
            "request_token_missing" | "request_token_invalid" | "request_token_unknown" => {
                SkyDriveErrorCode::AuthFailed
            }
            "request_token_unauthorized" | "request_token_invalid_scope" => {
                SkyDriveErrorCode::InsufficientPermissions
            }
            "resource_quota_exceeded" => SkyDriveErrorCode::QuotaExceeded,
            "request_throttled" => SkyDriveErrorCode::RateLimited,
            "server_internal_error" | "server_busy" => SkyDriveErrorCode::InternalError,
            _ => return None,
        };
        Some(mapped)
    }

    /// Extract `{ "error": { "code": "...", "message": "..." } }`.
    fn parse_live_error_body(body: &str) -> (Option<String>, Option<String>) {
        let Ok(v) = serde_json::from_str::<serde_json::Value>(body) else {
            return (None, None);
        };
        let err = &v["error"];
        // The token endpoint reports `{"error": "invalid_grant", "error_description": "..."}`.
        if let Some(flat) = err.as_str() {
            return (
                Some(flat.to_string()),
                v["error_description"].as_str().map(String::from),
            );
        }
        (
            err["code"].as_str().map(String::from),
            err["message"].as_str().map(String::from),
        )
    }
}

impl From<reqwest::Error> for SkyDriveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {}", err))
        } else {
            Self::internal(format!("HTTP error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SkyDriveError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            SkyDriveErrorCode::SerializationError,
            format!("JSON error: {}", err),
        )
    }
}

impl From<url::ParseError> for SkyDriveError {
    fn from(err: url::ParseError) -> Self {
        Self::new(
            SkyDriveErrorCode::InvalidRequest,
            format!("URL parse error: {}", err),
        )
    }
}

impl From<std::io::Error> for SkyDriveError {
    fn from(err: std::io::Error) -> Self {
        Self::new(SkyDriveErrorCode::LocalIo, format!("I/O error: {}", err))
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
