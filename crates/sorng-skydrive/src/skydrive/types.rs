//! Shared types for the SkyDrive / Live Connect integration.
//!
//! Covers connection configuration, OAuth2 tokens, the untyped response
//! mapping returned by the transport, upload overwrite policy, download
//! results, and storage quota.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::io::AsyncRead;

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Configuration for a Live Connect connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyDriveConfig {
    /// Application (client) ID from the Live Connect app registration.
    pub client_id: String,
    /// Client secret (web / confidential clients only).
    pub client_secret: Option<String>,
    /// Redirect URI registered for the application.
    pub redirect_uri: String,
    /// REST API base URL.  Default: `https://apis.live.net/v5.0`.
    pub api_base_url: String,
    /// OAuth2 authorization endpoint.
    pub authorize_url: String,
    /// OAuth2 token endpoint.
    pub token_url: String,
    /// Scopes requested at sign-in.
    pub scopes: Vec<String>,
    /// Timeout in seconds for HTTP calls.  Default: 60.
    pub timeout_sec: u64,
}

impl Default for SkyDriveConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            redirect_uri: "https://login.live.com/oauth20_desktop.srf".into(),
            api_base_url: "https://apis.live.net/v5.0".into(),
            authorize_url: "https://login.live.com/oauth20_authorize.srf".into(),
            token_url: "https://login.live.com/oauth20_token.srf".into(),
            scopes: vec![
                "wl.signin".into(),
                "wl.offline_access".into(),
                "wl.skydrive_update".into(),
            ],
            timeout_sec: 60,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OAuth2
// ═══════════════════════════════════════════════════════════════════════

/// OAuth2 token set returned by the token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
    pub scope: String,
    pub user_id: Option<String>,
}

impl OAuthTokenSet {
    /// Whether the access token has expired (with 60-second grace).
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(60)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Transport payloads
// ═══════════════════════════════════════════════════════════════════════

/// Decoded, untyped key/value body of a REST response.
pub type ResponseMap = serde_json::Map<String, serde_json::Value>;

/// Readable content owned by the caller.  Dropping it releases the
/// underlying file handle or connection.
pub type ContentStream = Box<dyn AsyncRead + Send + Unpin>;

/// Result of a download request.
pub struct DownloadResult {
    /// Content, or `None` when the service reported no content.
    pub stream: Option<ContentStream>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

impl DownloadResult {
    /// A result carrying no content.
    pub fn empty() -> Self {
        Self {
            stream: None,
            content_length: None,
            content_type: None,
        }
    }
}

impl fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadResult")
            .field("has_stream", &self.stream.is_some())
            .field("content_length", &self.content_length)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Server-side conflict resolution for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverwriteOption {
    /// Fail with a conflict when the name is taken.
    DoNotOverwrite,
    /// Replace the existing file.
    Overwrite,
    /// Let the service pick a free name.
    ChooseNewName,
}

impl OverwriteOption {
    /// Value of the `overwrite` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            OverwriteOption::DoNotOverwrite => "false",
            OverwriteOption::Overwrite => "true",
            OverwriteOption::ChooseNewName => "ChooseNewName",
        }
    }
}

impl fmt::Display for OverwriteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Account
// ═══════════════════════════════════════════════════════════════════════

/// Storage quota of the signed-in account, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageQuota {
    pub quota: i64,
    pub available: i64,
}

impl StorageQuota {
    /// Bytes in use.
    pub fn used(&self) -> i64 {
        (self.quota - self.available).max(0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = SkyDriveConfig::default();
        assert_eq!(cfg.api_base_url, "https://apis.live.net/v5.0");
        assert!(cfg.scopes.iter().any(|s| s == "wl.offline_access"));
        assert_eq!(cfg.timeout_sec, 60);
    }

    #[test]
    fn test_config_partial_deserialize() {
        let cfg: SkyDriveConfig =
            serde_json::from_str(r#"{"client_id":"000000004C1338B6","timeout_sec":5}"#).unwrap();
        assert_eq!(cfg.client_id, "000000004C1338B6");
        assert_eq!(cfg.timeout_sec, 5);
        assert_eq!(cfg.token_url, "https://login.live.com/oauth20_token.srf");
    }

    #[test]
    fn test_overwrite_query_values() {
        assert_eq!(OverwriteOption::DoNotOverwrite.as_query_value(), "false");
        assert_eq!(OverwriteOption::Overwrite.to_string(), "true");
        assert_eq!(OverwriteOption::ChooseNewName.as_query_value(), "ChooseNewName");
    }

    #[test]
    fn test_token_expiry() {
        let token = OAuthTokenSet {
            access_token: "EwA".into(),
            refresh_token: None,
            token_type: "bearer".into(),
            expires_at: Utc::now() + chrono::Duration::seconds(30),
            scope: String::new(),
            user_id: None,
        };
        // Inside the grace window.
        assert!(token.is_expired());
    }

    #[test]
    fn test_quota_used() {
        let q = StorageQuota { quota: 100, available: 40 };
        assert_eq!(q.used(), 60);
    }
}
