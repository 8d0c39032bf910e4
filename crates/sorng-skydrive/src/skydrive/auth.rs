//! OAuth2 authentication against the Live Connect identity endpoints.
//!
//! Implements the authorization-code flow and refresh-token grant:
//!
//! - **Authorization code**: build the consent URL, let the user sign in,
//!   then exchange the returned `code` for tokens.
//! - **Token refresh**: trade the stored refresh token for a new access
//!   token.
//!
//! Every exchange that yields a refresh token writes it to the configured
//! [`RefreshTokenStore`], so a later [`LiveAuthClient::initialize`] can resume
//! the session without user interaction.

use crate::skydrive::error::{SkyDriveError, SkyDriveResult};
use crate::skydrive::token_store::{MemoryTokenStore, RefreshTokenRecord, RefreshTokenStore};
use crate::skydrive::types::{OAuthTokenSet, SkyDriveConfig};
use chrono::Utc;
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// OAuth2 client bound to one application registration and one token store.
pub struct LiveAuthClient {
    config: SkyDriveConfig,
    store: Arc<dyn RefreshTokenStore>,
    http: reqwest::Client,
}

impl LiveAuthClient {
    pub fn new(config: SkyDriveConfig, store: Arc<dyn RefreshTokenStore>) -> SkyDriveResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| SkyDriveError::internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, store, http })
    }

    /// Client whose refresh token lives only as long as the process.
    pub fn with_memory_store(config: SkyDriveConfig) -> SkyDriveResult<Self> {
        Self::new(config, Arc::new(MemoryTokenStore::new()))
    }

    pub fn config(&self) -> &SkyDriveConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn RefreshTokenStore> {
        &self.store
    }

    /// Random value for the `state` parameter.
    pub fn new_state() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Build the consent URL the user must visit.
    pub fn build_auth_url(&self, state: &str) -> SkyDriveResult<String> {
        let scope = self.config.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("scope", scope.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> SkyDriveResult<OAuthTokenSet> {
        let tokens = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;
        info!("Authorization code exchanged");
        self.persist(&tokens).await?;
        Ok(tokens)
    }

    /// Obtain a new access token from the stored refresh token.
    pub async fn refresh(&self) -> SkyDriveResult<OAuthTokenSet> {
        let record = self
            .store
            .retrieve_token()
            .await?
            .ok_or_else(|| SkyDriveError::auth("No refresh token stored; sign in first"))?;
        self.refresh_with(record.refresh_token()).await
    }

    /// Resume a previous session.  `None` when no refresh token is stored.
    pub async fn initialize(&self) -> SkyDriveResult<Option<OAuthTokenSet>> {
        match self.store.retrieve_token().await? {
            Some(record) => {
                debug!("Resuming session from stored refresh token");
                self.refresh_with(record.refresh_token()).await.map(Some)
            }
            None => {
                debug!("No stored refresh token; interactive sign-in required");
                Ok(None)
            }
        }
    }

    async fn refresh_with(&self, refresh_token: &str) -> SkyDriveResult<OAuthTokenSet> {
        let tokens = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;
        info!("Token refreshed successfully");
        self.persist(&tokens).await?;
        Ok(tokens)
    }

    /// Save the refresh token carried by `tokens`, if any.
    async fn persist(&self, tokens: &OAuthTokenSet) -> SkyDriveResult<()> {
        if let Some(ref refresh) = tokens.refresh_token {
            let record = if self.config.client_id.is_empty() {
                RefreshTokenRecord::new(refresh.clone())
            } else {
                RefreshTokenRecord::with_client_id(refresh.clone(), self.config.client_id.clone())
            };
            self.store.save_token(record).await?;
        }
        Ok(())
    }

    async fn token_request(&self, grant: &[(&str, &str)]) -> SkyDriveResult<OAuthTokenSet> {
        let mut params: Vec<(&str, &str)> = vec![("client_id", self.config.client_id.as_str())];
        if let Some(ref secret) = self.config.client_secret {
            params.push(("client_secret", secret.as_str()));
        }
        params.extend_from_slice(grant);

        debug!("POST {}", self.config.token_url);
        let resp = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(SkyDriveError::from)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(SkyDriveError::from)?;

        if status != 200 {
            return Err(SkyDriveError::from_live_response(status, &body));
        }

        parse_token_response(&body)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Internal helpers
// ═══════════════════════════════════════════════════════════════════════

fn parse_token_response(body: &str) -> SkyDriveResult<OAuthTokenSet> {
    let v: serde_json::Value = serde_json::from_str(body)?;

    let access_token = v["access_token"]
        .as_str()
        .ok_or_else(|| SkyDriveError::auth("No access_token in response"))?
        .to_string();

    let expires_in = v["expires_in"].as_i64().unwrap_or(3600);
    let expires_at = Utc::now() + chrono::Duration::seconds(expires_in);

    debug!("Parsed token, expires in {}s", expires_in);

    Ok(OAuthTokenSet {
        access_token,
        refresh_token: v["refresh_token"].as_str().map(String::from),
        token_type: v["token_type"].as_str().unwrap_or("bearer").to_string(),
        expires_at,
        scope: v["scope"].as_str().unwrap_or_default().to_string(),
        user_id: v["user_id"].as_str().map(String::from),
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skydrive::error::SkyDriveErrorCode;

    fn config() -> SkyDriveConfig {
        SkyDriveConfig {
            client_id: "000000004C1338B6".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_auth_url() {
        let auth = LiveAuthClient::with_memory_store(config()).unwrap();
        let url = auth.build_auth_url("xyz").unwrap();
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(parsed.host_str(), Some("login.live.com"));
        assert_eq!(parsed.path(), "/oauth20_authorize.srf");

        let q: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(q["client_id"], "000000004C1338B6");
        assert_eq!(q["response_type"], "code");
        assert_eq!(q["scope"], "wl.signin wl.offline_access wl.skydrive_update");
        assert_eq!(q["redirect_uri"], "https://login.live.com/oauth20_desktop.srf");
        assert_eq!(q["state"], "xyz");
    }

    #[test]
    fn test_new_state_is_unique() {
        let a = LiveAuthClient::new_state();
        let b = LiveAuthClient::new_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_token_response() {
        let body = r#"{
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "wl.signin wl.offline_access wl.skydrive_update",
            "access_token": "EwBAAq1DBAAUGCCXc8wU",
            "refresh_token": "CvY5x!BbvmIBaW0Nyd",
            "authentication_token": "eyJhbGciOiJIUzI1NiIsImtpZCI6IjAi",
            "user_id": "8c8ce076ca27823f"
        }"#;
        let token = parse_token_response(body).unwrap();
        assert_eq!(token.access_token, "EwBAAq1DBAAUGCCXc8wU");
        assert_eq!(token.refresh_token.as_deref(), Some("CvY5x!BbvmIBaW0Nyd"));
        assert_eq!(token.user_id.as_deref(), Some("8c8ce076ca27823f"));
        assert!(!token.is_expired());
    }

    #[test]
    fn test_parse_token_response_missing_access_token() {
        let err = parse_token_response(r#"{"token_type": "bearer"}"#).unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::AuthFailed);
    }

    #[tokio::test]
    async fn test_initialize_without_stored_token() {
        let auth = LiveAuthClient::with_memory_store(config()).unwrap();
        assert!(auth.initialize().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_refresh_without_stored_token() {
        let auth = LiveAuthClient::with_memory_store(config()).unwrap();
        let err = auth.refresh().await.unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::AuthFailed);
    }

    #[tokio::test]
    async fn test_persist_saves_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let auth = LiveAuthClient::new(config(), store.clone()).unwrap();

        let mut tokens = parse_token_response(r#"{"access_token":"a"}"#).unwrap();
        auth.persist(&tokens).await.unwrap();
        assert!(store.retrieve_token().await.unwrap().is_none());

        tokens.refresh_token = Some("r1".into());
        auth.persist(&tokens).await.unwrap();
        let saved = store.retrieve_token().await.unwrap().unwrap();
        assert_eq!(saved.refresh_token(), "r1");
        assert_eq!(saved.client_id(), Some("000000004C1338B6"));
    }
}
