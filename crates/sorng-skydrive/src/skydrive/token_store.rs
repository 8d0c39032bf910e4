//! Refresh-token persistence.
//!
//! A store holds exactly one [`RefreshTokenRecord`].  Saving replaces it,
//! retrieving returns the latest save.  The auth client calls `save_token`
//! whenever the token endpoint hands out a refresh token and
//! `retrieve_token` when it tries to resume a session.

use crate::skydrive::error::{SkyDriveError, SkyDriveResult};
use async_trait::async_trait;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// The durable credential used to obtain new access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
}

impl RefreshTokenRecord {
    pub fn new(refresh_token: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            client_id: None,
        }
    }

    /// Record tagged with the application that obtained it.
    pub fn with_client_id(refresh_token: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            refresh_token: refresh_token.into(),
            client_id: Some(client_id.into()),
        }
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

/// Single-slot refresh-token storage.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Replace the held record.
    async fn save_token(&self, record: RefreshTokenRecord) -> SkyDriveResult<()>;

    /// Most recently saved record, or `None` if nothing was ever saved.
    async fn retrieve_token(&self) -> SkyDriveResult<Option<RefreshTokenRecord>>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  In-memory store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-lifetime store.  The default.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<RefreshTokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a refresh token obtained elsewhere.
    pub fn with_token(refresh_token: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(RefreshTokenRecord::new(refresh_token))),
        }
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryTokenStore {
    async fn save_token(&self, record: RefreshTokenRecord) -> SkyDriveResult<()> {
        *self.slot.write().await = Some(record);
        Ok(())
    }

    async fn retrieve_token(&self) -> SkyDriveResult<Option<RefreshTokenRecord>> {
        Ok(self.slot.read().await.clone())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  JSON file store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Store that keeps the record as a JSON document on disk.
///
/// Each save writes its own sibling temp file and renames it into place, so
/// a crash mid-write leaves the previous record intact and overlapping saves
/// never touch each other's temp file.  The last rename wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data dir>/sortofremote/skydrive/refresh_token.json`.
    pub fn default_location() -> SkyDriveResult<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| SkyDriveError::token_store("No platform data directory available"))?;
        Ok(Self::new(
            base.join("sortofremote").join("skydrive").join("refresh_token.json"),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fresh temp path next to the record, unique per save.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "refresh_token.json".into());
        name.push(format!(".{}.tmp", uuid::Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RefreshTokenStore for FileTokenStore {
    async fn save_token(&self, record: RefreshTokenRecord) -> SkyDriveResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SkyDriveError::token_store(format!(
                        "Cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let body = serde_json::to_vec_pretty(&record)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &body).await.map_err(|e| {
            SkyDriveError::token_store(format!("Cannot write {}: {}", tmp.display(), e))
        })?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(SkyDriveError::token_store(format!(
                "Cannot move refresh token into {}: {}",
                self.path.display(),
                e
            )));
        }

        info!("Saved refresh token to {}", self.path.display());
        Ok(())
    }

    async fn retrieve_token(&self) -> SkyDriveResult<Option<RefreshTokenRecord>> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No refresh token at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(SkyDriveError::token_store(format!(
                    "Cannot read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let record: RefreshTokenRecord = serde_json::from_slice(&body).map_err(|e| {
            SkyDriveError::token_store(format!(
                "Corrupt refresh token file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(record))
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
