//! SkyDrive storage operations.
//!
//! [`SkyDriveClient`] turns path-level transport calls into typed items.
//! Every method issues one request (plus the one-time root lookup where a
//! default parent is needed) and projects the response; transport failures
//! come back unchanged.

use crate::skydrive::accessor::ResponseMapExt;
use crate::skydrive::error::{SkyDriveError, SkyDriveErrorCode, SkyDriveResult};
use crate::skydrive::items::{FileItem, FolderItem, ResourceItem, SkyDriveItem};
use crate::skydrive::transport::LiveTransport;
use crate::skydrive::types::{ContentStream, OverwriteOption, ResponseMap, StorageQuota};
use log::{debug, info};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;

const ROOT_PATH: &str = "me/skydrive";
const ROOT_FILES_PATH: &str = "me/skydrive/files";
const QUOTA_PATH: &str = "me/skydrive/quota";
const FOLDERS_FILTER: &str = "?filter=folders";

struct ClientInner {
    transport: Arc<dyn LiveTransport>,
    /// Root folder response, fetched once.
    root: OnceCell<ResponseMap>,
}

/// Typed client over a [`LiveTransport`].
///
/// Cheap to clone; clones share the transport and the cached root folder.
#[derive(Clone)]
pub struct SkyDriveClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for SkyDriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkyDriveClient")
            .field("root_cached", &self.inner.root.initialized())
            .finish()
    }
}

impl SkyDriveClient {
    pub fn new(transport: Arc<dyn LiveTransport>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                root: OnceCell::new(),
            }),
        }
    }

    pub fn transport(&self) -> &Arc<dyn LiveTransport> {
        &self.inner.transport
    }

    // ── Root ─────────────────────────────────────────────────────────

    /// The account's root folder.  Fetched on first use, then cached for
    /// the life of the client.  A failed fetch is retried on the next call.
    pub async fn root_folder(&self) -> SkyDriveResult<FolderItem> {
        let mapping = self
            .inner
            .root
            .get_or_try_init(|| self.fetch_root())
            .await?;
        Ok(FolderItem::from_response(self.clone(), mapping))
    }

    async fn fetch_root(&self) -> SkyDriveResult<ResponseMap> {
        debug!("Resolving root folder");
        let mapping = self.inner.transport.get(ROOT_PATH).await?;
        match ResourceItem::create(self, &mapping)? {
            ResourceItem::Folder(_) => Ok(mapping),
            ResourceItem::File(_) => Err(SkyDriveError::malformed("Root resource is not a folder")),
        }
    }

    async fn root_id(&self) -> SkyDriveResult<String> {
        Ok(self.root_folder().await?.id().to_string())
    }

    // ── Listing ──────────────────────────────────────────────────────

    /// Children of `parent_id` (the root when `None`).  With
    /// `include_folders` the service is asked for folders only.
    pub async fn list_items(
        &self,
        parent_id: Option<&str>,
        include_folders: bool,
    ) -> SkyDriveResult<Vec<ResourceItem>> {
        let path = Self::listing_path(parent_id, include_folders);
        debug!("Listing {}", path);

        let response = self.inner.transport.get(&path).await?;
        Self::item_collection(&response)?
            .iter()
            .map(|value| match value {
                Value::Object(mapping) => ResourceItem::create(self, mapping),
                other => Err(SkyDriveError::malformed(format!(
                    "Listing element is not an object: {}",
                    other
                ))),
            })
            .collect()
    }

    pub async fn list_folders(&self, parent_id: Option<&str>) -> SkyDriveResult<Vec<FolderItem>> {
        Ok(self
            .list_items(parent_id, true)
            .await?
            .into_iter()
            .filter_map(ResourceItem::into_folder)
            .collect())
    }

    pub async fn list_files(&self, parent_id: Option<&str>) -> SkyDriveResult<Vec<FileItem>> {
        Ok(self
            .list_items(parent_id, false)
            .await?
            .into_iter()
            .filter_map(ResourceItem::into_file)
            .collect())
    }

    fn listing_path(parent_id: Option<&str>, include_folders: bool) -> String {
        let mut path = match parent_id {
            Some(id) => format!("{}/files", id),
            None => ROOT_FILES_PATH.to_string(),
        };
        if include_folders {
            path.push_str(FOLDERS_FILTER);
        }
        path
    }

    /// The `data` array, or failing that the first array-valued entry.
    fn item_collection(response: &ResponseMap) -> SkyDriveResult<&Vec<Value>> {
        if let Some(Value::Array(items)) = response.get("data") {
            return Ok(items);
        }
        response
            .values()
            .find_map(Value::as_array)
            .ok_or_else(|| SkyDriveError::malformed("Listing response has no item collection"))
    }

    // ── Upload / download ────────────────────────────────────────────

    /// Upload `content` as `name` into `parent_id` (the root when `None`).
    /// An existing item with that name is a conflict, never replaced.
    pub async fn upload_file(
        &self,
        content: ContentStream,
        name: &str,
        parent_id: Option<&str>,
    ) -> SkyDriveResult<FileItem> {
        let parent = match parent_id {
            Some(id) => id.to_string(),
            None => self.root_id().await?,
        };
        info!("Uploading {} into {}", name, parent);

        let mapping = self
            .inner
            .transport
            .upload(&parent, name, content, OverwriteOption::DoNotOverwrite)
            .await?;
        Ok(FileItem::from_response(self.clone(), &mapping))
    }

    /// Upload a local file under its own file name.
    pub async fn upload_file_from_path(
        &self,
        path: impl AsRef<Path>,
        parent_id: Option<&str>,
    ) -> SkyDriveResult<FileItem> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                SkyDriveError::new(
                    SkyDriveErrorCode::InvalidRequest,
                    format!("{} has no usable file name", path.display()),
                )
            })?
            .to_string();

        let file = tokio::fs::File::open(path).await.map_err(|e| {
            SkyDriveError::new(
                SkyDriveErrorCode::LocalIo,
                format!("Cannot open {}: {}", path.display(), e),
            )
        })?;
        self.upload_file(Box::new(file), &name, parent_id).await
    }

    /// Open a file's content.  `None` when the service reports no content.
    pub async fn download_file(&self, file_id: &str) -> SkyDriveResult<Option<ContentStream>> {
        let result = self
            .inner
            .transport
            .download(&format!("{}/content", file_id))
            .await?;
        Ok(result.stream)
    }

    /// Copy a file's content into a newly created `destination`.
    ///
    /// Returns the number of bytes written, or `None` without touching the
    /// filesystem when the service reports no content.
    pub async fn download_file_to(
        &self,
        destination: impl AsRef<Path>,
        file_id: &str,
    ) -> SkyDriveResult<Option<u64>> {
        let destination = destination.as_ref();
        let Some(mut stream) = self.download_file(file_id).await? else {
            debug!("No content for {}; nothing written", file_id);
            return Ok(None);
        };

        let local_err = |action: &str, e: std::io::Error| {
            SkyDriveError::new(
                SkyDriveErrorCode::LocalIo,
                format!("Cannot {} {}: {}", action, destination.display(), e),
            )
        };
        let mut file = tokio::fs::File::create(destination)
            .await
            .map_err(|e| local_err("create", e))?;
        let written = tokio::io::copy(&mut stream, &mut file)
            .await
            .map_err(|e| local_err("write", e))?;
        file.flush().await.map_err(|e| local_err("flush", e))?;

        info!("Downloaded {} ({} bytes) to {}", file_id, written, destination.display());
        Ok(Some(written))
    }

    // ── Properties ───────────────────────────────────────────────────

    pub async fn get_properties(&self, item_id: &str) -> SkyDriveResult<ResourceItem> {
        let mapping = self.fetch_mapping(item_id).await?;
        ResourceItem::create(self, &mapping)
    }

    pub(crate) async fn fetch_mapping(&self, item_id: &str) -> SkyDriveResult<ResponseMap> {
        self.inner.transport.get(item_id).await
    }

    /// Update name and/or description.  `None` leaves a field untouched;
    /// an empty description clears it.
    pub async fn set_properties(
        &self,
        item_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> SkyDriveResult<ResponseMap> {
        let body = Self::properties_body(name, description);
        info!("Updating properties of {}", item_id);
        self.inner.transport.put(item_id, &body).await
    }

    fn properties_body(name: Option<&str>, description: Option<&str>) -> ResponseMap {
        let mut body = ResponseMap::new();
        if let Some(name) = name {
            body.insert("name".into(), Value::String(name.to_string()));
        }
        match description {
            Some("") => {
                body.insert("description".into(), Value::Null);
            }
            Some(d) => {
                body.insert("description".into(), Value::String(d.to_string()));
            }
            None => {}
        }
        body
    }

    pub async fn delete(&self, item_id: &str) -> SkyDriveResult<()> {
        info!("Deleting {}", item_id);
        self.inner.transport.delete(item_id).await?;
        Ok(())
    }

    // ── Sharing ──────────────────────────────────────────────────────

    /// View-only link for the item.
    pub async fn shared_read_link(&self, item_id: &str) -> SkyDriveResult<String> {
        self.string_field(&format!("{}/shared_read_link", item_id), "link")
            .await
    }

    /// Read-write link for the item.
    pub async fn shared_edit_link(&self, item_id: &str) -> SkyDriveResult<String> {
        self.string_field(&format!("{}/shared_edit_link", item_id), "link")
            .await
    }

    /// Embeddable HTML for the item.
    pub async fn embed_link(&self, item_id: &str) -> SkyDriveResult<String> {
        self.string_field(&format!("{}/embed", item_id), "embed_html")
            .await
    }

    async fn string_field(&self, path: &str, key: &str) -> SkyDriveResult<String> {
        let response = self.inner.transport.get(path).await?;
        Ok(response.get_string(key))
    }

    // ── Organisation ─────────────────────────────────────────────────

    /// Move an item into `destination_id`.  Returns the moved item.
    pub async fn move_item(&self, item_id: &str, destination_id: &str) -> SkyDriveResult<ResourceItem> {
        info!("Moving {} to {}", item_id, destination_id);
        let mapping = self.inner.transport.move_item(item_id, destination_id).await?;
        ResourceItem::create(self, &mapping)
    }

    /// Copy a file into `destination_id`.  Returns the new copy.
    pub async fn copy_item(&self, item_id: &str, destination_id: &str) -> SkyDriveResult<ResourceItem> {
        info!("Copying {} to {}", item_id, destination_id);
        let mapping = self.inner.transport.copy_item(item_id, destination_id).await?;
        ResourceItem::create(self, &mapping)
    }

    /// Create a folder under `parent_id` (the root when `None`).
    pub async fn create_folder(
        &self,
        parent_id: Option<&str>,
        name: &str,
        description: Option<&str>,
    ) -> SkyDriveResult<FolderItem> {
        let path = parent_id.unwrap_or(ROOT_PATH);
        let mut body = ResponseMap::new();
        body.insert("name".into(), Value::String(name.to_string()));
        if let Some(d) = description {
            body.insert("description".into(), Value::String(d.to_string()));
        }

        info!("Creating folder {} in {}", name, path);
        let mapping = self.inner.transport.post(path, &body).await?;
        Ok(FolderItem::from_response(self.clone(), &mapping))
    }

    // ── Account ──────────────────────────────────────────────────────

    pub async fn quota(&self) -> SkyDriveResult<StorageQuota> {
        let response = self.inner.transport.get(QUOTA_PATH).await?;
        Ok(StorageQuota {
            quota: response.get_or("quota", 0i64),
            available: response.get_or("available", 0i64),
        })
    }

    /// Resolve a `/`-separated path of item names from the root folder.
    ///
    /// Names are matched exactly.  An empty path yields the root.
    pub async fn find_by_path(&self, path: &str) -> SkyDriveResult<ResourceItem> {
        let mut current = ResourceItem::Folder(self.root_folder().await?);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        for (depth, segment) in segments.iter().enumerate() {
            let Some(folder) = current.as_folder() else {
                return Err(SkyDriveError::not_found(format!(
                    "{} is not a folder",
                    segments[..depth].join("/")
                )));
            };
            current = folder
                .list_items(false)
                .await?
                .into_iter()
                .find(|item| item.name() == *segment)
                .ok_or_else(|| {
                    SkyDriveError::not_found(format!(
                        "No item named {} at /{}",
                        segment,
                        segments[..depth].join("/")
                    ))
                })?;
        }
        Ok(current)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
