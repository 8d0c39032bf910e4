//! Typed SkyDrive items built from untyped service responses.
//!
//! [`ResourceItem::create`] dispatches on the response's `type` field and
//! yields a [`FolderItem`] or a [`FileItem`].  Both carry the shared
//! [`ItemProperties`] and a handle to the owning [`SkyDriveClient`]; the
//! operations common to every item live on the [`SkyDriveItem`] trait.

use crate::skydrive::accessor::ResponseMapExt;
use crate::skydrive::client::SkyDriveClient;
use crate::skydrive::error::{SkyDriveError, SkyDriveResult};
use crate::skydrive::types::{ContentStream, ResponseMap};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use std::path::Path;

const TYPE_FILE: &str = "file";
const TYPE_FOLDER: &str = "folder";
const TYPE_ALBUM: &str = "album";

/// Timestamp format the service uses (`2012-03-26T23:09:46+0000`).
const LIVE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

// ═══════════════════════════════════════════════════════════════════════
//  Shared properties
// ═══════════════════════════════════════════════════════════════════════

/// Fields every item carries.
///
/// `id` and the server-managed fields change only when the item is
/// re-projected from a response.  `name` and `description` may be edited
/// locally and pushed with [`SkyDriveItem::write_properties`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemProperties {
    id: String,
    name: String,
    description: String,
    parent_id: String,
    size: i64,
    link: String,
    created_time: DateTime<Utc>,
}

impl ItemProperties {
    pub fn from_response(mapping: &ResponseMap) -> Self {
        let mut props = Self::default();
        props.assign_from(mapping);
        props
    }

    /// Overwrite every field from `mapping`.
    pub(crate) fn assign_from(&mut self, mapping: &ResponseMap) {
        self.id = mapping.get_string("id");
        self.name = mapping.get_string("name");
        self.description = mapping.get_string("description");
        self.parent_id = mapping.get_string("parent_id");
        self.size = mapping.get_or("size", 0i64);
        self.link = mapping.get_string("link");
        self.created_time = parse_created_time(&mapping.get_string("created_time"));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// An empty description clears the remote one on the next write.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn parent_id(&self) -> &str {
        &self.parent_id
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn created_time(&self) -> DateTime<Utc> {
        self.created_time
    }
}

/// Unix epoch when absent, empty, or unparsable.
fn parse_created_time(raw: &str) -> DateTime<Utc> {
    if raw.is_empty() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, LIVE_TIME_FORMAT))
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            warn!("Ignoring unparsable created_time {:?}: {}", raw, e);
            DateTime::<Utc>::UNIX_EPOCH
        })
}

// ═══════════════════════════════════════════════════════════════════════
//  Common operations
// ═══════════════════════════════════════════════════════════════════════

/// Operations shared by folders and files.
///
/// Each async method is a single request through the owning client and
/// fails independently.  None of them mutate `self` except
/// [`refresh_properties`](SkyDriveItem::refresh_properties).
#[async_trait]
pub trait SkyDriveItem: Send + Sync {
    fn properties(&self) -> &ItemProperties;

    fn properties_mut(&mut self) -> &mut ItemProperties;

    fn client(&self) -> &SkyDriveClient;

    /// Re-project every field, shared ones first, from `mapping`.
    fn assign_from(&mut self, mapping: &ResponseMap);

    fn id(&self) -> &str {
        self.properties().id()
    }

    fn name(&self) -> &str {
        self.properties().name()
    }

    fn description(&self) -> &str {
        self.properties().description()
    }

    fn set_name(&mut self, name: &str) {
        self.properties_mut().set_name(name);
    }

    fn set_description(&mut self, description: &str) {
        self.properties_mut().set_description(description);
    }

    /// Push the local name and description.
    async fn write_properties(&self) -> SkyDriveResult<()> {
        let props = self.properties();
        self.client()
            .set_properties(props.id(), Some(props.name()), Some(props.description()))
            .await?;
        Ok(())
    }

    /// Re-fetch by id and re-project this instance in place.
    async fn refresh_properties(&mut self) -> SkyDriveResult<()> {
        let mapping = self.client().fetch_mapping(self.id()).await?;
        self.assign_from(&mapping);
        Ok(())
    }

    /// Remove the remote item.  This value is stale afterwards.
    async fn delete(&self) -> SkyDriveResult<()> {
        self.client().delete(self.id()).await
    }

    async fn shared_read_link(&self) -> SkyDriveResult<String> {
        self.client().shared_read_link(self.id()).await
    }

    async fn shared_edit_link(&self) -> SkyDriveResult<String> {
        self.client().shared_edit_link(self.id()).await
    }

    /// HTML snippet embedding the item.
    async fn embed_link(&self) -> SkyDriveResult<String> {
        self.client().embed_link(self.id()).await
    }

    async fn move_to(&self, destination_id: &str) -> SkyDriveResult<ResourceItem> {
        self.client().move_item(self.id(), destination_id).await
    }

    async fn copy_to(&self, destination_id: &str) -> SkyDriveResult<ResourceItem> {
        self.client().copy_item(self.id(), destination_id).await
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Folder
// ═══════════════════════════════════════════════════════════════════════

/// A folder (or photo album).
#[derive(Debug, Clone)]
pub struct FolderItem {
    client: SkyDriveClient,
    props: ItemProperties,
    child_count: i64,
}

impl FolderItem {
    pub(crate) fn from_response(client: SkyDriveClient, mapping: &ResponseMap) -> Self {
        let mut folder = Self {
            client,
            props: ItemProperties::default(),
            child_count: 0,
        };
        folder.assign_from(mapping);
        folder
    }

    /// Number of direct children reported by the service.
    pub fn child_count(&self) -> i64 {
        self.child_count
    }

    /// Children of this folder; `include_folders` requests folders only.
    pub async fn list_items(&self, include_folders: bool) -> SkyDriveResult<Vec<ResourceItem>> {
        self.client.list_items(Some(self.id()), include_folders).await
    }

    pub async fn list_folders(&self) -> SkyDriveResult<Vec<FolderItem>> {
        self.client.list_folders(Some(self.id())).await
    }

    pub async fn list_files(&self) -> SkyDriveResult<Vec<FileItem>> {
        self.client.list_files(Some(self.id())).await
    }

    /// Upload into this folder.  Fails with a conflict if `name` is taken.
    pub async fn upload_file(&self, content: ContentStream, name: &str) -> SkyDriveResult<FileItem> {
        self.client.upload_file(content, name, Some(self.id())).await
    }

    pub async fn upload_file_from_path(&self, path: impl AsRef<Path>) -> SkyDriveResult<FileItem> {
        self.client.upload_file_from_path(path, Some(self.id())).await
    }

    pub async fn create_folder(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> SkyDriveResult<FolderItem> {
        self.client.create_folder(Some(self.id()), name, description).await
    }
}

impl SkyDriveItem for FolderItem {
    fn properties(&self) -> &ItemProperties {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut ItemProperties {
        &mut self.props
    }

    fn client(&self) -> &SkyDriveClient {
        &self.client
    }

    fn assign_from(&mut self, mapping: &ResponseMap) {
        self.props.assign_from(mapping);
        self.child_count = mapping.get_or("count", 0i64);
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  File
// ═══════════════════════════════════════════════════════════════════════

/// A stored file.
#[derive(Debug, Clone)]
pub struct FileItem {
    client: SkyDriveClient,
    props: ItemProperties,
    source_url: String,
}

impl FileItem {
    pub(crate) fn from_response(client: SkyDriveClient, mapping: &ResponseMap) -> Self {
        let mut file = Self {
            client,
            props: ItemProperties::default(),
            source_url: String::new(),
        };
        file.assign_from(mapping);
        file
    }

    /// Direct content URL.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Open the content.  `None` when the service reports no content.
    pub async fn download(&self) -> SkyDriveResult<Option<ContentStream>> {
        self.client.download_file(self.id()).await
    }

    /// Write the content to a new local file.  Returns the byte count, or
    /// `None` (and creates nothing) when there is no content.
    pub async fn download_to(&self, destination: impl AsRef<Path>) -> SkyDriveResult<Option<u64>> {
        self.client.download_file_to(destination, self.id()).await
    }
}

impl SkyDriveItem for FileItem {
    fn properties(&self) -> &ItemProperties {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut ItemProperties {
        &mut self.props
    }

    fn client(&self) -> &SkyDriveClient {
        &self.client
    }

    fn assign_from(&mut self, mapping: &ResponseMap) {
        self.props.assign_from(mapping);
        self.source_url = mapping.get_string("source");
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Polymorphic item
// ═══════════════════════════════════════════════════════════════════════

/// Either kind of item, as returned by listings and lookups.
#[derive(Debug, Clone)]
pub enum ResourceItem {
    Folder(FolderItem),
    File(FileItem),
}

impl ResourceItem {
    /// Build the variant named by the mapping's `type`.
    pub fn create(client: &SkyDriveClient, mapping: &ResponseMap) -> SkyDriveResult<Self> {
        let item_type = mapping.get_string("type");
        match item_type.as_str() {
            TYPE_FILE => Ok(ResourceItem::File(FileItem::from_response(
                client.clone(),
                mapping,
            ))),
            TYPE_FOLDER | TYPE_ALBUM => Ok(ResourceItem::Folder(FolderItem::from_response(
                client.clone(),
                mapping,
            ))),
            other => Err(SkyDriveError::unsupported_item(other)),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, ResourceItem::Folder(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ResourceItem::File(_))
    }

    pub fn as_folder(&self) -> Option<&FolderItem> {
        match self {
            ResourceItem::Folder(f) => Some(f),
            ResourceItem::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileItem> {
        match self {
            ResourceItem::File(f) => Some(f),
            ResourceItem::Folder(_) => None,
        }
    }

    pub fn into_folder(self) -> Option<FolderItem> {
        match self {
            ResourceItem::Folder(f) => Some(f),
            ResourceItem::File(_) => None,
        }
    }

    pub fn into_file(self) -> Option<FileItem> {
        match self {
            ResourceItem::File(f) => Some(f),
            ResourceItem::Folder(_) => None,
        }
    }
}

impl SkyDriveItem for ResourceItem {
    fn properties(&self) -> &ItemProperties {
        match self {
            ResourceItem::Folder(f) => f.properties(),
            ResourceItem::File(f) => f.properties(),
        }
    }

    fn properties_mut(&mut self) -> &mut ItemProperties {
        match self {
            ResourceItem::Folder(f) => f.properties_mut(),
            ResourceItem::File(f) => f.properties_mut(),
        }
    }

    fn client(&self) -> &SkyDriveClient {
        match self {
            ResourceItem::Folder(f) => f.client(),
            ResourceItem::File(f) => f.client(),
        }
    }

    fn assign_from(&mut self, mapping: &ResponseMap) {
        match self {
            ResourceItem::Folder(f) => f.assign_from(mapping),
            ResourceItem::File(f) => f.assign_from(mapping),
        }
    }
}

impl From<FolderItem> for ResourceItem {
    fn from(folder: FolderItem) -> Self {
        ResourceItem::Folder(folder)
    }
}

impl From<FileItem> for ResourceItem {
    fn from(file: FileItem) -> Self {
        ResourceItem::File(file)
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skydrive::error::SkyDriveErrorCode;
    use crate::skydrive::transport::SimulatedTransport;
    use chrono::TimeZone;
    use serde_json::json;

    fn client() -> SkyDriveClient {
        SkyDriveClient::new(SimulatedTransport::new())
    }

    fn map(v: serde_json::Value) -> ResponseMap {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_create_folder_with_defaults() {
        let item = ResourceItem::create(
            &client(),
            &map(json!({ "type": "folder", "id": "F1", "name": "Docs", "count": 3 })),
        )
        .unwrap();
        let folder = item.into_folder().unwrap();
        assert_eq!(folder.id(), "F1");
        assert_eq!(folder.name(), "Docs");
        assert_eq!(folder.child_count(), 3);
        assert_eq!(folder.properties().size(), 0);
        assert_eq!(folder.description(), "");
        assert_eq!(folder.properties().created_time(), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_create_file() {
        let item = ResourceItem::create(
            &client(),
            &map(json!({
                "type": "file",
                "id": "file.a1",
                "name": "notes.txt",
                "description": null,
                "parent_id": "folder.a1",
                "size": 42,
                "link": "https://skydrive.live.com/redir.aspx?cid=a1",
                "source": "https://storage.live.com/s1/notes.txt",
                "created_time": "2012-03-26T23:09:46+0000",
            })),
        )
        .unwrap();
        assert!(item.is_file());
        let file = item.as_file().unwrap();
        assert_eq!(file.properties().parent_id(), "folder.a1");
        assert_eq!(file.properties().size(), 42);
        assert_eq!(file.description(), "");
        assert_eq!(file.source_url(), "https://storage.live.com/s1/notes.txt");
        assert_eq!(
            file.properties().created_time(),
            Utc.with_ymd_and_hms(2012, 3, 26, 23, 9, 46).unwrap()
        );
    }

    #[test]
    fn test_album_is_folder() {
        let item =
            ResourceItem::create(&client(), &map(json!({ "type": "album", "id": "folder.p" })))
                .unwrap();
        assert!(item.is_folder());
    }

    #[test]
    fn test_unknown_or_missing_type() {
        let c = client();
        let err = ResourceItem::create(&c, &map(json!({ "type": "notebook", "id": "x" })))
            .unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::UnsupportedItem);
        assert!(err.message.contains("notebook"));

        let err = ResourceItem::create(&c, &map(json!({ "id": "x" }))).unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::UnsupportedItem);

        let err = ResourceItem::create(&c, &map(json!({ "type": 7, "id": "x" }))).unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::UnsupportedItem);
    }

    #[test]
    fn test_created_time_variants() {
        assert_eq!(parse_created_time(""), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(parse_created_time("yesterday"), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(
            parse_created_time("2013-01-02T03:04:05Z"),
            Utc.with_ymd_and_hms(2013, 1, 2, 3, 4, 5).unwrap()
        );
        assert_eq!(
            parse_created_time("2013-01-02T03:04:05-0100"),
            Utc.with_ymd_and_hms(2013, 1, 2, 4, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_assign_from_overwrites_every_field() {
        let mut item = ResourceItem::create(
            &client(),
            &map(json!({
                "type": "folder", "id": "F1", "name": "Docs",
                "description": "old", "count": 3, "size": 10
            })),
        )
        .unwrap();

        item.assign_from(&map(json!({ "type": "folder", "id": "F1", "name": "Papers" })));
        let folder = item.as_folder().unwrap();
        assert_eq!(folder.name(), "Papers");
        assert_eq!(folder.description(), "");
        assert_eq!(folder.child_count(), 0);
        assert_eq!(folder.properties().size(), 0);
    }

    #[test]
    fn test_local_edits() {
        let mut item =
            ResourceItem::create(&client(), &map(json!({ "type": "file", "id": "file.a1" })))
                .unwrap();
        item.set_name("renamed.txt");
        item.set_description("draft");
        assert_eq!(item.name(), "renamed.txt");
        assert_eq!(item.description(), "draft");
        assert_eq!(item.id(), "file.a1");
    }

    #[tokio::test]
    async fn test_write_then_refresh_round_trip() {
        let sim = SimulatedTransport::new();
        let id = sim.add_file(sim.root_id(), "a.txt", b"abc").await;
        let client = SkyDriveClient::new(sim.clone());

        let mut file = client.get_properties(&id).await.unwrap();
        file.set_name("b.txt");
        file.set_description("first draft");
        file.write_properties().await.unwrap();

        let mut other = client.get_properties(&id).await.unwrap();
        assert_eq!(other.name(), "b.txt");
        assert_eq!(other.description(), "first draft");

        file.set_description("");
        file.write_properties().await.unwrap();
        other.refresh_properties().await.unwrap();
        assert_eq!(other.description(), "");
        assert_eq!(other.properties().size(), 3);
    }

    #[tokio::test]
    async fn test_deleted_item_is_stale() {
        let sim = SimulatedTransport::new();
        let id = sim.add_file(sim.root_id(), "a.txt", b"abc").await;
        let client = SkyDriveClient::new(sim.clone());

        let mut file = client.get_properties(&id).await.unwrap();
        file.delete().await.unwrap();
        let err = file.refresh_properties().await.unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::NotFound);
        assert_eq!(file.id(), id);
    }
}
