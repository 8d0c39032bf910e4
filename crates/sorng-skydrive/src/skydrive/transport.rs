//! Transport abstraction over the Live Connect REST surface.
//!
//! [`LiveTransport`] is the seam between the typed item model and whatever
//! performs the HTTP exchange.  Every method is one request; nothing here
//! retries.  [`crate::skydrive::api_client::LiveConnectClient`] is the real
//! implementation; [`SimulatedTransport`] keeps a small drive in memory.

use crate::skydrive::error::{SkyDriveError, SkyDriveResult};
use crate::skydrive::types::{ContentStream, DownloadResult, OverwriteOption, ResponseMap};
use chrono::Utc;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::Mutex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Transport trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Path-addressed REST verbs against the Live Connect object graph.
///
/// Paths are relative to the API root (`me/skydrive`, `folder.abc/files`,
/// `file.abc/content`) and may carry a query string.
#[async_trait::async_trait]
pub trait LiveTransport: Send + Sync {
    async fn get(&self, path: &str) -> SkyDriveResult<ResponseMap>;

    async fn put(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap>;

    async fn post(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap>;

    async fn delete(&self, path: &str) -> SkyDriveResult<ResponseMap>;

    /// MOVE `path` under the folder `destination`.
    async fn move_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap>;

    /// COPY `path` into the folder `destination`.
    async fn copy_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap>;

    /// Upload `content` as `file_name` into the folder `parent_id`.
    async fn upload(
        &self,
        parent_id: &str,
        file_name: &str,
        content: ContentStream,
        overwrite: OverwriteOption,
    ) -> SkyDriveResult<ResponseMap>;

    /// Fetch raw content.
    async fn download(&self, path: &str) -> SkyDriveResult<DownloadResult>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Simulated transport (for testing & offline use)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const SIM_ROOT_ID: &str = "folder.sim.root";
const SIM_LINK_BASE: &str = "https://sim.skydrive.local";

#[derive(Debug, Clone)]
struct SimNode {
    id: String,
    item_type: String,
    name: String,
    description: Option<String>,
    parent_id: Option<String>,
    created_time: String,
    content: Option<Vec<u8>>,
    /// Verbatim mapping returned instead of the rendered one.
    raw: Option<ResponseMap>,
}

impl SimNode {
    fn is_container(&self) -> bool {
        self.item_type == "folder" || self.item_type == "album"
    }
}

#[derive(Debug)]
struct SimState {
    nodes: Vec<SimNode>,
    next_id: u64,
    requests: Vec<String>,
    /// Paths whose next GET answers `server_busy`.
    failing_gets: Vec<String>,
    quota: i64,
}

impl SimState {
    fn node(&self, id: &str) -> Option<&SimNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut SimNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn children<'s, 'p>(&'s self, parent_id: &'p str) -> impl Iterator<Item = &'s SimNode> + 'p
    where
        's: 'p,
    {
        self.nodes
            .iter()
            .filter(move |n| n.parent_id.as_deref() == Some(parent_id))
    }

    fn sibling_named(&self, parent_id: &str, name: &str) -> Option<&SimNode> {
        self.children(parent_id).find(|n| n.name == name)
    }

    fn allocate_id(&mut self, item_type: &str) -> String {
        self.next_id += 1;
        format!("{}.sim.{}", item_type, self.next_id)
    }

    fn used_bytes(&self) -> i64 {
        self.nodes
            .iter()
            .filter_map(|n| n.content.as_ref())
            .map(|c| c.len() as i64)
            .sum()
    }

    fn render(&self, node: &SimNode) -> ResponseMap {
        if let Some(raw) = &node.raw {
            return raw.clone();
        }
        let mut v = json!({
            "id": node.id,
            "name": node.name,
            "description": node.description,
            "parent_id": node.parent_id,
            "type": node.item_type,
            "link": format!("{}/redir?resid={}", SIM_LINK_BASE, node.id),
            "created_time": node.created_time,
        });
        if node.is_container() {
            v["count"] = json!(self.children(&node.id).count());
            v["size"] = json!(0);
        } else {
            let size = node.content.as_ref().map(|c| c.len()).unwrap_or(0);
            v["size"] = json!(size);
            v["source"] = json!(format!("{}/content/{}", SIM_LINK_BASE, node.id));
        }
        v.as_object().cloned().unwrap_or_default()
    }

    fn descendants_of(&self, id: &str) -> Vec<String> {
        let mut out = vec![id.to_string()];
        let mut i = 0;
        while i < out.len() {
            let current = out[i].clone();
            out.extend(self.children(&current).map(|n| n.id.clone()));
            i += 1;
        }
        out
    }
}

/// A fully in-memory Live Connect drive useful for unit tests and demos.
///
/// Starts with an empty root folder.  Every call is appended to a request
/// log (`"GET me/skydrive/files"`, `"UPLOAD folder.sim.root/a.txt overwrite=false"`)
/// so tests can assert exactly which requests an operation issued.
pub struct SimulatedTransport {
    state: Mutex<SimState>,
}

fn live_error(status: u16, code: &str, message: &str) -> SkyDriveError {
    let body = json!({ "error": { "code": code, "message": message } }).to_string();
    SkyDriveError::from_live_response(status, &body)
}

fn not_found(id: &str) -> SkyDriveError {
    live_error(
        404,
        "resource_not_found",
        &format!("The resource '{}' doesn't exist.", id),
    )
}

fn already_exists(name: &str) -> SkyDriveError {
    live_error(
        400,
        "resource_already_exists",
        &format!("The resource '{}' couldn't be created because it already exists.", name),
    )
}

fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    }
}

fn query_param<'q>(query: Option<&'q str>, key: &str) -> Option<&'q str> {
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn live_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

impl SimulatedTransport {
    /// Create a simulated drive holding only the root folder.
    pub fn new() -> Arc<Self> {
        let root = SimNode {
            id: SIM_ROOT_ID.into(),
            item_type: "folder".into(),
            name: "SkyDrive".into(),
            description: None,
            parent_id: None,
            created_time: live_timestamp(),
            content: None,
            raw: None,
        };
        Arc::new(Self {
            state: Mutex::new(SimState {
                nodes: vec![root],
                next_id: 0,
                requests: Vec::new(),
                failing_gets: Vec::new(),
                quota: 25 * 1024 * 1024 * 1024,
            }),
        })
    }

    /// Id of the root folder.
    pub fn root_id(&self) -> &'static str {
        SIM_ROOT_ID
    }

    /// Seed a folder.  Returns its id.
    pub async fn add_folder(&self, parent_id: &str, name: &str) -> String {
        self.seed(parent_id, "folder", name, None).await
    }

    /// Seed a file with content.  Returns its id.
    pub async fn add_file(&self, parent_id: &str, name: &str, content: &[u8]) -> String {
        self.seed(parent_id, "file", name, Some(content.to_vec())).await
    }

    /// Seed a file whose download reports no content.
    pub async fn add_empty_file(&self, parent_id: &str, name: &str) -> String {
        self.seed(parent_id, "file", name, None).await
    }

    /// Seed an item under `parent_id` whose mapping is returned verbatim.
    /// Its `id` is taken from the mapping.
    pub async fn add_raw(&self, parent_id: &str, mapping: ResponseMap) -> String {
        let mut st = self.state.lock().await;
        let id = mapping
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| st.allocate_id("raw"));
        st.nodes.push(SimNode {
            id: id.clone(),
            item_type: mapping
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            name: mapping
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            description: None,
            parent_id: Some(parent_id.to_string()),
            created_time: live_timestamp(),
            content: None,
            raw: Some(mapping),
        });
        id
    }

    /// Stored content of a file.
    pub async fn content_of(&self, id: &str) -> Option<Vec<u8>> {
        self.state.lock().await.node(id).and_then(|n| n.content.clone())
    }

    /// Whether an item with this id exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.node(id).is_some()
    }

    /// Every request issued so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }

    /// Make the next GET of exactly `path` fail with a 503 `server_busy`.
    pub async fn fail_next_get(&self, path: &str) {
        self.state.lock().await.failing_gets.push(path.to_string());
    }

    /// Forget the request log.
    pub async fn clear_requests(&self) {
        self.state.lock().await.requests.clear();
    }

    async fn seed(
        &self,
        parent_id: &str,
        item_type: &str,
        name: &str,
        content: Option<Vec<u8>>,
    ) -> String {
        let mut st = self.state.lock().await;
        let id = st.allocate_id(item_type);
        st.nodes.push(SimNode {
            id: id.clone(),
            item_type: item_type.into(),
            name: name.into(),
            description: None,
            parent_id: Some(parent_id.into()),
            created_time: live_timestamp(),
            content,
            raw: None,
        });
        id
    }

    fn list(st: &SimState, parent_id: &str, query: Option<&str>) -> SkyDriveResult<ResponseMap> {
        let parent = st.node(parent_id).ok_or_else(|| not_found(parent_id))?;
        if !parent.is_container() {
            return Err(live_error(
                400,
                "request_url_invalid",
                &format!("The URL contains the path 'files', which isn't supported for '{}'.", parent_id),
            ));
        }
        let filter = query_param(query, "filter");
        let data: Vec<Value> = st
            .children(parent_id)
            .filter(|n| match filter {
                Some("folders") => n.is_container(),
                Some("files") => n.item_type == "file",
                _ => true,
            })
            .map(|n| Value::Object(st.render(n)))
            .collect();
        Ok(json!({ "data": data }).as_object().cloned().unwrap_or_default())
    }
}

#[async_trait::async_trait]
impl LiveTransport for SimulatedTransport {
    async fn get(&self, path: &str) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("GET {}", path));

        if let Some(pos) = st.failing_gets.iter().position(|p| p == path) {
            st.failing_gets.remove(pos);
            return Err(live_error(
                503,
                "server_busy",
                "The service is too busy to handle the request.",
            ));
        }

        let (base, query) = split_query(path);
        match base {
            "me/skydrive" => {
                let root = st.node(SIM_ROOT_ID).ok_or_else(|| not_found(SIM_ROOT_ID))?;
                return Ok(st.render(root));
            }
            "me/skydrive/quota" => {
                let available = st.quota - st.used_bytes();
                return Ok(json!({ "quota": st.quota, "available": available })
                    .as_object()
                    .cloned()
                    .unwrap_or_default());
            }
            "me/skydrive/files" => return Self::list(&st, SIM_ROOT_ID, query),
            _ => {}
        }

        let (id, sub) = match base.split_once('/') {
            Some((id, sub)) => (id, Some(sub)),
            None => (base, None),
        };
        let node = st.node(id).ok_or_else(|| not_found(id))?;
        let body = match sub {
            None => st.render(node),
            Some("files") => return Self::list(&st, id, query),
            Some("shared_read_link") => json_map(json!({
                "link": format!("{}/redir?resid={}&authkey=!read", SIM_LINK_BASE, id)
            })),
            Some("shared_edit_link") => json_map(json!({
                "link": format!("{}/redir?resid={}&authkey=!edit", SIM_LINK_BASE, id)
            })),
            Some("embed") => json_map(json!({
                "embed_html": format!(
                    "<iframe src=\"{}/embed?resid={}\" width=\"98\" height=\"120\" frameborder=\"0\" scrolling=\"no\"></iframe>",
                    SIM_LINK_BASE, id
                )
            })),
            Some(other) => {
                return Err(live_error(
                    400,
                    "request_url_invalid",
                    &format!("The URL contains the path '{}', which isn't supported.", other),
                ))
            }
        };
        Ok(body)
    }

    async fn put(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("PUT {} {}", path, Value::Object(body.clone())));

        let node = st.node_mut(path).ok_or_else(|| not_found(path))?;
        if let Some(name) = body.get("name").and_then(Value::as_str) {
            node.name = name.to_string();
        }
        match body.get("description") {
            Some(Value::Null) => node.description = None,
            Some(Value::String(d)) => node.description = Some(d.clone()),
            _ => {}
        }
        let node = node.clone();
        Ok(st.render(&node))
    }

    async fn post(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("POST {} {}", path, Value::Object(body.clone())));

        let parent_id = if path == "me/skydrive" { SIM_ROOT_ID } else { path };
        let parent = st.node(parent_id).ok_or_else(|| not_found(parent_id))?;
        if !parent.is_container() {
            return Err(live_error(400, "request_method_invalid", "Only folders accept new items."));
        }
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| live_error(400, "request_body_invalid", "The 'name' field is required."))?
            .to_string();
        if st.sibling_named(parent_id, &name).is_some() {
            return Err(already_exists(&name));
        }

        let id = st.allocate_id("folder");
        let node = SimNode {
            id,
            item_type: "folder".into(),
            name,
            description: body.get("description").and_then(Value::as_str).map(String::from),
            parent_id: Some(parent_id.to_string()),
            created_time: live_timestamp(),
            content: None,
            raw: None,
        };
        let rendered = st.render(&node);
        st.nodes.push(node);
        Ok(rendered)
    }

    async fn delete(&self, path: &str) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("DELETE {}", path));

        if st.node(path).is_none() {
            return Err(not_found(path));
        }
        let doomed = st.descendants_of(path);
        st.nodes.retain(|n| !doomed.contains(&n.id));
        Ok(ResponseMap::new())
    }

    async fn move_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("MOVE {} -> {}", path, destination));

        let node = st.node(path).ok_or_else(|| not_found(path))?.clone();
        match st.node(destination) {
            Some(d) if d.is_container() => {}
            _ => return Err(not_found(destination)),
        }
        if st.sibling_named(destination, &node.name).is_some() {
            return Err(already_exists(&node.name));
        }
        let moved = st.node_mut(path).ok_or_else(|| not_found(path))?;
        moved.parent_id = Some(destination.to_string());
        let moved = moved.clone();
        Ok(st.render(&moved))
    }

    async fn copy_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("COPY {} -> {}", path, destination));

        let source = st.node(path).ok_or_else(|| not_found(path))?.clone();
        if source.is_container() {
            return Err(live_error(400, "request_method_invalid", "Folders can't be copied."));
        }
        match st.node(destination) {
            Some(d) if d.is_container() => {}
            _ => return Err(not_found(destination)),
        }
        if st.sibling_named(destination, &source.name).is_some() {
            return Err(already_exists(&source.name));
        }
        let id = st.allocate_id("file");
        let copy = SimNode {
            id,
            parent_id: Some(destination.to_string()),
            created_time: live_timestamp(),
            raw: None,
            ..source
        };
        let rendered = st.render(&copy);
        st.nodes.push(copy);
        Ok(rendered)
    }

    async fn upload(
        &self,
        parent_id: &str,
        file_name: &str,
        mut content: ContentStream,
        overwrite: OverwriteOption,
    ) -> SkyDriveResult<ResponseMap> {
        let mut data = Vec::new();
        content.read_to_end(&mut data).await?;
        drop(content);

        let mut st = self.state.lock().await;
        st.requests.push(format!(
            "UPLOAD {}/{} overwrite={}",
            parent_id, file_name, overwrite
        ));

        match st.node(parent_id) {
            Some(p) if p.is_container() => {}
            _ => return Err(not_found(parent_id)),
        }

        let existing = st.sibling_named(parent_id, file_name).map(|n| n.id.clone());
        let (id, name) = match (existing, overwrite) {
            (Some(_), OverwriteOption::DoNotOverwrite) => return Err(already_exists(file_name)),
            (Some(id), OverwriteOption::Overwrite) => {
                if let Some(node) = st.node_mut(&id) {
                    node.content = Some(data);
                }
                (id, file_name.to_string())
            }
            (Some(_), OverwriteOption::ChooseNewName) => {
                let (stem, ext) = match file_name.rsplit_once('.') {
                    Some((s, e)) => (s.to_string(), format!(".{}", e)),
                    None => (file_name.to_string(), String::new()),
                };
                let mut n = 1;
                let mut candidate = format!("{} ({}){}", stem, n, ext);
                while st.sibling_named(parent_id, &candidate).is_some() {
                    n += 1;
                    candidate = format!("{} ({}){}", stem, n, ext);
                }
                let id = st.allocate_id("file");
                st.nodes.push(new_file(&id, parent_id, &candidate, data));
                (id, candidate)
            }
            (None, _) => {
                let id = st.allocate_id("file");
                st.nodes.push(new_file(&id, parent_id, file_name, data));
                (id, file_name.to_string())
            }
        };

        // The service answers uploads with a partial item.
        Ok(json_map(json!({
            "id": id,
            "name": name,
            "source": format!("{}/content/{}", SIM_LINK_BASE, id),
        })))
    }

    async fn download(&self, path: &str) -> SkyDriveResult<DownloadResult> {
        let mut st = self.state.lock().await;
        st.requests.push(format!("DOWNLOAD {}", path));

        let id = path.strip_suffix("/content").unwrap_or(path);
        let node = st.node(id).ok_or_else(|| not_found(id))?;
        if node.is_container() {
            return Err(live_error(
                400,
                "request_url_invalid",
                "The URL contains the path 'content', which isn't supported for folders.",
            ));
        }
        Ok(match &node.content {
            Some(bytes) => DownloadResult {
                content_length: Some(bytes.len() as u64),
                content_type: Some(
                    mime_guess::from_path(&node.name)
                        .first_or_octet_stream()
                        .to_string(),
                ),
                stream: Some(Box::new(Cursor::new(bytes.clone())) as ContentStream),
            },
            None => DownloadResult::empty(),
        })
    }
}

fn new_file(id: &str, parent_id: &str, name: &str, data: Vec<u8>) -> SimNode {
    SimNode {
        id: id.to_string(),
        item_type: "file".into(),
        name: name.to_string(),
        description: None,
        parent_id: Some(parent_id.to_string()),
        created_time: live_timestamp(),
        content: Some(data),
        raw: None,
    }
}

fn json_map(v: Value) -> ResponseMap {
    v.as_object().cloned().unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skydrive::error::SkyDriveErrorCode;

    fn reader(bytes: &'static [u8]) -> ContentStream {
        Box::new(Cursor::new(bytes))
    }

    #[tokio::test]
    async fn test_root_and_listing_filter() {
        let t = SimulatedTransport::new();
        let docs = t.add_folder(t.root_id(), "Docs").await;
        t.add_file(t.root_id(), "a.txt", b"hello").await;

        let root = t.get("me/skydrive").await.unwrap();
        assert_eq!(root["id"], SIM_ROOT_ID);
        assert_eq!(root["count"], 2);

        let all = t.get("me/skydrive/files").await.unwrap();
        assert_eq!(all["data"].as_array().unwrap().len(), 2);

        let folders = t.get("me/skydrive/files?filter=folders").await.unwrap();
        let folders = folders["data"].as_array().unwrap();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0]["id"], Value::String(docs));
    }

    #[tokio::test]
    async fn test_upload_conflict_policy() {
        let t = SimulatedTransport::new();
        t.upload(t.root_id(), "a.txt", reader(b"one"), OverwriteOption::DoNotOverwrite)
            .await
            .unwrap();

        let err = t
            .upload(t.root_id(), "a.txt", reader(b"two"), OverwriteOption::DoNotOverwrite)
            .await
            .unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::Conflict);

        let renamed = t
            .upload(t.root_id(), "a.txt", reader(b"three"), OverwriteOption::ChooseNewName)
            .await
            .unwrap();
        assert_eq!(renamed["name"], "a (1).txt");
    }

    #[tokio::test]
    async fn test_put_null_description_clears() {
        let t = SimulatedTransport::new();
        let id = t.add_file(t.root_id(), "a.txt", b"x").await;

        let set = json_map(json!({ "description": "draft" }));
        let after = t.put(&id, &set).await.unwrap();
        assert_eq!(after["description"], "draft");

        let clear = json_map(json!({ "description": null }));
        let after = t.put(&id, &clear).await.unwrap();
        assert!(after["description"].is_null());
    }

    #[tokio::test]
    async fn test_delete_removes_subtree() {
        let t = SimulatedTransport::new();
        let docs = t.add_folder(t.root_id(), "Docs").await;
        let inner = t.add_file(&docs, "inner.txt", b"x").await;

        t.delete(&docs).await.unwrap();
        assert!(!t.contains(&inner).await);
        assert_eq!(t.get(&docs).await.unwrap_err().code, SkyDriveErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_request_log() {
        let t = SimulatedTransport::new();
        t.get("me/skydrive").await.unwrap();
        let _ = t.download("file.missing/content").await;
        assert_eq!(
            t.requests().await,
            vec!["GET me/skydrive".to_string(), "DOWNLOAD file.missing/content".to_string()]
        );
        t.clear_requests().await;
        assert!(t.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_a_file_is_invalid_request() {
        let t = SimulatedTransport::new();
        let id = t.add_file(t.root_id(), "a.txt", b"x").await;

        let err = t.get(&format!("{}/files", id)).await.unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::InvalidRequest);
        assert_eq!(err.status, Some(400));
    }

    #[tokio::test]
    async fn test_fail_next_get_fails_once() {
        let t = SimulatedTransport::new();
        t.fail_next_get("me/skydrive").await;

        let err = t.get("me/skydrive").await.unwrap_err();
        assert_eq!(err.code, SkyDriveErrorCode::InternalError);
        assert_eq!(err.status, Some(503));
        assert!(t.get("me/skydrive").await.is_ok());
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param(Some("filter=folders&x=1"), "filter"), Some("folders"));
        assert_eq!(query_param(Some("x=1"), "filter"), None);
        assert_eq!(query_param(None, "filter"), None);
    }
}
