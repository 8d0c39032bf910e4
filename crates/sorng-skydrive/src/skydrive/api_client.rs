//! HTTP client for the Live Connect REST API.
//!
//! Wraps `reqwest::Client` with Bearer-token injection and JSON body
//! decoding.  One call is one request: failures surface immediately and
//! nothing is retried.

use crate::skydrive::error::{SkyDriveError, SkyDriveResult};
use crate::skydrive::transport::LiveTransport;
use crate::skydrive::types::{
    ContentStream, DownloadResult, OverwriteOption, ResponseMap, SkyDriveConfig,
};
use futures_util::TryStreamExt;
use log::debug;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use std::sync::RwLock;
use std::time::Duration;
use tokio_util::io::{ReaderStream, StreamReader};

/// Characters left alone when a file name becomes a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Low-level Live Connect HTTP client.
#[derive(Debug)]
pub struct LiveConnectClient {
    inner: reqwest::Client,
    base_url: String,
    access_token: RwLock<String>,
}

impl LiveConnectClient {
    /// Create a new client.
    pub fn new(config: &SkyDriveConfig, access_token: &str) -> SkyDriveResult<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| SkyDriveError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            inner,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(access_token.to_string()),
        })
    }

    /// Update the access token (after a refresh).
    pub fn set_access_token(&self, token: &str) {
        match self.access_token.write() {
            Ok(mut guard) => *guard = token.to_string(),
            Err(poisoned) => *poisoned.into_inner() = token.to_string(),
        }
    }

    fn token(&self) -> String {
        match self.access_token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    /// URL of the upload endpoint for `file_name` inside `parent_id`.
    pub fn upload_url(&self, parent_id: &str, file_name: &str, overwrite: OverwriteOption) -> String {
        format!(
            "{}/files/{}?overwrite={}",
            self.url(parent_id),
            utf8_percent_encode(file_name, SEGMENT),
            overwrite.as_query_value()
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        self.inner.request(method, &url).bearer_auth(self.token())
    }

    async fn send_json(&self, req: RequestBuilder) -> SkyDriveResult<ResponseMap> {
        let resp = req.send().await.map_err(SkyDriveError::from)?;
        Self::handle_response(resp).await
    }

    async fn handle_response(resp: reqwest::Response) -> SkyDriveResult<ResponseMap> {
        let status = resp.status().as_u16();

        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            debug!("Response status={} body_len={}", status, body.len());
            return Err(SkyDriveError::from_live_response(status, &body));
        }

        let body = resp.text().await.map_err(SkyDriveError::from)?;
        debug!("Response status={} body_len={}", status, body.len());
        Self::decode_body(&body)
    }

    /// Empty and non-object bodies decode to an empty mapping.
    fn decode_body(body: &str) -> SkyDriveResult<ResponseMap> {
        if body.trim().is_empty() {
            return Ok(ResponseMap::new());
        }
        let v: serde_json::Value = serde_json::from_str(body)?;
        Ok(match v {
            serde_json::Value::Object(map) => map,
            _ => ResponseMap::new(),
        })
    }

    fn custom_method(name: &str) -> SkyDriveResult<Method> {
        Method::from_bytes(name.as_bytes())
            .map_err(|e| SkyDriveError::internal(format!("Invalid HTTP method {}: {}", name, e)))
    }

    fn destination_body(destination: &str) -> serde_json::Value {
        serde_json::json!({ "destination": destination })
    }
}

#[async_trait::async_trait]
impl LiveTransport for LiveConnectClient {
    async fn get(&self, path: &str) -> SkyDriveResult<ResponseMap> {
        self.send_json(self.request(Method::GET, path)).await
    }

    async fn put(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap> {
        self.send_json(self.request(Method::PUT, path).json(body)).await
    }

    async fn post(&self, path: &str, body: &ResponseMap) -> SkyDriveResult<ResponseMap> {
        self.send_json(self.request(Method::POST, path).json(body)).await
    }

    async fn delete(&self, path: &str) -> SkyDriveResult<ResponseMap> {
        self.send_json(self.request(Method::DELETE, path)).await
    }

    async fn move_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap> {
        let req = self
            .request(Self::custom_method("MOVE")?, path)
            .json(&Self::destination_body(destination));
        self.send_json(req).await
    }

    async fn copy_item(&self, path: &str, destination: &str) -> SkyDriveResult<ResponseMap> {
        let req = self
            .request(Self::custom_method("COPY")?, path)
            .json(&Self::destination_body(destination));
        self.send_json(req).await
    }

    async fn upload(
        &self,
        parent_id: &str,
        file_name: &str,
        content: ContentStream,
        overwrite: OverwriteOption,
    ) -> SkyDriveResult<ResponseMap> {
        let url = self.upload_url(parent_id, file_name, overwrite);
        let mime = mime_guess::from_path(file_name).first_or_octet_stream();
        debug!("PUT (stream) {} [{}]", url, mime);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(content));
        let req = self
            .inner
            .put(&url)
            .bearer_auth(self.token())
            .header(CONTENT_TYPE, mime.as_ref())
            .body(body);
        self.send_json(req).await
    }

    async fn download(&self, path: &str) -> SkyDriveResult<DownloadResult> {
        let resp = self
            .request(Method::GET, path)
            .send()
            .await
            .map_err(SkyDriveError::from)?;

        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(SkyDriveError::from_live_response(status, &body));
        }

        let content_length = resp.content_length();
        if status == 204 || content_length == Some(0) {
            debug!("No content at {}", path);
            return Ok(DownloadResult::empty());
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let stream = resp.bytes_stream().map_err(std::io::Error::other);
        let reader = StreamReader::new(Box::pin(stream));

        Ok(DownloadResult {
            stream: Some(Box::new(reader)),
            content_length,
            content_type,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
