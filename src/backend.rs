use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;

use crate::config::StudioConfig;
use crate::error::{RemoteProtocolError, ShareError};
use crate::types::GeneratedImage;

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Body of the create-session call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub prompt: String,
    pub model_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Remote operations of the edit backend.
///
/// Each call is a single request; sequencing and failure policy live in
/// [`crate::GenerationClient`] and [`crate::ShareGateway`].
pub trait EditBackend: Send + Sync + 'static {
    /// Create a server-side session. Returns the server-assigned id.
    fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> impl Future<Output = Result<String, RemoteProtocolError>> + Send;

    /// Register source image urls with a server-side session.
    fn attach_source_images(
        &self,
        session_id: &str,
        urls: &[String],
    ) -> impl Future<Output = Result<(), RemoteProtocolError>> + Send;

    /// Ask the backend to produce `num_images` images for the session.
    fn generate_images(
        &self,
        session_id: &str,
        num_images: u32,
    ) -> impl Future<Output = Result<Vec<GeneratedImage>, RemoteProtocolError>> + Send;

    /// Publish a generated image to the public gallery by its id.
    fn share_image(&self, image_id: &str) -> impl Future<Output = Result<(), ShareError>> + Send;
}

/// reqwest-backed [`EditBackend`] speaking the `/api/edit-sessions` JSON API.
///
/// # Example
/// ```no_run
/// use edit_session::HttpBackend;
///
/// # async fn example() -> Result<(), edit_session::RemoteProtocolError> {
/// let backend = HttpBackend::new("http://localhost:5000");
/// let online = backend.health().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a backend client pointing at the given base URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: normalize(endpoint.into()),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(config.endpoint.clone()).with_timeout(config.request_timeout)
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    // ── Health ──────────────────────────────────────────────────────

    /// Check whether the backend root answers within the request timeout.
    pub async fn health(&self) -> Result<bool, RemoteProtocolError> {
        let url = format!("{}/", self.endpoint);
        let resp = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        Ok(resp.status().is_success())
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, RemoteProtocolError> {
        let url = format!("{}{}", self.endpoint, path);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;

        let resp = ensure_success(resp).await?;
        let bytes = resp.bytes().await.map_err(|e| RemoteProtocolError::Network {
            context: format!("Failed to read response from {}", path),
            source: e,
        })?;
        parse_body(path, &bytes)
    }

    fn unreachable(&self, source: reqwest::Error) -> RemoteProtocolError {
        RemoteProtocolError::Network {
            context: format!(
                "Cannot connect to edit backend at {}: is the service running?",
                self.endpoint
            ),
            source,
        }
    }
}

async fn ensure_success(resp: Response) -> Result<Response, RemoteProtocolError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(RemoteProtocolError::Http { status, body })
}

/// Decode a 2xx body. A body that is not JSON is a malformed answer, not a
/// transport failure.
pub(crate) fn parse_body(path: &str, bytes: &[u8]) -> Result<Value, RemoteProtocolError> {
    serde_json::from_slice(bytes).map_err(|e| {
        RemoteProtocolError::InvalidResponse(format!("Response from {} is not JSON: {}", path, e))
    })
}

/// Read the server-assigned id from a create-session response.
pub(crate) fn parse_session_id(json: &Value) -> Result<String, RemoteProtocolError> {
    match json.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(RemoteProtocolError::InvalidResponse(
            "Create-session response missing id".into(),
        )),
    }
}

/// Collect `{id, url}` entries from a generate response, skipping malformed
/// ones and entries with a blank url.
pub(crate) fn parse_generated_images(json: &Value) -> Vec<GeneratedImage> {
    json.get("images")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|img| {
                    let id = match img.get("id")? {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        _ => return None,
                    };
                    let url = img.get("url")?.as_str()?.trim();
                    if url.is_empty() {
                        return None;
                    }
                    Some(GeneratedImage {
                        id,
                        url: url.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

impl EditBackend for HttpBackend {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<String, RemoteProtocolError> {
        let body = serde_json::to_value(request)?;
        let json = self.post_json("/api/edit-sessions", &body).await?;
        parse_session_id(&json)
    }

    async fn attach_source_images(
        &self,
        session_id: &str,
        urls: &[String],
    ) -> Result<(), RemoteProtocolError> {
        let url = format!("{}/api/edit-sessions/{}/source-images", self.endpoint, session_id);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&json!({ "urls": urls }))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn generate_images(
        &self,
        session_id: &str,
        num_images: u32,
    ) -> Result<Vec<GeneratedImage>, RemoteProtocolError> {
        let path = format!("/api/edit-sessions/{}/generate", session_id);
        let json = self
            .post_json(&path, &json!({ "numImages": num_images }))
            .await?;
        Ok(parse_generated_images(&json))
    }

    async fn share_image(&self, image_id: &str) -> Result<(), ShareError> {
        let url = format!("{}/api/images/{}/share", self.endpoint, image_id);
        let resp = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ShareError::Network {
                context: format!("Failed to reach {} to share image {}", self.endpoint, image_id),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ShareError::PublishRejected { status, body });
        }
        Ok(())
    }
}
