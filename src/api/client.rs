//! HTTP implementation of [`ChatBackend`] on top of `reqwest`.

use std::path::Path;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::backend::{ApiError, ChatBackend};
use super::types::{
    ChatReply, ChatRequest, Credentials, Message, NewSession, Session, UndoOutcome, UndoRequest,
    UploadedFile, User,
};

/// Client for the chat backend. The base URL is fixed at construction.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `base_url` - Root of the backend, e.g. `http://localhost:8000`. A trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Resolves a link from a bot reply. Absolute URLs pass through, rooted
    /// paths are joined onto the base URL.
    fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            self.url(url)
        } else {
            url.to_string()
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(check_status(response).await?).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(check_status(response).await?).await
    }
}

/// Turns a non-success response into `ApiError::Api`, keeping the raw body
/// and the structured `detail` when the body carries one.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    debug!("Backend response status: {}", status);
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    warn!("Backend error: {} - {}", status.as_u16(), body);
    Err(ApiError::Api {
        status: status.as_u16(),
        detail: extract_detail(&body),
        message: body,
    })
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
}

/// Pulls the human-readable part out of a FastAPI error body.
///
/// `detail` is either a plain string or a list of validation errors,
/// each with a `msg` field.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(detail) => Some(detail.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            (!msgs.is_empty()).then(|| msgs.join("; "))
        }
        _ => None,
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.get_json("/sessions").await
    }

    async fn create_session(&self, title: &str) -> Result<Session, ApiError> {
        info!("Creating session with title {:?}", title);
        self.post_json("/sessions", &NewSession { title }).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        info!("Deleting session {}", session_id);
        let response = self
            .client
            .delete(self.url(&format!("/sessions/{session_id}")))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        self.get_json(&format!("/sessions/{session_id}/messages"))
            .await
    }

    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(format!("{}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let response = self
            .client
            .post(self.url("/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(check_status(response).await?).await
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        info!(
            "Sending chat: session={}, image={}, context_files={}",
            request.session_id,
            request.image.is_some(),
            request.context_files.len()
        );
        self.post_json("/chat", request).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        info!("Logging in as {}", credentials.username);
        self.post_json("/login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        info!("Registering {}", credentials.username);
        self.post_json("/register", credentials).await
    }

    async fn undo_last_message(&self, session_id: &str) -> Result<UndoOutcome, ApiError> {
        self.post_json("/undo", &UndoRequest { session_id }).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.resolve(url))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        let body = r#"{"detail":"Invalid credentials"}"#;
        assert_eq!(extract_detail(body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_extract_detail_validation_list() {
        let body = r#"{"detail":[{"loc":["body","username"],"msg":"field required"},{"loc":["body","password"],"msg":"field required"}]}"#;
        assert_eq!(
            extract_detail(body).as_deref(),
            Some("field required; field required")
        );
    }

    #[test]
    fn test_extract_detail_absent() {
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"error":"nope"}"#), None);
        assert_eq!(extract_detail(r#"{"detail":[]}"#), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/");
        assert_eq!(client.url("/sessions"), "http://localhost:8000/sessions");
    }

    #[test]
    fn test_resolve_rooted_and_absolute_urls() {
        let client = ApiClient::new("http://localhost:8000");
        assert_eq!(
            client.resolve("/images/cat.png"),
            "http://localhost:8000/images/cat.png"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/cat.png"),
            "https://cdn.example.com/cat.png"
        );
    }
}
