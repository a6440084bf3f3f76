use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use super::types::{ChatReply, ChatRequest, Credentials, Message, Session, UndoOutcome, UploadedFile, User};

/// Errors that can occur while talking to the chat backend.
/// Nothing is retried, so variants only exist to tell the caller what to show.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Transport-level failure (DNS, connection refused, broken body).
    Network(String),
    /// The backend answered with a non-success status.
    Api {
        status: u16,
        message: String,
        /// Structured `detail` field from the error body, when present.
        detail: Option<String>,
    },
    /// The response body did not have the expected shape.
    Parse(String),
    /// A local attachment could not be read.
    Io(String),
}

impl ApiError {
    /// The backend's structured error detail, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api {
                status,
                message,
                detail,
            } => match detail {
                Some(detail) => write!(f, "API error (HTTP {status}): {detail}"),
                None => write!(f, "API error (HTTP {status}): {message}"),
            },
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
            ApiError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// The remote chat service. One method per HTTP call; each is a single
/// request/response with no retries and no caching.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError>;

    async fn create_session(&self, title: &str) -> Result<Session, ApiError>;

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError>;

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError>;

    /// Stores a local file on the backend and returns the storage path
    /// that later chat requests reference.
    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, ApiError>;

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError>;

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError>;

    /// Removes the last turn of a session. No view calls this yet; the
    /// backend still has to provide the endpoint.
    async fn undo_last_message(&self, session_id: &str) -> Result<UndoOutcome, ApiError>;

    /// Fetches raw bytes, used to save generated images.
    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_only_for_api_errors() {
        let err = ApiError::Api {
            status: 401,
            message: "{\"detail\":\"Invalid credentials\"}".to_string(),
            detail: Some("Invalid credentials".to_string()),
        };
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(ApiError::Network("refused".to_string()).detail(), None);
    }

    #[test]
    fn test_display_prefers_detail() {
        let err = ApiError::Api {
            status: 400,
            message: "raw body".to_string(),
            detail: Some("Username already exists".to_string()),
        };
        assert_eq!(err.to_string(), "API error (HTTP 400): Username already exists");

        let err = ApiError::Api {
            status: 500,
            message: "Internal Server Error".to_string(),
            detail: None,
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): Internal Server Error");
    }
}
