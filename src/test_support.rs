//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    ApiError, ChatBackend, ChatReply, ChatRequest, Credentials, Message, Session, UndoOutcome,
    UploadedFile, User,
};

/// One recorded call against [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ListSessions,
    CreateSession(String),
    DeleteSession(String),
    GetMessages(String),
    Upload(PathBuf),
    Chat(ChatRequest),
    Login(String),
    Register(String),
    Undo(String),
    Download(String),
}

/// In-memory backend that records every call and answers from a script.
/// Everything succeeds unless a `fail_*` builder said otherwise.
#[derive(Default)]
pub struct ScriptedBackend {
    calls: Mutex<Vec<BackendCall>>,
    sessions: Vec<Session>,
    history: HashMap<String, Vec<Message>>,
    reply: String,
    failing_uploads: HashSet<PathBuf>,
    register_error: Option<String>,
    login_error: Option<String>,
    chat_fails: bool,
}

fn api_error(status: u16, detail: &str) -> ApiError {
    ApiError::Api {
        status,
        message: format!("{{\"detail\":\"{detail}\"}}"),
        detail: Some(detail.to_string()),
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            reply: "Hello from the bot".to_string(),
            ..Default::default()
        }
    }

    pub fn with_sessions(mut self, sessions: Vec<Session>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_history(mut self, session_id: &str, messages: Vec<Message>) -> Self {
        self.history.insert(session_id.to_string(), messages);
        self
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    pub fn fail_upload(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_uploads.insert(path.into());
        self
    }

    pub fn fail_chat(mut self) -> Self {
        self.chat_fails = true;
        self
    }

    pub fn fail_register(mut self, detail: &str) -> Self {
        self.register_error = Some(detail.to_string());
        self
    }

    pub fn fail_login(mut self, detail: &str) -> Self {
        self.login_error = Some(detail.to_string());
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn list_sessions(&self) -> Result<Vec<Session>, ApiError> {
        self.record(BackendCall::ListSessions);
        Ok(self.sessions.clone())
    }

    async fn create_session(&self, title: &str) -> Result<Session, ApiError> {
        self.record(BackendCall::CreateSession(title.to_string()));
        Ok(Session {
            id: format!("session-{}", self.calls().len()),
            title: Some(title.to_string()),
            created_at: None,
        })
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ApiError> {
        self.record(BackendCall::DeleteSession(session_id.to_string()));
        Ok(())
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, ApiError> {
        self.record(BackendCall::GetMessages(session_id.to_string()));
        Ok(self.history.get(session_id).cloned().unwrap_or_default())
    }

    async fn upload_file(&self, path: &Path) -> Result<UploadedFile, ApiError> {
        self.record(BackendCall::Upload(path.to_path_buf()));
        if self.failing_uploads.contains(path) {
            return Err(ApiError::Network("upload refused".to_string()));
        }
        let name = crate::core::attachments::display_name(path);
        Ok(UploadedFile {
            path: format!("/srv/uploads/{name}"),
            filename: Some(name),
        })
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.record(BackendCall::Chat(request.clone()));
        if self.chat_fails {
            return Err(api_error(500, "model offline"));
        }
        Ok(ChatReply {
            response: self.reply.clone(),
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.record(BackendCall::Login(credentials.username.clone()));
        match &self.login_error {
            Some(detail) => Err(api_error(401, detail)),
            None => Ok(User {
                id: Some("user-1".to_string()),
                username: credentials.username.clone(),
                token: None,
            }),
        }
    }

    async fn register(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.record(BackendCall::Register(credentials.username.clone()));
        match &self.register_error {
            Some(detail) => Err(api_error(400, detail)),
            None => Ok(User {
                id: None,
                username: credentials.username.clone(),
                token: None,
            }),
        }
    }

    async fn undo_last_message(&self, session_id: &str) -> Result<UndoOutcome, ApiError> {
        self.record(BackendCall::Undo(session_id.to_string()));
        Ok(UndoOutcome::default())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        self.record(BackendCall::Download(url.to_string()));
        Ok(b"\x89PNG".to_vec())
    }
}

pub fn test_user() -> User {
    User {
        id: Some("user-1".to_string()),
        username: "ada".to_string(),
        token: None,
    }
}

pub fn test_session(id: &str, title: &str) -> Session {
    Session {
        id: id.to_string(),
        title: Some(title.to_string()),
        created_at: None,
    }
}

/// Creates a signed-in test App with two sessions and none open.
pub fn test_app() -> crate::core::state::App {
    let mut app = crate::core::state::App::new("New Chat".to_string());
    app.user = Some(test_user());
    app.sessions.replace(vec![
        test_session("s-1", "Rust tips"),
        test_session("s-2", "Holiday plans"),
    ]);
    app
}
