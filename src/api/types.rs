use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Title the backend assigns when a session is created without one.
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// An authenticated identity as returned by `/login`.
///
/// The shape is owned by the backend; only `username` is guaranteed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    #[serde(default, alias = "user_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl User {
    /// First letter of the username, uppercased, for the sidebar avatar.
    pub fn initial(&self) -> char {
        self.username
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}

/// A conversation thread owned by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Session {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => DEFAULT_SESSION_TITLE,
        }
    }
}

/// Who authored a message. The backend stores assistant turns as `model`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "model" | "bot" | "assistant" => Role::Bot,
            _ => Role::User,
        }
    }
}

/// One turn of a session, either fetched from history or created locally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// A message created on this client, not yet known to the backend.
    pub fn local(role: Role, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: None,
        }
    }

    /// Timestamp formatted for display (`HH:MM`), if the backend sent one we can read.
    pub fn display_time(&self) -> Option<String> {
        let raw = self.timestamp.as_deref()?;
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .ok()
            .map(|dt| dt.format("%H:%M").to_string())
    }
}

/// SQLite row ids arrive as numbers, other backends may send strings.
fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Actions are logged, so the password must never reach a `{:?}`.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize, Debug)]
pub(crate) struct NewSession<'a> {
    pub title: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct UndoRequest<'a> {
    pub session_id: &'a str,
}

/// Body of `POST /chat`. Attachments are referenced by the storage paths
/// returned from earlier uploads, never sent inline.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub image: Option<String>,
    pub context_files: Vec<String>,
    pub session_id: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Result of `POST /undo`. The contract is backend-defined, so everything is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub deleted_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_accepts_user_id_alias() {
        let json = r#"{"message":"Login successful","username":"ada","user_id":"u-1"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_deref(), Some("u-1"));
        assert_eq!(user.username, "ada");
        assert_eq!(user.token, None);
    }

    #[test]
    fn test_register_response_parses_as_user_without_id() {
        let json = r#"{"message":"User created successfully","username":"ada"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, None);
    }

    /// The persisted identity record must not grow `null` fields.
    #[test]
    fn test_user_serialization_skips_missing_fields() {
        let user = User {
            id: None,
            username: "ada".to_string(),
            token: None,
        };
        assert_eq!(serde_json::to_string(&user).unwrap(), r#"{"username":"ada"}"#);
    }

    #[test]
    fn test_user_initial() {
        let user = User {
            id: None,
            username: "grace".to_string(),
            token: None,
        };
        assert_eq!(user.initial(), 'G');
    }

    #[test]
    fn test_role_normalizes_model_to_bot() {
        let msg: Message =
            serde_json::from_str(r#"{"id":7,"role":"model","content":"hi","timestamp":"2024-05-01 10:00:00"}"#)
                .unwrap();
        assert_eq!(msg.role, Role::Bot);
        assert_eq!(msg.id, "7");
    }

    #[test]
    fn test_unknown_role_is_user() {
        let msg: Message = serde_json::from_str(r#"{"id":"a","role":"user","content":"x"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
        let msg: Message = serde_json::from_str(r#"{"id":"b","role":"system","content":"x"}"#).unwrap();
        assert_eq!(msg.role, Role::User);
    }

    #[test]
    fn test_display_time_parses_sqlite_timestamp() {
        let msg: Message =
            serde_json::from_str(r#"{"id":1,"role":"user","content":"x","timestamp":"2024-05-01 09:41:12"}"#)
                .unwrap();
        assert_eq!(msg.display_time().as_deref(), Some("09:41"));
    }

    #[test]
    fn test_display_time_ignores_garbage() {
        let mut msg = Message::local(Role::User, "x".to_string());
        assert_eq!(msg.display_time(), None);
        msg.timestamp = Some("yesterday".to_string());
        assert_eq!(msg.display_time(), None);
    }

    #[test]
    fn test_session_display_title_fallback() {
        let session = Session {
            id: "s".to_string(),
            title: None,
            created_at: None,
        };
        assert_eq!(session.display_title(), "New Chat");
    }

    /// Contract test: `image` is sent as `null` when no image was uploaded.
    #[test]
    fn test_chat_request_serialization() {
        let req = ChatRequest {
            message: "hello".to_string(),
            image: None,
            context_files: vec!["/srv/uploads/a.pdf".to_string()],
            session_id: "s-1".to_string(),
        };
        let serialized = serde_json::to_string(&req).unwrap();
        let expected = r#"{"message":"hello","image":null,"context_files":["/srv/uploads/a.pdf"],"session_id":"s-1"}"#;
        assert_eq!(serialized, expected);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "ada".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{creds:?}");
        assert!(debug.contains("ada"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_local_messages_get_unique_ids() {
        let a = Message::local(Role::User, "a".to_string());
        let b = Message::local(Role::User, "a".to_string());
        assert_ne!(a.id, b.id);
    }
}
