//! # Application State
//!
//! Core business state for Callisto. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── user: Option<User>                 // None = show the login form
//! ├── auth: AuthForm                     // login form mode / error / in-flight
//! ├── sessions: SessionList              // sidebar mirror of the backend list
//! ├── current_session_id: Option<String> // None = welcome screen
//! ├── refresh: u64                       // bumped on every select/create
//! ├── chat: Option<ChatPanel>            // mounted panel for the current session
//! ├── pending_delete: Option<String>     // session awaiting confirmation
//! ├── status_message: String             // status bar text
//! └── new_chat_title: String             // title for created sessions
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use crate::api::User;
use crate::core::auth::AuthForm;
use crate::core::chat::ChatPanel;
use crate::core::sessions::SessionList;

pub struct App {
    pub user: Option<User>,
    pub auth: AuthForm,
    pub sessions: SessionList,
    pub current_session_id: Option<String>,
    /// Monotonic counter used only to tell panel instances apart.
    pub refresh: u64,
    pub chat: Option<ChatPanel>,
    pub pending_delete: Option<String>,
    pub status_message: String,
    pub new_chat_title: String,
}

impl App {
    pub fn new(new_chat_title: String) -> Self {
        Self {
            user: None,
            auth: AuthForm::new(),
            sessions: SessionList::new(),
            current_session_id: None,
            refresh: 0,
            chat: None,
            pending_delete: None,
            status_message: String::new(),
            new_chat_title,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Mounts a fresh panel for `session_id`, discarding the old one and
    /// anything still in flight for it. Returns the new instance number.
    pub(crate) fn mount_panel(&mut self, session_id: String) -> u64 {
        self.refresh += 1;
        self.current_session_id = Some(session_id.clone());
        self.chat = Some(ChatPanel::new(session_id, self.refresh));
        self.refresh
    }

    pub(crate) fn unmount_panel(&mut self) {
        self.current_session_id = None;
        self.chat = None;
    }

    /// The mounted panel, if it is still the instance a result was started for.
    pub(crate) fn panel_for(&mut self, instance: u64) -> Option<&mut ChatPanel> {
        self.chat.as_mut().filter(|panel| panel.instance == instance)
    }

    /// Title of the session awaiting delete confirmation.
    pub fn pending_delete_title(&self) -> Option<&str> {
        let id = self.pending_delete.as_deref()?;
        Some(
            self.sessions
                .get(id)
                .map(|s| s.display_title())
                .unwrap_or(id),
        )
    }
}
