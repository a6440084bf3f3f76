//! # Actions
//!
//! Everything that can happen in Callisto becomes an `Action`.
//! User presses Enter in the chat box? That's `Action::SubmitMessage`.
//! Backend answers? That's `Action::SendFinished(report)`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O that should follow.
//! No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                               │
//!                          tui runs it on a task ┘
//!                                               │
//!                   result comes back as Action ┘
//! ```
//!
//! This makes everything testable: feed actions, assert on state and effects.
//! And debuggable: every action is logged before it is applied.

use std::path::PathBuf;

use log::{debug, error, info, warn};

use crate::api::{ApiError, Credentials, Message, Session, User};
use crate::core::auth::AuthRequest;
use crate::core::chat::{SendJob, SendReport};
use crate::core::state::App;

#[derive(Debug)]
pub enum Action {
    // Authentication
    ToggleAuthMode,
    SubmitCredentials(Credentials),
    AuthFinished(Result<User, ApiError>),
    /// Identity found on disk at startup.
    IdentityRestored(User),
    Logout,

    // Session list
    RefreshSessions,
    SessionsLoaded(Vec<Session>),
    NewChat,
    SessionCreated(Session),
    SelectSession(String),
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,
    SessionDeleted(String),
    /// A background call whose only failure policy is "log it".
    RequestFailed { context: String, error: ApiError },

    // Chat panel
    HistoryLoaded { instance: u64, messages: Vec<Message> },
    SubmitMessage(String),
    SendFinished(SendReport),
    ToggleImageMode,
    AttachImage(PathBuf),
    AttachDocuments(Vec<PathBuf>),

    // Image preview
    OpenImagePreview,
    StepImage(isize),
    CloseImagePreview,
    DownloadImage,
    ImageSaved(Result<PathBuf, String>),

    Quit,
}

/// I/O requested by `update()`. The adapter runs it and reports back with an `Action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Authenticate(AuthRequest),
    /// Write the identity record, then fetch the session list.
    PersistIdentity(User),
    FetchSessions,
    ClearIdentity,
    CreateSession(String),
    FetchHistory { session_id: String, instance: u64 },
    DeleteSession(String),
    Send(SendJob),
    /// A send settled for the mounted panel; the adapter resets its pickers.
    SendSettled,
    DownloadImage(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::ToggleAuthMode => {
            app.auth.toggle_mode();
            Effect::None
        }
        Action::SubmitCredentials(credentials) => {
            match app.auth.begin(credentials.username, credentials.password) {
                Some(request) => {
                    app.status_message = "Authenticating...".to_string();
                    Effect::Authenticate(request)
                }
                None => Effect::None,
            }
        }
        Action::AuthFinished(result) => {
            app.auth.finish(&result);
            match result {
                Ok(user) => {
                    info!("Signed in as {}", user.username);
                    app.status_message = format!("Signed in as {}", user.username);
                    app.user = Some(user.clone());
                    Effect::PersistIdentity(user)
                }
                Err(_) => {
                    app.status_message.clear();
                    Effect::None
                }
            }
        }
        Action::IdentityRestored(user) => {
            info!("Restored identity for {}", user.username);
            app.user = Some(user);
            Effect::FetchSessions
        }
        Action::Logout => {
            if let Some(user) = app.user.take() {
                info!("Signing out {}", user.username);
            }
            app.sessions.clear();
            app.unmount_panel();
            app.pending_delete = None;
            app.auth = Default::default();
            app.status_message = "Signed out".to_string();
            Effect::ClearIdentity
        }

        Action::RefreshSessions => {
            if app.is_authenticated() {
                Effect::FetchSessions
            } else {
                Effect::None
            }
        }
        Action::SessionsLoaded(sessions) => {
            if !app.is_authenticated() {
                debug!("Discarding {} sessions loaded after sign-out", sessions.len());
                return Effect::None;
            }
            info!("Loaded {} sessions", sessions.len());
            app.sessions.replace(sessions);
            Effect::None
        }
        Action::NewChat => {
            if !app.is_authenticated() {
                return Effect::None;
            }
            Effect::CreateSession(app.new_chat_title.clone())
        }
        Action::SessionCreated(session) => {
            if !app.is_authenticated() {
                debug!("Discarding session {} created after sign-out", session.id);
                return Effect::None;
            }
            info!("Created session {}", session.id);
            let id = session.id.clone();
            app.sessions.prepend(session);
            let instance = app.mount_panel(id.clone());
            Effect::FetchHistory {
                session_id: id,
                instance,
            }
        }
        Action::SelectSession(id) => {
            if app.sessions.get(&id).is_none() {
                warn!("Ignoring selection of unknown session {}", id);
                return Effect::None;
            }
            let instance = app.mount_panel(id.clone());
            Effect::FetchHistory {
                session_id: id,
                instance,
            }
        }
        Action::RequestDelete(id) => {
            app.pending_delete = Some(id);
            Effect::None
        }
        Action::ConfirmDelete => match app.pending_delete.take() {
            Some(id) => Effect::DeleteSession(id),
            None => Effect::None,
        },
        Action::CancelDelete => {
            app.pending_delete = None;
            Effect::None
        }
        Action::SessionDeleted(id) => {
            info!("Deleted session {}", id);
            app.sessions.remove(&id);
            if app.current_session_id.as_deref() == Some(id.as_str()) {
                app.unmount_panel();
            }
            Effect::None
        }
        Action::RequestFailed { context, error } => {
            error!("{}: {}", context, error);
            Effect::None
        }

        Action::HistoryLoaded { instance, messages } => {
            match app.panel_for(instance) {
                Some(panel) => {
                    debug!("History loaded: {} messages", messages.len());
                    panel.load_history(messages);
                }
                None => debug!("Discarding history for unmounted panel {}", instance),
            }
            Effect::None
        }
        Action::SubmitMessage(text) => {
            let Some(panel) = app.chat.as_mut() else {
                return Effect::None;
            };
            match panel.begin_send(&text) {
                Some(job) => Effect::Send(job),
                None => Effect::None,
            }
        }
        Action::SendFinished(report) => {
            let instance = report.instance;
            let failed = report.failed_uploads.len();
            let Some(panel) = app.panel_for(instance) else {
                debug!("Discarding reply for unmounted panel {}", instance);
                return Effect::None;
            };
            panel.finish_send(report);
            if failed > 0 {
                app.status_message = format!("{failed} attachment(s) could not be uploaded");
            }
            Effect::SendSettled
        }
        Action::ToggleImageMode => {
            if let Some(panel) = app.chat.as_mut() {
                panel.toggle_image_mode();
                app.status_message = if panel.image_mode {
                    "Image generation on".to_string()
                } else {
                    "Image generation off".to_string()
                };
            }
            Effect::None
        }
        Action::AttachImage(path) => {
            if let Some(panel) = app.chat.as_mut() {
                panel.attach_image(path);
            }
            Effect::None
        }
        Action::AttachDocuments(paths) => {
            if let Some(panel) = app.chat.as_mut() {
                panel.attach_documents(paths);
            }
            Effect::None
        }

        Action::OpenImagePreview => {
            if let Some(panel) = app.chat.as_mut()
                && !panel.open_latest_image()
            {
                app.status_message = "No images in this chat".to_string();
            }
            Effect::None
        }
        Action::StepImage(step) => {
            if let Some(panel) = app.chat.as_mut() {
                panel.step_image(step);
            }
            Effect::None
        }
        Action::CloseImagePreview => {
            if let Some(panel) = app.chat.as_mut() {
                panel.close_image();
            }
            Effect::None
        }
        Action::DownloadImage => match app.chat.as_ref().and_then(|p| p.current_image()) {
            Some(image) => {
                app.status_message = "Downloading image...".to_string();
                Effect::DownloadImage(image.url)
            }
            None => Effect::None,
        },
        Action::ImageSaved(result) => {
            app.status_message = match result {
                Ok(path) => format!("Saved {}", path.display()),
                Err(e) => {
                    error!("Image download failed: {}", e);
                    "Download failed".to_string()
                }
            };
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatRequest, Role};
    use crate::core::chat::SEND_ERROR_TEXT;
    use crate::test_support::{test_app, test_session, test_user};

    fn report(instance: u64, reply: Result<String, ApiError>) -> SendReport {
        SendReport {
            instance,
            request: ChatRequest {
                message: "hi".to_string(),
                image: None,
                context_files: vec![],
                session_id: "s-1".to_string(),
            },
            failed_uploads: vec![],
            reply,
        }
    }

    fn open(app: &mut App, id: &str) -> u64 {
        match update(app, Action::SelectSession(id.to_string())) {
            Effect::FetchHistory { instance, .. } => instance,
            other => panic!("expected FetchHistory, got {other:?}"),
        }
    }

    #[test]
    fn test_quit_action() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_submit_credentials_authenticates_once() {
        let mut app = App::new("New Chat".to_string());
        let creds = Credentials {
            username: "ada".to_string(),
            password: "pw".to_string(),
        };
        let effect = update(&mut app, Action::SubmitCredentials(creds.clone()));
        assert!(matches!(effect, Effect::Authenticate(_)));
        assert_eq!(update(&mut app, Action::SubmitCredentials(creds)), Effect::None);
    }

    #[test]
    fn test_auth_success_persists_identity() {
        let mut app = App::new("New Chat".to_string());
        app.auth.in_flight = true;
        let effect = update(&mut app, Action::AuthFinished(Ok(test_user())));
        assert_eq!(effect, Effect::PersistIdentity(test_user()));
        assert_eq!(app.user, Some(test_user()));
        assert!(!app.auth.in_flight);
    }

    #[test]
    fn test_auth_failure_shows_detail() {
        let mut app = App::new("New Chat".to_string());
        let effect = update(
            &mut app,
            Action::AuthFinished(Err(ApiError::Api {
                status: 401,
                message: String::new(),
                detail: Some("Invalid credentials".to_string()),
            })),
        );
        assert_eq!(effect, Effect::None);
        assert!(app.user.is_none());
        assert_eq!(app.auth.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_restored_identity_fetches_sessions() {
        let mut app = App::new("New Chat".to_string());
        assert_eq!(
            update(&mut app, Action::IdentityRestored(test_user())),
            Effect::FetchSessions
        );
        assert!(app.is_authenticated());
    }

    #[test]
    fn test_sessions_loaded_replaces_list() {
        let mut app = test_app();
        update(
            &mut app,
            Action::SessionsLoaded(vec![test_session("s-9", "Only one")]),
        );
        assert_eq!(app.sessions.len(), 1);
        assert!(app.sessions.get("s-1").is_none());
    }

    #[test]
    fn test_new_chat_uses_configured_title() {
        let mut app = test_app();
        app.new_chat_title = "Untitled".to_string();
        assert_eq!(
            update(&mut app, Action::NewChat),
            Effect::CreateSession("Untitled".to_string())
        );
    }

    #[test]
    fn test_created_session_is_first_and_current() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::SessionCreated(test_session("s-new", "New Chat")),
        );
        assert_eq!(app.sessions.all()[0].id, "s-new");
        assert_eq!(app.current_session_id.as_deref(), Some("s-new"));
        assert_eq!(
            effect,
            Effect::FetchHistory {
                session_id: "s-new".to_string(),
                instance: app.refresh,
            }
        );
    }

    #[test]
    fn test_switching_session_fetches_once_and_drops_old_messages() {
        let mut app = test_app();
        let first = open(&mut app, "s-1");
        update(
            &mut app,
            Action::HistoryLoaded {
                instance: first,
                messages: vec![Message::local(Role::User, "old".to_string())],
            },
        );

        let effect = update(&mut app, Action::SelectSession("s-2".to_string()));

        let second = app.refresh;
        assert_eq!(
            effect,
            Effect::FetchHistory {
                session_id: "s-2".to_string(),
                instance: second,
            }
        );
        let panel = app.chat.as_ref().unwrap();
        assert_eq!(panel.session_id, "s-2");
        assert!(panel.messages.is_empty());
        assert!(!panel.history_loaded);
    }

    #[test]
    fn test_reselecting_bumps_refresh() {
        let mut app = test_app();
        let first = open(&mut app, "s-1");
        let second = open(&mut app, "s-1");
        assert!(second > first);
    }

    #[test]
    fn test_select_unknown_session_is_ignored() {
        let mut app = test_app();
        assert_eq!(
            update(&mut app, Action::SelectSession("nope".to_string())),
            Effect::None
        );
        assert!(app.current_session_id.is_none());
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut app = test_app();
        let stale = open(&mut app, "s-1");
        open(&mut app, "s-2");
        update(
            &mut app,
            Action::HistoryLoaded {
                instance: stale,
                messages: vec![Message::local(Role::User, "from s-1".to_string())],
            },
        );
        assert!(app.chat.as_ref().unwrap().messages.is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = test_app();
        assert_eq!(
            update(&mut app, Action::RequestDelete("s-2".to_string())),
            Effect::None
        );
        assert_eq!(app.sessions.len(), 2);
        assert_eq!(
            update(&mut app, Action::ConfirmDelete),
            Effect::DeleteSession("s-2".to_string())
        );
        assert!(app.pending_delete.is_none());
        assert_eq!(update(&mut app, Action::ConfirmDelete), Effect::None);
    }

    #[test]
    fn test_cancel_delete() {
        let mut app = test_app();
        update(&mut app, Action::RequestDelete("s-2".to_string()));
        update(&mut app, Action::CancelDelete);
        assert_eq!(update(&mut app, Action::ConfirmDelete), Effect::None);
    }

    #[test]
    fn test_deleting_current_session_clears_pointer() {
        let mut app = test_app();
        open(&mut app, "s-1");
        update(&mut app, Action::SessionDeleted("s-1".to_string()));
        assert!(app.current_session_id.is_none());
        assert!(app.chat.is_none());
        assert!(app.sessions.get("s-1").is_none());
    }

    #[test]
    fn test_deleting_other_session_keeps_pointer() {
        let mut app = test_app();
        open(&mut app, "s-1");
        update(&mut app, Action::SessionDeleted("s-2".to_string()));
        assert_eq!(app.current_session_id.as_deref(), Some("s-1"));
        assert!(app.chat.is_some());
        assert_eq!(app.sessions.len(), 1);
    }

    #[test]
    fn test_logout_clears_everything() {
        let mut app = test_app();
        open(&mut app, "s-1");
        let effect = update(&mut app, Action::Logout);
        assert_eq!(effect, Effect::ClearIdentity);
        assert!(app.user.is_none());
        assert!(app.sessions.is_empty());
        assert!(app.current_session_id.is_none());
        assert!(app.chat.is_none());
    }

    #[test]
    fn test_session_created_after_logout_is_discarded() {
        let mut app = test_app();
        assert!(matches!(update(&mut app, Action::NewChat), Effect::CreateSession(_)));
        update(&mut app, Action::Logout);

        let effect = update(
            &mut app,
            Action::SessionCreated(test_session("s-late", "New Chat")),
        );
        assert_eq!(effect, Effect::None);
        assert!(app.current_session_id.is_none());
        assert!(app.chat.is_none());
        assert!(app.sessions.is_empty());

        update(&mut app, Action::AuthFinished(Ok(test_user())));
        assert!(app.current_session_id.is_none());
        assert!(app.chat.is_none());
    }

    #[test]
    fn test_sessions_loaded_after_logout_is_discarded() {
        let mut app = test_app();
        update(&mut app, Action::Logout);
        update(
            &mut app,
            Action::SessionsLoaded(vec![test_session("s-1", "Rust tips")]),
        );
        assert!(app.sessions.is_empty());
    }

    #[test]
    fn test_submit_without_panel_is_noop() {
        let mut app = test_app();
        assert_eq!(
            update(&mut app, Action::SubmitMessage("hi".to_string())),
            Effect::None
        );
    }

    #[test]
    fn test_empty_submit_is_noop() {
        let mut app = test_app();
        open(&mut app, "s-1");
        assert_eq!(
            update(&mut app, Action::SubmitMessage("  ".to_string())),
            Effect::None
        );
        assert!(app.chat.as_ref().unwrap().messages.is_empty());
    }

    #[test]
    fn test_submit_while_loading_is_noop() {
        let mut app = test_app();
        open(&mut app, "s-1");
        assert!(matches!(
            update(&mut app, Action::SubmitMessage("one".to_string())),
            Effect::Send(_)
        ));
        assert_eq!(
            update(&mut app, Action::SubmitMessage("two".to_string())),
            Effect::None
        );
        assert_eq!(app.chat.as_ref().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_image_mode_send_through_reducer() {
        let mut app = test_app();
        open(&mut app, "s-1");
        update(&mut app, Action::ToggleImageMode);
        match update(&mut app, Action::SubmitMessage("a cat".to_string())) {
            Effect::Send(job) => assert_eq!(job.message, "/image a cat"),
            other => panic!("expected Send, got {other:?}"),
        }
    }

    #[test]
    fn test_send_failure_settles_panel() {
        let mut app = test_app();
        let instance = open(&mut app, "s-1");
        update(&mut app, Action::AttachImage(PathBuf::from("/tmp/cat.png")));
        update(&mut app, Action::SubmitMessage("hi".to_string()));

        let effect = update(
            &mut app,
            Action::SendFinished(report(instance, Err(ApiError::Network("down".to_string())))),
        );

        assert_eq!(effect, Effect::SendSettled);
        let panel = app.chat.as_ref().unwrap();
        assert!(!panel.is_loading);
        assert!(!panel.has_attachments());
        assert_eq!(panel.messages.last().unwrap().content, SEND_ERROR_TEXT);
    }

    #[test]
    fn test_reply_for_unmounted_panel_is_discarded() {
        let mut app = test_app();
        let instance = open(&mut app, "s-1");
        update(&mut app, Action::SubmitMessage("hi".to_string()));
        open(&mut app, "s-2");

        let effect = update(
            &mut app,
            Action::SendFinished(report(instance, Ok("late".to_string()))),
        );

        assert_eq!(effect, Effect::None);
        assert!(app.chat.as_ref().unwrap().messages.is_empty());
    }

    #[test]
    fn test_download_uses_current_preview() {
        let mut app = test_app();
        let instance = open(&mut app, "s-1");
        update(
            &mut app,
            Action::HistoryLoaded {
                instance,
                messages: vec![Message::local(
                    Role::Bot,
                    "![Generated Image](http://localhost:8000/images/a.png)".to_string(),
                )],
            },
        );
        assert_eq!(update(&mut app, Action::DownloadImage), Effect::None);

        update(&mut app, Action::OpenImagePreview);
        assert_eq!(
            update(&mut app, Action::DownloadImage),
            Effect::DownloadImage("http://localhost:8000/images/a.png".to_string())
        );
    }

    #[test]
    fn test_refresh_sessions_requires_user() {
        let mut app = App::new("New Chat".to_string());
        assert_eq!(update(&mut app, Action::RefreshSessions), Effect::None);
        app.user = Some(test_user());
        assert_eq!(update(&mut app, Action::RefreshSessions), Effect::FetchSessions);
    }
}
