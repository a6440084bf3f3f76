//! Runs the `Effect`s returned by `update()`.
//!
//! Disk work on the identity record is quick and done inline. Every
//! network call runs on its own tokio task and reports back to the event
//! loop as an `Action` over the channel. Tasks are never awaited or
//! aborted; a result that arrives for a panel that is gone is dropped by
//! the reducer.

use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use log::{debug, info, warn};

use crate::api::{ChatBackend, User};
use crate::core::action::{Action, Effect};
use crate::core::auth::authenticate;
use crate::core::chat::execute_send;
use crate::core::identity::IdentityStore;

pub struct EffectRunner {
    backend: Arc<dyn ChatBackend>,
    identity: Option<IdentityStore>,
    download_dir: PathBuf,
    tx: mpsc::Sender<Action>,
}

impl EffectRunner {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        identity: Option<IdentityStore>,
        download_dir: PathBuf,
        tx: mpsc::Sender<Action>,
    ) -> Self {
        Self {
            backend,
            identity,
            download_dir,
            tx,
        }
    }

    /// The identity saved by a previous run, if any.
    pub fn restore_identity(&self) -> Option<User> {
        self.identity.as_ref().and_then(IdentityStore::load)
    }

    pub fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::None | Effect::Quit | Effect::SendSettled => {}
            Effect::PersistIdentity(user) => {
                if let Some(store) = &self.identity {
                    match store.save(&user) {
                        Ok(()) => debug!("Saved identity to {}", store.path().display()),
                        Err(e) => warn!("Failed to save identity: {}", e),
                    }
                }
                self.spawn(Effect::FetchSessions);
            }
            Effect::ClearIdentity => {
                if let Some(store) = &self.identity
                    && let Err(e) = store.clear()
                {
                    warn!("Failed to remove identity: {}", e);
                }
            }
            other => self.spawn(other),
        }
    }

    fn spawn(&self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let download_dir = self.download_dir.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            if let Some(action) = perform(backend.as_ref(), &download_dir, effect).await
                && tx.send(action).is_err()
            {
                warn!("Failed to deliver effect result: receiver dropped");
            }
        });
    }
}

/// Carries out one network effect and turns its outcome into an `Action`.
pub(crate) async fn perform(
    backend: &dyn ChatBackend,
    download_dir: &Path,
    effect: Effect,
) -> Option<Action> {
    let action = match effect {
        Effect::Authenticate(request) => Action::AuthFinished(authenticate(backend, &request).await),
        Effect::FetchSessions => match backend.list_sessions().await {
            Ok(sessions) => Action::SessionsLoaded(sessions),
            Err(error) => failed("Error fetching sessions", error),
        },
        Effect::CreateSession(title) => match backend.create_session(&title).await {
            Ok(session) => Action::SessionCreated(session),
            Err(error) => failed("Error creating session", error),
        },
        Effect::FetchHistory {
            session_id,
            instance,
        } => match backend.get_messages(&session_id).await {
            Ok(messages) => Action::HistoryLoaded { instance, messages },
            Err(error) => failed("Error fetching messages", error),
        },
        Effect::DeleteSession(id) => match backend.delete_session(&id).await {
            Ok(()) => Action::SessionDeleted(id),
            Err(error) => failed("Error deleting session", error),
        },
        Effect::Send(job) => Action::SendFinished(execute_send(backend, job).await),
        Effect::DownloadImage(url) => {
            Action::ImageSaved(save_image(backend, download_dir, &url).await)
        }
        Effect::None
        | Effect::Quit
        | Effect::PersistIdentity(_)
        | Effect::ClearIdentity
        | Effect::SendSettled => return None,
    };
    Some(action)
}

fn failed(context: &str, error: crate::api::ApiError) -> Action {
    Action::RequestFailed {
        context: context.to_string(),
        error,
    }
}

/// Downloads `url` into `dir` as `generated-image-<unix-millis>.png`.
async fn save_image(backend: &dyn ChatBackend, dir: &Path, url: &str) -> Result<PathBuf, String> {
    let bytes = backend.download(url).await.map_err(|e| e.to_string())?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("{}: {}", dir.display(), e))?;
    let path = dir.join(format!(
        "generated-image-{}.png",
        chrono::Utc::now().timestamp_millis()
    ));
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

/// Where downloaded images go: the user's download directory, else the
/// working directory.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Credentials, Message, Role};
    use crate::core::auth::{AuthMode, AuthRequest};
    use crate::core::chat::SendJob;
    use crate::test_support::{BackendCall, ScriptedBackend, test_session};

    #[tokio::test]
    async fn test_fetch_sessions() {
        let backend = ScriptedBackend::new().with_sessions(vec![test_session("s-1", "Rust tips")]);
        let action = perform(&backend, Path::new("."), Effect::FetchSessions).await;
        match action {
            Some(Action::SessionsLoaded(sessions)) => assert_eq!(sessions[0].id, "s-1"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(backend.calls(), vec![BackendCall::ListSessions]);
    }

    #[tokio::test]
    async fn test_fetch_history_carries_instance() {
        let backend = ScriptedBackend::new().with_history(
            "s-1",
            vec![Message::local(Role::User, "hi".to_string())],
        );
        let effect = Effect::FetchHistory {
            session_id: "s-1".to_string(),
            instance: 7,
        };
        match perform(&backend, Path::new("."), effect).await {
            Some(Action::HistoryLoaded { instance, messages }) => {
                assert_eq!(instance, 7);
                assert_eq!(messages.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_and_delete_session() {
        let backend = ScriptedBackend::new();
        let created = perform(&backend, Path::new("."), Effect::CreateSession("New Chat".to_string())).await;
        assert!(matches!(created, Some(Action::SessionCreated(s)) if s.title.as_deref() == Some("New Chat")));

        let deleted = perform(&backend, Path::new("."), Effect::DeleteSession("s-9".to_string())).await;
        assert!(matches!(deleted, Some(Action::SessionDeleted(id)) if id == "s-9"));
    }

    #[tokio::test]
    async fn test_authenticate_failure_becomes_auth_finished() {
        let backend = ScriptedBackend::new().fail_login("Invalid credentials");
        let effect = Effect::Authenticate(AuthRequest {
            mode: AuthMode::SignIn,
            credentials: Credentials {
                username: "ada".to_string(),
                password: "nope".to_string(),
            },
        });
        match perform(&backend, Path::new("."), effect).await {
            Some(Action::AuthFinished(Err(e))) => assert_eq!(e.detail(), Some("Invalid credentials")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_reports_reply() {
        let backend = ScriptedBackend::new().with_reply("pong");
        let job = SendJob {
            instance: 3,
            session_id: "s-1".to_string(),
            message: "ping".to_string(),
            image: None,
            documents: Vec::new(),
        };
        match perform(&backend, Path::new("."), Effect::Send(job)).await {
            Some(Action::SendFinished(report)) => {
                assert_eq!(report.instance, 3);
                assert_eq!(report.reply, Ok("pong".to_string()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("downloads");
        let backend = ScriptedBackend::new();
        let effect = Effect::DownloadImage("/static/fox.png".to_string());
        let path = match perform(&backend, &target, effect).await {
            Some(Action::ImageSaved(Ok(path))) => path,
            other => panic!("unexpected {other:?}"),
        };
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("generated-image-"));
        assert!(name.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG");
        assert_eq!(
            backend.calls(),
            vec![BackendCall::Download("/static/fox.png".to_string())]
        );
    }

    #[tokio::test]
    async fn test_local_effects_produce_no_action() {
        let backend = ScriptedBackend::new();
        assert!(perform(&backend, Path::new("."), Effect::ClearIdentity).await.is_none());
        assert!(perform(&backend, Path::new("."), Effect::SendSettled).await.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_persists_identity_and_fetches_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("user.json");
        let backend = Arc::new(ScriptedBackend::new().with_sessions(vec![test_session("s-1", "Rust tips")]));
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(
            backend.clone(),
            Some(IdentityStore::new(&store_path)),
            dir.path().to_path_buf(),
            tx,
        );

        runner.dispatch(Effect::PersistIdentity(crate::test_support::test_user()));
        assert_eq!(runner.restore_identity().map(|u| u.username), Some("ada".to_string()));

        let action = tokio::task::spawn_blocking(move || rx.recv_timeout(std::time::Duration::from_secs(5)))
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(action, Action::SessionsLoaded(s) if s.len() == 1));

        runner.dispatch(Effect::ClearIdentity);
        assert!(!store_path.exists());
    }
}
