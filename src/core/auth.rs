//! # Authentication
//!
//! Two-mode login form: sign in, or register and then sign in with the
//! same credentials. The form state here is UI-agnostic; the text fields
//! themselves belong to whichever adapter renders the form.

use log::{info, warn};

use crate::api::{ApiError, ChatBackend, Credentials, User};

/// Shown when the backend gives no structured detail.
pub const GENERIC_AUTH_ERROR: &str = "Authentication received an error.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::Register,
            AuthMode::Register => AuthMode::SignIn,
        }
    }

    /// Label of the submit button.
    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::Register => "Create Account",
        }
    }

    /// Prompt offering the other mode.
    pub fn switch_prompt(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Don't have an account? Register",
            AuthMode::Register => "Already have an account? Sign In",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl AuthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.error = None;
    }

    /// Starts a submission. Returns the request to run, or `None` if one is
    /// already running or the input is incomplete (in which case `error` says why).
    pub fn begin(&mut self, username: String, password: String) -> Option<AuthRequest> {
        if self.in_flight {
            return None;
        }
        self.error = None;
        if username.trim().is_empty() || password.is_empty() {
            self.error = Some("Username and password are required.".to_string());
            return None;
        }
        self.in_flight = true;
        Some(AuthRequest {
            mode: self.mode,
            credentials: Credentials { username, password },
        })
    }

    pub fn finish(&mut self, result: &Result<User, ApiError>) {
        self.in_flight = false;
        if let Err(e) = result {
            self.error = Some(auth_error_message(e));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub mode: AuthMode,
    pub credentials: Credentials,
}

/// Text shown under the form for a failed attempt.
pub fn auth_error_message(err: &ApiError) -> String {
    err.detail()
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_AUTH_ERROR.to_string())
}

/// Runs one submission against the backend.
///
/// Registering always signs in afterwards with the same credentials. If
/// registration fails, the login call is never made.
pub async fn authenticate(backend: &dyn ChatBackend, request: &AuthRequest) -> Result<User, ApiError> {
    if request.mode == AuthMode::Register {
        backend.register(&request.credentials).await.inspect_err(|e| {
            warn!("Registration failed for {}: {}", request.credentials.username, e);
        })?;
        info!("Registered {}, signing in", request.credentials.username);
    }
    backend.login(&request.credentials).await.inspect_err(|e| {
        warn!("Login failed for {}: {}", request.credentials.username, e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{BackendCall, ScriptedBackend};
    use tokio_test::{assert_err, assert_ok};

    fn request(mode: AuthMode) -> AuthRequest {
        AuthRequest {
            mode,
            credentials: Credentials {
                username: "ada".to_string(),
                password: "lovelace".to_string(),
            },
        }
    }

    #[test]
    fn test_toggle_mode_clears_error() {
        let mut form = AuthForm::new();
        form.error = Some("bad".to_string());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::Register);
        assert!(form.error.is_none());
        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::SignIn);
    }

    #[test]
    fn test_begin_is_single_flight() {
        let mut form = AuthForm::new();
        assert!(form.begin("ada".to_string(), "pw".to_string()).is_some());
        assert!(form.in_flight);
        assert!(form.begin("ada".to_string(), "pw".to_string()).is_none());
    }

    #[test]
    fn test_begin_requires_both_fields() {
        let mut form = AuthForm::new();
        assert!(form.begin("  ".to_string(), "pw".to_string()).is_none());
        assert!(form.error.is_some());
        assert!(!form.in_flight);
        assert!(form.begin("ada".to_string(), String::new()).is_none());
    }

    #[test]
    fn test_finish_uses_detail_or_generic_message() {
        let mut form = AuthForm::new();
        form.in_flight = true;
        form.finish(&Err(ApiError::Api {
            status: 401,
            message: String::new(),
            detail: Some("Invalid credentials".to_string()),
        }));
        assert!(!form.in_flight);
        assert_eq!(form.error.as_deref(), Some("Invalid credentials"));

        form.finish(&Err(ApiError::Network("connection refused".to_string())));
        assert_eq!(form.error.as_deref(), Some(GENERIC_AUTH_ERROR));
    }

    #[tokio::test]
    async fn test_sign_in_makes_one_login_call() {
        let backend = ScriptedBackend::new();
        let user = authenticate(&backend, &request(AuthMode::SignIn)).await.unwrap();
        assert_eq!(user.username, "ada");
        assert_eq!(backend.calls(), vec![BackendCall::Login("ada".to_string())]);
    }

    #[tokio::test]
    async fn test_register_success_logs_in_exactly_once() {
        let backend = ScriptedBackend::new();
        let user = assert_ok!(authenticate(&backend, &request(AuthMode::Register)).await);
        assert_eq!(user.username, "ada");
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::Register("ada".to_string()),
                BackendCall::Login("ada".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_register_failure_skips_login() {
        let backend = ScriptedBackend::new().fail_register("Username already exists");
        let err = assert_err!(authenticate(&backend, &request(AuthMode::Register)).await);
        assert_eq!(err.detail(), Some("Username already exists"));
        assert_eq!(backend.calls(), vec![BackendCall::Register("ada".to_string())]);
    }

    #[tokio::test]
    async fn test_login_failure_after_register_is_surfaced() {
        let backend = ScriptedBackend::new().fail_login("Invalid credentials");
        let err = authenticate(&backend, &request(AuthMode::Register))
            .await
            .unwrap_err();
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert_eq!(backend.calls().len(), 2);
    }
}
