//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and runs the
//! resulting `Effect`s.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event routing
//!
//! Each terminal event goes to exactly one place, first match wins:
//!
//! 1. Ctrl+C / Ctrl+Q quit from anywhere
//! 2. the login form, while nobody is signed in
//! 3. the delete confirmation, while one is pending
//! 4. the attachment path prompt, while open
//! 5. the image preview, while open
//! 6. global shortcuts (new chat, refresh, sign out, attach, scroll, focus)
//! 7. whichever of sidebar and chat has focus
//!
//! ## Redraw Strategy
//!
//! - **Animating** (history loading, waiting for a reply): draws every ~80ms
//!   so the spinner moves.
//! - **Idle**: waits up to 250ms for input, redrawing only on events or
//!   background results.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

pub mod component;
pub mod components;
mod effects;
pub mod event;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::{ApiClient, ChatBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::attachments::AttachmentKind;
use crate::core::config::ResolvedConfig;
use crate::core::identity::IdentityStore;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    ConfirmEvent, InputBox, InputEvent, LoginEvent, LoginFormState, MessageListState, PathPrompt,
    PromptEvent, SidebarEvent, SidebarState, ViewerEvent, confirm_answer, viewer_event,
};
use crate::tui::effects::{EffectRunner, default_download_dir};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which half of the main screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Chat,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub login: LoginFormState,
    pub sidebar: SidebarState,
    // Per-panel states, reset whenever a new panel instance is mounted
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub focus: Focus,
    /// Attachment path prompt (None = hidden)
    pub prompt: Option<PathPrompt>,
    mounted_instance: Option<u64>,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            login: LoginFormState::new(),
            sidebar: SidebarState::new(),
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            focus: Focus::Sidebar,
            prompt: None,
            mounted_instance: None,
        }
    }

    /// Follows the core panel: a remount gets a blank transcript view and
    /// composer, and focus moves to wherever there is something to type into.
    fn sync(&mut self, app: &App) {
        let instance = app.chat.as_ref().map(|panel| panel.instance);
        if instance == self.mounted_instance {
            return;
        }
        debug!("Panel instance changed: {:?} -> {:?}", self.mounted_instance, instance);
        self.mounted_instance = instance;
        self.message_list = MessageListState::new();
        self.input_box = InputBox::new();
        self.prompt = None;
        self.focus = if instance.is_some() {
            Focus::Chat
        } else {
            Focus::Sidebar
        };
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady block cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    info!("Using backend at {}", config.base_url);
    let backend: Arc<dyn ChatBackend> = Arc::new(ApiClient::new(config.base_url.clone()));
    let mut app = App::new(config.new_chat_title.clone());
    let mut tui = TuiState::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let runner = EffectRunner::new(
        backend,
        IdentityStore::default_location(),
        default_download_dir(),
        tx,
    );

    if let Some(user) = runner.restore_identity() {
        let effect = update(&mut app, Action::IdentityRestored(user));
        apply(&app, &mut tui, &runner, effect);
    }

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut should_quit = false;

    while !should_quit {
        tui.sync(&app);

        let animating = app
            .chat
            .as_ref()
            .is_some_and(|panel| panel.is_loading || !panel.history_loaded);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&app, &mut tui, &event) {
                let effect = update(&mut app, action);
                if apply(&app, &mut tui, &runner, effect) {
                    should_quit = true;
                    break;
                }
            }
        }

        // Results from background tasks
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            let effect = update(&mut app, action);
            if apply(&app, &mut tui, &runner, effect) {
                should_quit = true;
            }
        }
    }

    info!("Shutting down");
    ratatui::restore();
    Ok(())
}

/// Hands an effect to the runner after the TUI-side bookkeeping it implies.
/// Returns true when the app should exit.
fn apply(app: &App, tui: &mut TuiState, runner: &EffectRunner, effect: Effect) -> bool {
    match &effect {
        Effect::Quit => return true,
        // The composer is only cleared once the send has really started
        Effect::Send(_) => tui.input_box.clear(),
        // Pickers reset once a send completes, whatever its outcome
        Effect::SendSettled => tui.prompt = None,
        Effect::ClearIdentity => {
            tui.login = LoginFormState::new();
            tui.sidebar = SidebarState::new();
        }
        _ => {}
    }
    runner.dispatch(effect);
    tui.sync(app);
    false
}

/// Decides what a terminal event means right now. Local UI changes (focus,
/// text editing, overlays) happen here; anything touching core state comes
/// back as an `Action`.
fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        _ => {}
    }

    if !app.is_authenticated() {
        return match tui.login.handle_event(event)? {
            LoginEvent::Submit(credentials) => Some(Action::SubmitCredentials(credentials)),
            LoginEvent::ToggleMode => Some(Action::ToggleAuthMode),
        };
    }

    if app.pending_delete.is_some() {
        return match confirm_answer(event)? {
            ConfirmEvent::Confirm => Some(Action::ConfirmDelete),
            ConfirmEvent::Cancel => Some(Action::CancelDelete),
        };
    }

    if let Some(prompt) = tui.prompt.as_mut() {
        let answer = prompt.handle_event(event)?;
        tui.prompt = None;
        return match answer {
            PromptEvent::Attach(AttachmentKind::Image, paths) => {
                paths.into_iter().next().map(Action::AttachImage)
            }
            PromptEvent::Attach(AttachmentKind::Document, paths) => {
                Some(Action::AttachDocuments(paths))
            }
            PromptEvent::Cancel => None,
        };
    }

    let chat_open = app.chat.is_some();
    if app.chat.as_ref().is_some_and(|panel| panel.viewing_image.is_some()) {
        return match viewer_event(event)? {
            ViewerEvent::Step(step) => Some(Action::StepImage(step)),
            ViewerEvent::Download => Some(Action::DownloadImage),
            ViewerEvent::Close => Some(Action::CloseImagePreview),
        };
    }

    match event {
        TuiEvent::NewChat => return Some(Action::NewChat),
        TuiEvent::RefreshSessions => return Some(Action::RefreshSessions),
        TuiEvent::Logout => return Some(Action::Logout),
        TuiEvent::FocusSearch => {
            tui.focus = Focus::Sidebar;
            tui.sidebar.focus_search();
            return None;
        }
        TuiEvent::ToggleImageMode if chat_open => return Some(Action::ToggleImageMode),
        TuiEvent::AttachImage if chat_open => {
            tui.prompt = Some(PathPrompt::new(AttachmentKind::Image));
            return None;
        }
        TuiEvent::AttachDocuments if chat_open => {
            tui.prompt = Some(PathPrompt::new(AttachmentKind::Document));
            return None;
        }
        TuiEvent::PreviewImages if chat_open => return Some(Action::OpenImagePreview),
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.message_list.handle_event(event);
            return None;
        }
        TuiEvent::FocusNext | TuiEvent::FocusPrev if chat_open => {
            tui.sidebar.search_focused = false;
            tui.focus = match tui.focus {
                Focus::Sidebar => Focus::Chat,
                Focus::Chat => Focus::Sidebar,
            };
            return None;
        }
        _ => {}
    }

    if tui.focus == Focus::Chat && chat_open {
        if matches!(event, TuiEvent::Escape) {
            tui.focus = Focus::Sidebar;
            return None;
        }
        return match tui.input_box.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::SubmitMessage(text)),
            InputEvent::ContentChanged => None,
        };
    }

    match tui.sidebar.handle_event(event, &app.sessions)? {
        SidebarEvent::Select(id) => Some(Action::SelectSession(id)),
        SidebarEvent::RequestDelete(id) => Some(Action::RequestDelete(id)),
        SidebarEvent::NewChat => Some(Action::NewChat),
    }
}
