//! Terminal input, translated into `TuiEvent`s.
//!
//! ## Key bindings
//!
//! | Key            | Event                                   |
//! |----------------|-----------------------------------------|
//! | Ctrl+C, Ctrl+Q | quit                                    |
//! | Tab / Shift+Tab| move focus (sidebar, chat, form fields) |
//! | Enter          | submit / select                         |
//! | Ctrl+J         | newline in the message box              |
//! | Esc            | close overlay, leave search             |
//! | Ctrl+N         | new chat                                |
//! | Ctrl+R         | refresh the session list                |
//! | Ctrl+L         | sign out                                |
//! | Ctrl+G         | toggle image generation mode            |
//! | Ctrl+O         | attach an image                         |
//! | Ctrl+D         | attach documents                        |
//! | Ctrl+P         | preview generated images                |
//! | Ctrl+F         | search chats                            |
//! | PageUp/PageDown, wheel | scroll the transcript           |

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::warn;

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    ForceQuit,
    Resize,

    // Editing
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,
    Submit,
    Escape,

    // Focus
    FocusNext,
    FocusPrev,
    FocusSearch,

    // Scrolling
    ScrollUp,
    ScrollDown,
    ScrollPageUp,
    ScrollPageDown,

    // Commands
    NewChat,
    RefreshSessions,
    Logout,
    ToggleImageMode,
    AttachImage,
    AttachDocuments,
    PreviewImages,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(Duration::ZERO)
}

/// Wait up to `timeout` for an event. Terminal read errors are logged and
/// reported as "no event".
pub fn poll_event_timeout(timeout: Duration) -> Option<TuiEvent> {
    match event::poll(timeout) {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            warn!("Terminal poll failed: {}", e);
            return None;
        }
    }
    match event::read() {
        Ok(ev) => translate(ev),
        Err(e) => {
            warn!("Terminal read failed: {}", e);
            None
        }
    }
}

/// Maps a raw crossterm event onto a `TuiEvent`.
pub fn translate(ev: Event) -> Option<TuiEvent> {
    match ev {
        Event::Key(key) => translate_key(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => Some(TuiEvent::ScrollUp),
            MouseEventKind::ScrollDown => Some(TuiEvent::ScrollDown),
            _ => None,
        },
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<TuiEvent> {
    // Terminals with the kitty protocol also report releases
    if key.kind == KeyEventKind::Release {
        return None;
    }
    log::trace!("Key event: {:?} with modifiers {:?}", key.code, key.modifiers);

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(TuiEvent::ForceQuit),
            // Ctrl+J is ASCII LF; most terminals send it for Ctrl+Enter
            KeyCode::Char('j') | KeyCode::Enter => Some(TuiEvent::InputChar('\n')),
            KeyCode::Char('n') => Some(TuiEvent::NewChat),
            KeyCode::Char('r') => Some(TuiEvent::RefreshSessions),
            KeyCode::Char('l') => Some(TuiEvent::Logout),
            KeyCode::Char('g') => Some(TuiEvent::ToggleImageMode),
            KeyCode::Char('o') => Some(TuiEvent::AttachImage),
            KeyCode::Char('d') => Some(TuiEvent::AttachDocuments),
            KeyCode::Char('p') => Some(TuiEvent::PreviewImages),
            KeyCode::Char('f') => Some(TuiEvent::FocusSearch),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char(c) => Some(TuiEvent::InputChar(c)),
        KeyCode::Enter => Some(TuiEvent::Submit),
        KeyCode::Esc => Some(TuiEvent::Escape),
        KeyCode::Tab => Some(TuiEvent::FocusNext),
        KeyCode::BackTab => Some(TuiEvent::FocusPrev),
        KeyCode::Backspace => Some(TuiEvent::Backspace),
        KeyCode::Delete => Some(TuiEvent::Delete),
        KeyCode::Left => Some(TuiEvent::CursorLeft),
        KeyCode::Right => Some(TuiEvent::CursorRight),
        KeyCode::Up => Some(TuiEvent::CursorUp),
        KeyCode::Down => Some(TuiEvent::CursorDown),
        KeyCode::Home => Some(TuiEvent::CursorHome),
        KeyCode::End => Some(TuiEvent::CursorEnd),
        KeyCode::PageUp => Some(TuiEvent::ScrollPageUp),
        KeyCode::PageDown => Some(TuiEvent::ScrollPageDown),
        _ => None,
    }
}
