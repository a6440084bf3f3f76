//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as struct fields:
//! - `TitleBar`: top status bar
//! - `Message`: one transcript entry
//! - `Welcome`: placeholder when no chat is open
//! - `ConfirmDelete`, `ImageViewer`: overlays
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that own local state and emit high-level events:
//! - `LoginFormState`: username/password fields and form focus
//! - `SidebarState`: session search and highlight
//! - `InputBox`: message composer
//! - `MessageListState`: scroll position and height cache
//! - `PathPrompt`: attachment path entry
//!
//! Stateful components are split into a persistent state struct (kept in
//! `TuiState`) and a transient wrapper created each frame with borrowed
//! state plus props from the core `App`. Components never read `App`
//! directly; `ui.rs` hands each one exactly what it shows.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── editing.rs       (cursor/wrap helpers shared by text inputs)
//! ├── text_field.rs    (single-line input)
//! ├── input_box.rs     (multi-line composer)
//! ├── message.rs       (one message)
//! ├── message_list.rs  (scrollable transcript)
//! ├── chat_panel.rs    (header + transcript + attachments + composer)
//! ├── sidebar.rs       (session list with search)
//! ├── login.rs         (sign in / register)
//! ├── welcome.rs
//! ├── title_bar.rs
//! ├── dialog.rs        (delete confirmation, path prompt)
//! └── image_viewer.rs
//! ```

use ratatui::layout::Rect;

pub mod chat_panel;
pub mod dialog;
mod editing;
pub mod image_viewer;
pub mod input_box;
pub mod login;
pub mod message;
pub mod message_list;
pub mod sidebar;
pub mod text_field;
pub mod title_bar;
pub mod welcome;

pub use chat_panel::ChatView;
pub use dialog::{ConfirmDelete, ConfirmEvent, PathPrompt, PromptEvent, confirm_answer};
pub use image_viewer::{ImageViewer, ViewerEvent, viewer_event};
pub use input_box::{InputBox, InputEvent};
pub use login::{LoginEvent, LoginForm, LoginFormState};
pub use message_list::MessageListState;
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
pub use title_bar::TitleBar;
pub use welcome::Welcome;

/// A `width` x `height` rect centered in `outer`, shrunk to fit.
pub(crate) fn centered_box(width: u16, height: u16, outer: Rect) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
