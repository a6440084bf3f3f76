//! # API Client
//!
//! Everything that crosses the wire to the chat backend lives here:
//! the serde wire types, the [`ChatBackend`] seam the core depends on,
//! and [`ApiClient`], the `reqwest` implementation of it.

pub mod backend;
pub mod client;
pub mod types;

pub use backend::{ApiError, ChatBackend};
pub use client::ApiClient;
pub use types::{
    ChatReply, ChatRequest, Credentials, DEFAULT_SESSION_TITLE, Message, Role, Session,
    UndoOutcome, UploadedFile, User,
};
