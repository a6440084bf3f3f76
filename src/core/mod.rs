//! # Core Application Logic
//!
//! This module contains Callisto's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No terminal. No UI.    │
//!                    └───────────┬─────────────┘
//!                                │ Effect
//!                    ┌───────────┴─────────────┐
//!                    ▼                         ▼
//!             ┌────────────┐            ┌────────────┐
//!             │    TUI     │            │    API     │
//!             │  Adapter   │──────────▶ │  (reqwest) │
//!             │ (ratatui)  │            │            │
//!             └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`auth`], [`chat`], [`sessions`]: per-panel state and the async flows behind them
//! - [`attachments`]: which local files may be attached
//! - [`identity`]: the signed-in user record on disk
//! - [`config`]: layered settings

pub mod action;
pub mod attachments;
pub mod auth;
pub mod chat;
pub mod config;
pub mod identity;
pub mod sessions;
pub mod state;
