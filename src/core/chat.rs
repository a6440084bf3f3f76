//! # Chat Panel
//!
//! Message history for the open session plus the send orchestration.
//!
//! A send is split in three so the reducer stays free of I/O:
//!
//! ```text
//! begin_send()   validate, prefix, optimistic append, enter loading   (sync, reducer)
//!      │
//!      ▼
//! execute_send() upload documents one by one, then the image,         (async, task)
//!                then a single chat call referencing the stored paths
//!      │
//!      ▼
//! finish_send()  append reply or error text, leave loading,           (sync, reducer)
//!                drop the attachment selection
//! ```
//!
//! The chat endpoint only accepts storage paths, so every upload has to
//! finish before the chat call goes out.

use std::path::PathBuf;

use log::{error, info, warn};
use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::api::{ApiError, ChatBackend, ChatRequest, Message, Role};

/// Prefix that asks the backend for an image instead of a text reply.
pub const IMAGE_COMMAND: &str = "/image";

/// Bot message appended when the chat call fails.
pub const SEND_ERROR_TEXT: &str = "Error: Could not get response.";

/// An image embedded in a bot reply as `![alt](url)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub alt: String,
    pub url: String,
}

/// Everything the background task needs to carry out one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendJob {
    /// Panel instance the result belongs to.
    pub instance: u64,
    pub session_id: String,
    /// Text as displayed, including the image command prefix if any.
    pub message: String,
    pub image: Option<PathBuf>,
    pub documents: Vec<PathBuf>,
}

/// Outcome of [`execute_send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SendReport {
    pub instance: u64,
    /// The chat request that was actually submitted.
    pub request: ChatRequest,
    /// Attachments whose upload failed and were left out of the request.
    pub failed_uploads: Vec<PathBuf>,
    pub reply: Result<String, ApiError>,
}

/// State of the chat view for one mounted session.
#[derive(Debug, Clone)]
pub struct ChatPanel {
    pub session_id: String,
    /// Refresh counter value at mount time. Results tagged with another
    /// instance belong to a panel that has since been torn down.
    pub instance: u64,
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub history_loaded: bool,
    pub selected_image: Option<PathBuf>,
    pub selected_documents: Vec<PathBuf>,
    pub image_mode: bool,
    /// Index into [`ChatPanel::images`] of the image shown fullscreen.
    pub viewing_image: Option<usize>,
}

impl ChatPanel {
    pub fn new(session_id: String, instance: u64) -> Self {
        Self {
            session_id,
            instance,
            messages: Vec::new(),
            is_loading: false,
            history_loaded: false,
            selected_image: None,
            selected_documents: Vec::new(),
            image_mode: false,
            viewing_image: None,
        }
    }

    pub fn has_attachments(&self) -> bool {
        self.selected_image.is_some() || !self.selected_documents.is_empty()
    }

    /// Whether submitting `text` right now would start a send.
    pub fn can_send(&self, text: &str) -> bool {
        !self.is_loading && (!text.trim().is_empty() || self.has_attachments())
    }

    /// Replaces the displayed transcript with freshly fetched history.
    /// Messages exchanged before the history arrived are kept after it.
    pub fn load_history(&mut self, messages: Vec<Message>) {
        let early = std::mem::replace(&mut self.messages, messages);
        if !self.history_loaded {
            self.messages.extend(early);
        }
        self.history_loaded = true;
        self.viewing_image = None;
    }

    pub fn toggle_image_mode(&mut self) {
        self.image_mode = !self.image_mode;
    }

    pub fn attach_image(&mut self, path: PathBuf) {
        self.selected_image = Some(path);
    }

    /// Replaces the document selection, like re-opening a file picker.
    pub fn attach_documents(&mut self, paths: Vec<PathBuf>) {
        self.selected_documents = paths;
    }

    /// Starts a send. Returns `None` (and changes nothing) when there is
    /// nothing to send or a send is already in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<SendJob> {
        if !self.can_send(text) {
            return None;
        }

        let message = if self.image_mode {
            format!("{IMAGE_COMMAND} {text}")
        } else {
            text.to_string()
        };

        self.messages.push(Message::local(Role::User, message.clone()));
        self.is_loading = true;

        Some(SendJob {
            instance: self.instance,
            session_id: self.session_id.clone(),
            message,
            image: self.selected_image.clone(),
            documents: self.selected_documents.clone(),
        })
    }

    /// Completes a send. The optimistic user message stays as it is
    /// whatever the outcome.
    pub fn finish_send(&mut self, report: SendReport) {
        let content = match report.reply {
            Ok(text) => text,
            Err(e) => {
                error!("Error sending message: {}", e);
                SEND_ERROR_TEXT.to_string()
            }
        };
        self.messages.push(Message::local(Role::Bot, content));

        self.is_loading = false;
        self.selected_image = None;
        self.selected_documents.clear();
    }

    /// All images embedded in bot replies, oldest first.
    pub fn images(&self) -> Vec<EmbeddedImage> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Bot)
            .flat_map(|m| embedded_images(&m.content))
            .collect()
    }

    /// Opens the fullscreen preview on the most recent image.
    pub fn open_latest_image(&mut self) -> bool {
        let count = self.images().len();
        self.viewing_image = count.checked_sub(1);
        self.viewing_image.is_some()
    }

    /// Moves the preview by `step` images, wrapping around.
    pub fn step_image(&mut self, step: isize) {
        let count = self.images().len() as isize;
        if let Some(current) = self.viewing_image
            && count > 0
        {
            self.viewing_image = Some((current as isize + step).rem_euclid(count) as usize);
        }
    }

    pub fn close_image(&mut self) {
        self.viewing_image = None;
    }

    pub fn current_image(&self) -> Option<EmbeddedImage> {
        self.viewing_image
            .and_then(|idx| self.images().into_iter().nth(idx))
    }
}

/// Uploads the job's attachments and submits the chat request.
///
/// Documents go first, strictly one after another, then the image. A
/// failed upload is logged and that file is left out; the chat call is
/// made regardless.
pub async fn execute_send(backend: &dyn ChatBackend, job: SendJob) -> SendReport {
    let mut context_files = Vec::with_capacity(job.documents.len());
    let mut failed_uploads = Vec::new();

    for path in &job.documents {
        match backend.upload_file(path).await {
            Ok(uploaded) => context_files.push(uploaded.path),
            Err(e) => {
                warn!("Error uploading file {}: {}", path.display(), e);
                failed_uploads.push(path.clone());
            }
        }
    }

    let image = match &job.image {
        Some(path) => match backend.upload_file(path).await {
            Ok(uploaded) => Some(uploaded.path),
            Err(e) => {
                warn!("Error uploading image {}: {}", path.display(), e);
                failed_uploads.push(path.clone());
                None
            }
        },
        None => None,
    };

    let request = ChatRequest {
        message: job.message,
        image,
        context_files,
        session_id: job.session_id,
    };

    info!(
        "Submitting chat turn ({} context files, image: {})",
        request.context_files.len(),
        request.image.is_some()
    );
    let reply = backend.send_chat(&request).await.map(|r| r.response);

    SendReport {
        instance: job.instance,
        request,
        failed_uploads,
        reply,
    }
}

/// Extracts `![alt](url)` images from Markdown.
pub fn embedded_images(content: &str) -> Vec<EmbeddedImage> {
    let mut images = Vec::new();
    let mut current: Option<EmbeddedImage> = None;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Image { dest_url, .. }) => {
                current = Some(EmbeddedImage {
                    alt: String::new(),
                    url: dest_url.to_string(),
                });
            }
            Event::Text(text) => {
                if let Some(image) = current.as_mut() {
                    image.alt.push_str(&text);
                }
            }
            Event::End(TagEnd::Image) => {
                if let Some(image) = current.take() {
                    images.push(image);
                }
            }
            _ => {}
        }
    }
    images
}
