//! # Attachments
//!
//! A turn can carry at most one image and any number of documents. The
//! selection lives only until the next send; this module just decides
//! which local files are acceptable for which slot.

use std::fmt;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "pptx", "txt"];

/// Which slot a picked file goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Document,
}

impl AttachmentKind {
    pub fn label(self) -> &'static str {
        match self {
            AttachmentKind::Image => "Image",
            AttachmentKind::Document => "Doc",
        }
    }

    fn extensions(self) -> &'static [&'static str] {
        match self {
            AttachmentKind::Image => IMAGE_EXTENSIONS,
            AttachmentKind::Document => DOCUMENT_EXTENSIONS,
        }
    }

    /// Whether the file's extension is one this slot accepts (case-insensitive).
    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions().contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    NotFound(PathBuf),
    Unsupported { path: PathBuf, kind: AttachmentKind },
    Empty,
}

impl fmt::Display for AttachmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachmentError::NotFound(path) => write!(f, "no such file: {}", path.display()),
            AttachmentError::Unsupported { path, kind } => write!(
                f,
                "{} is not a supported {} ({})",
                path.display(),
                kind.label().to_lowercase(),
                kind.extensions().join(", ")
            ),
            AttachmentError::Empty => write!(f, "no file given"),
        }
    }
}

impl std::error::Error for AttachmentError {}

/// Parses the text typed into the file prompt into validated paths.
///
/// Documents may be given as several paths separated by `;`. An image
/// prompt takes exactly one path; anything after the first `;` is ignored.
pub fn parse_selection(input: &str, kind: AttachmentKind) -> Result<Vec<PathBuf>, AttachmentError> {
    let mut paths: Vec<PathBuf> = input
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(expand_home)
        .collect();

    if kind == AttachmentKind::Image {
        paths.truncate(1);
    }
    if paths.is_empty() {
        return Err(AttachmentError::Empty);
    }

    for path in &paths {
        if !path.is_file() {
            return Err(AttachmentError::NotFound(path.clone()));
        }
        if !kind.accepts(path) {
            return Err(AttachmentError::Unsupported {
                path: path.clone(),
                kind,
            });
        }
    }
    Ok(paths)
}

fn expand_home(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// File name for display in the attachment bar.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
