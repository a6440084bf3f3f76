//! # Identity Persistence
//!
//! The signed-in user is the only thing kept across restarts: one JSON
//! file at `~/.callisto/user.json`. Message content is never persisted.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::api::User;

pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `~/.callisto/user.json`, or `None` without a home directory.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(".callisto").join("user.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restores the saved user. A missing file means nobody is signed in;
    /// an unreadable one is logged and treated the same way.
    pub fn load(&self) -> Option<User> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read identity {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str(&json) {
            Ok(user) => {
                debug!("Restored identity from {}", self.path.display());
                Some(user)
            }
            Err(e) => {
                warn!("Ignoring corrupt identity {}: {}", self.path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, user: &User) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(user)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}
