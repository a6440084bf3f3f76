//! # Session List
//!
//! Client-side bookkeeping for the sidebar. The backend owns sessions; this
//! list is a local mirror that is replaced wholesale on every fetch and
//! patched optimistically on create/delete. There is no merge logic.

use crate::api::Session;

#[derive(Debug, Default, Clone)]
pub struct SessionList {
    sessions: Vec<Session>,
}

impl SessionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    /// Newly created sessions go to the head of the list.
    pub fn prepend(&mut self, session: Session) {
        self.sessions.insert(0, session);
    }

    /// Returns true if a session was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        self.sessions.len() != before
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn all(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn filtered(&self, term: &str) -> Vec<&Session> {
        filter_sessions(&self.sessions, term)
    }
}

/// Case-insensitive substring match on title. An empty term returns
/// everything, including untitled sessions; a non-empty term never
/// matches an untitled one.
pub fn filter_sessions<'a>(sessions: &'a [Session], term: &str) -> Vec<&'a Session> {
    if term.is_empty() {
        return sessions.iter().collect();
    }
    let needle = term.to_lowercase();
    sessions
        .iter()
        .filter(|s| {
            s.title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&needle))
        })
        .collect()
}
