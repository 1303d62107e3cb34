//! Thread-safe registry of independent sessions.
//!
//! The map is guarded by a `parking_lot::RwLock`; each session has its own
//! `Mutex` so turns in different conversations never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::{HrqlError, Result};
use crate::session::Session;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session and returns its id.
    pub fn create(&self) -> Uuid {
        let session = Session::new();
        let id = session.id();
        self.sessions.write().insert(id, Arc::new(Mutex::new(session)));
        debug!(%id, "session created");
        id
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown id.
    pub fn get(&self, id: Uuid) -> Result<SessionHandle> {
        self.sessions
            .read()
            .get(&id)
            .map(Arc::clone)
            .ok_or(HrqlError::SessionNotFound(id))
    }

    /// Ends a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` for an unknown id.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.sessions
            .write()
            .remove(&id)
            .map(|_| debug!(%id, "session removed"))
            .ok_or(HrqlError::SessionNotFound(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_get_remove() {
        let store = SessionStore::new();
        let id = store.create();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().lock().id(), id);
        store.remove(id).unwrap();
        assert!(store.is_empty());
        assert!(matches!(store.get(id), Err(HrqlError::SessionNotFound(missing)) if missing == id));
        assert!(store.remove(id).is_err());
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        store.get(a).unwrap().lock().push_user("hello");
        assert!(store.get(b).unwrap().lock().turns().is_empty());
    }
}
