//! In-memory Session Store
//!
//! Each learner session gets its own `SessionState` behind its own mutex. The
//! mutex is held for a whole tutor turn, so turns within one session never
//! overlap while different sessions proceed independently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use tutor_core::session::SessionState;
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<SessionState>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new, empty session and returns its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(SessionState::new())));
        info!(session_id = %id, "Session created");
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Ends a session, dropping its state. Returns false for an unknown id.
    ///
    /// A turn already holding the session's lock finishes on its own handle;
    /// later lookups no longer find the session.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Session ended");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::session::TutorState;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new();

        let id = store.create().await;
        let session = store.get(id).await.expect("session should exist");
        assert_eq!(session.lock().await.state(), TutorState::NoCourseSelected);
    }

    #[tokio::test]
    async fn test_remove_ends_session() {
        let store = SessionStore::new();
        let id = store.create().await;
        let other = store.create().await;

        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(store.get(other).await.is_some());
        assert!(!store.remove(id).await);
    }

    #[tokio::test]
    async fn test_remove_unknown_session() {
        let store = SessionStore::new();
        assert!(!store.remove(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = SessionStore::new();
        store.create().await;
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.create().await;
        let b = store.create().await;
        assert_ne!(a, b);

        let session_a = store.get(a).await.unwrap();
        let session_b = store.get(b).await.unwrap();
        assert!(!Arc::ptr_eq(&session_a, &session_b));
    }
}
