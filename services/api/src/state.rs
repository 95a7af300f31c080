//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the tutor and the
//! session store shared by all handlers.

use crate::sessions::SessionStore;
use std::sync::Arc;
use tutor_core::tutor::Tutor;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub tutor: Arc<Tutor>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(tutor: Tutor) -> Self {
        Self {
            tutor: Arc::new(tutor),
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
