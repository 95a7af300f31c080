//! Tutor API Library Crate
//!
//! This library contains the web-facing parts of the course tutor: configuration,
//! startup wiring, the per-session store, API handlers and routing. The binaries
//! in `bin/` are thin wrappers around it.

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod sessions;
pub mod state;
