//! Storage layer for tomo.
//!
//! This module provides file-based persistence for:
//! - The session log (`sessions.json`, append-only JSON array)
//! - Pending sessions that could not be appended (`sessions.pending.json`)

mod recorder;
mod session_store;

pub use recorder::SessionRecorder;
pub use session_store::{recent, SessionStore};
