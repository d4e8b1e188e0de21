//! Feature implementations for tomo.
//!
//! - Focus mode: sessions, the timer state machine and the countdown loop
//! - Statistics over the session log
//! - Export to JSON and CSV

pub mod export;
pub mod focus;
pub mod stats;
