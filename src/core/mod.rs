//! Core abstractions for tomo.
//!
//! This module provides shared filtering and date parsing used across features.

mod datetime;
pub mod filter;

pub use datetime::parse_date;
pub use filter::SessionFilter;
