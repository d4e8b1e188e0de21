//! JSON output formatting for tomo.

use serde::Serialize;
use serde_json::json;

use crate::error::TomoError;
use crate::features::focus::SessionRecord;

/// Format a session list as JSON
///
/// # Errors
///
/// Returns `TomoError::Json` if serialization fails.
pub fn format_sessions_json(records: &[SessionRecord], title: &str) -> Result<String, TomoError> {
    let output = json!({
        "list": title,
        "count": records.len(),
        "items": records
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `TomoError::Json` if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, TomoError> {
    Ok(serde_json::to_string_pretty(value)?)
}
