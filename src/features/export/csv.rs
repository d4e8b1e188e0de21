//! CSV rendering of session records.

use chrono::SecondsFormat;

use crate::features::focus::SessionRecord;

/// Column names, in order.
pub const HEADER: [&str; 7] = [
    "kind",
    "started_at",
    "ended_at",
    "planned_duration",
    "actual_duration",
    "completion",
    "note",
];

/// Render records as CSV with a header row. Lines end with `\n`.
#[must_use]
pub fn to_csv(records: &[SessionRecord]) -> String {
    let mut out = HEADER.join(",");
    out.push('\n');

    for record in records {
        let fields = [
            record.kind.as_str().to_string(),
            record.started_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            record.ended_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            record.planned_duration_seconds.to_string(),
            record.actual_duration_seconds.to_string(),
            record.completion.as_str().to_string(),
            record.note.clone().unwrap_or_default(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field if it holds a comma, quote or line break. Inner quotes
/// are doubled.
#[must_use]
pub fn escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape("essay draft"), "essay draft");
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_escape_special() {
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
        assert_eq!(escape("cr\rhere"), "\"cr\rhere\"");
    }

    #[test]
    fn test_empty_log_is_header_only() {
        assert_eq!(
            to_csv(&[]),
            "kind,started_at,ended_at,planned_duration,actual_duration,completion,note\n"
        );
    }
}
