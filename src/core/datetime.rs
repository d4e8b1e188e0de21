//! Date parsing for history and export filters.
//!
//! Filters look backward in time, so relative expressions resolve to the
//! past: `monday` is the most recent Monday, `3 days ago` is three days
//! before today.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Parse a date expression relative to `today`.
///
/// Supports:
/// - `today`, `yesterday`
/// - `3 days ago`, `2 weeks ago`, `7d`, `2w`
/// - `monday`, `tue`, ... (most recent, today included)
/// - `2026-03-10` (ISO format)
///
/// Returns `None` if the input cannot be parsed or lands outside the
/// representable calendar.
#[must_use]
pub fn parse_date(input: &str, today: NaiveDate) -> Option<NaiveDate> {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "today" => return Some(today),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
        return Some(date);
    }

    if let Some(days) = parse_days_back(&input) {
        return today.checked_sub_days(Days::new(days));
    }

    parse_weekday(&input).and_then(|weekday| most_recent(weekday, today))
}

/// Parse `N days ago`, `N weeks ago`, `Nd`, `Nw` into a day count.
fn parse_days_back(input: &str) -> Option<u64> {
    let input = input.strip_suffix(" ago").unwrap_or(input).trim();

    let (number, unit) = match input.split_once(' ') {
        Some((n, unit)) => (n, unit.trim()),
        None => {
            let split = input.find(|c: char| !c.is_ascii_digit())?;
            input.split_at(split)
        }
    };

    let n: u64 = number.parse().ok()?;
    match unit {
        "d" | "day" | "days" => Some(n),
        "w" | "week" | "weeks" => n.checked_mul(7),
        _ => None,
    }
}

fn parse_weekday(input: &str) -> Option<Weekday> {
    match input {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn most_recent(weekday: Weekday, today: NaiveDate) -> Option<NaiveDate> {
    let today_num = today.weekday().num_days_from_monday();
    let target_num = weekday.num_days_from_monday();
    let back = (today_num + 7 - target_num) % 7;
    today.checked_sub_days(Days::new(u64::from(back)))
}
