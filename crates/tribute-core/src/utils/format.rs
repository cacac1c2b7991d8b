use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

/// Format a millisecond timestamp in local time, e.g. "Mar 01, 2024 12:00 PM".
/// Zero or out-of-range timestamps render as an empty string.
pub fn format_timestamp(ms: i64) -> String {
    format_timestamp_in(ms, &Local)
}

pub fn format_timestamp_in<Tz>(ms: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if ms == 0 {
        return String::new();
    }
    match DateTime::from_timestamp_millis(ms) {
        Some(dt) => dt.with_timezone(tz).format("%b %d, %Y %I:%M %p").to_string(),
        None => String::new(),
    }
}

/// Truncate a string to a maximum length in characters, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}
