use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Timestamp format used in task files.
pub const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted due-date input formats, tried in order.
const INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized due date {input:?}")]
pub struct ParseDueDateError {
    pub input: String,
}

/// Parse user-supplied due-date text.
///
/// A bare date is taken as midnight of that day. Callers at the mutation
/// boundary map `Err` to "retain the previous value"; the parse outcome is
/// explicit so that policy lives with the caller, not inside a catch-all.
pub fn parse_due_date(raw: &str) -> Result<NaiveDateTime, ParseDueDateError> {
    let raw = raw.trim();

    for format in INPUT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }

    Err(ParseDueDateError {
        input: raw.to_string(),
    })
}

/// Render a timestamp in the task-file format.
pub fn format_stamp(value: NaiveDateTime) -> String {
    value.format(STAMP_FORMAT).to_string()
}

/// Parse a timestamp in the task-file format.
pub fn parse_stamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), STAMP_FORMAT).ok()
}
