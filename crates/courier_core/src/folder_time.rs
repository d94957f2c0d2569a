//! Folder-name time codec.
//!
//! A scheduled post folder is named after its local publish time at minute
//! resolution: `YYYY.MM.DD-HH.MM`.

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

/// `chrono` format string matching the folder naming scheme.
pub const FOLDER_NAME_FORMAT: &str = "%Y.%m.%d-%H.%M";

static FOLDER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}\.\d{2}\.\d{2}-\d{2}\.\d{2}$").expect("folder name pattern is valid")
});

/// Format a local timestamp as a post folder name.
///
/// Seconds and below are dropped.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use courier_core::encode_folder_name;
///
/// let t = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(9, 5, 42).unwrap();
/// assert_eq!(encode_folder_name(&t), "2025.03.01-09.05");
/// ```
pub fn encode_folder_name(timestamp: &NaiveDateTime) -> String {
    timestamp.format(FOLDER_NAME_FORMAT).to_string()
}

/// Parse a post folder name back into a local timestamp.
///
/// Returns `None` unless the name matches the pattern exactly and names a
/// real calendar date and time.
///
/// # Examples
///
/// ```
/// use courier_core::decode_folder_name;
///
/// assert!(decode_folder_name("2025.03.01-09.00").is_some());
/// assert!(decode_folder_name("2025.3.1-9.00").is_none());
/// assert!(decode_folder_name("2025.02.30-09.00").is_none());
/// assert!(decode_folder_name("2025.03.01-09.00-1").is_none());
/// ```
pub fn decode_folder_name(name: &str) -> Option<NaiveDateTime> {
    if !FOLDER_NAME.is_match(name) {
        return None;
    }
    NaiveDateTime::parse_from_str(name, FOLDER_NAME_FORMAT).ok()
}

/// Whether `name` is a valid post folder name.
pub fn is_post_folder_name(name: &str) -> bool {
    decode_folder_name(name).is_some()
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(timestamp)
}
