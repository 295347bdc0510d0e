// 📒 Entry Model - one advertising-spend record
// The collection of entries is the unit of persistence

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical month names, in calendar order (January = index 0)
pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Lowest year the entry form accepts. Storage never enforces it.
pub const MIN_YEAR: i32 = 2026;

/// Calendar index of a canonical month name (January = 0)
pub fn month_index(month: &str) -> Option<usize> {
    MONTHS.iter().position(|m| *m == month)
}

// ============================================================================
// MEDIA TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Radio,
    Digital,
}

impl MediaType {
    /// Breakdown row order
    pub const ALL: [MediaType; 2] = [MediaType::Radio, MediaType::Digital];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Radio => "Radio",
            MediaType::Digital => "Digital",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ENTRY
// ============================================================================

/// Advertising spend entry
/// Field names match the dashboard's JSON (`mediaType` is camelCase)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Assigned by the writer at creation time, never changes afterwards
    pub id: String,

    pub vendor: String,

    pub location: String,

    /// One of `MONTHS`
    pub month: String,

    /// Numeric text, e.g. "2026"
    pub year: String,

    pub media_type: MediaType,

    /// String-encoded decimal, parsed on every aggregation
    pub amount: String,
}

impl Entry {
    /// Generate an id from the current timestamp (milliseconds since epoch)
    pub fn next_id() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Breakdown bucket key: "<month> <year>"
    pub fn period_key(&self) -> String {
        format!("{} {}", self.month, self.year)
    }

    /// Amount parsed the way the dashboard parses it (see `parse_amount`)
    pub fn amount_value(&self) -> f64 {
        parse_amount(&self.amount)
    }
}

/// Best-effort decimal parse.
///
/// Skips leading whitespace and uses the longest numeric prefix, so
/// `"12.5abc"` is 12.5. Text without a numeric prefix yields NaN, which is
/// left for the caller to guard against.
pub fn parse_amount(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    if text[end..].starts_with("Infinity") {
        let value = f64::INFINITY;
        return if text.starts_with('-') { -value } else { value };
    }

    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when it has at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().unwrap_or(f64::NAN)
}
