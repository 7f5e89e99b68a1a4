//! Tolerant parsing of the `SentTime` field.
//!
//! Records reach the store through several ingestion paths and carry
//! timestamps in whatever shape the upstream portal produced: ISO 8601 with
//! or without offset, `M/D/YYYY h:mmam` exports, bare dates. Values without
//! an explicit offset are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use tracing::warn;

/// Naive date-time formats tried after the ISO 8601 attempts, in order.
const DATETIME_FORMATS: [&str; 5] = [
    "%m/%d/%Y %I:%M%p",  // 5/7/2025 2:29pm
    "%m/%d/%Y %H:%M",    // 5/7/2025 14:29
    "%Y-%m-%d %I:%M%p",  // 2025-05-07 2:29pm
    "%Y-%m-%d %H:%M:%S", // 2025-05-07 14:29:03
    "%Y-%m-%d %H:%M",    // 2025-05-07 14:29
];

/// Date-only formats; the time defaults to midnight.
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];

/// Parse a `SentTime` value into a UTC instant.
///
/// Returns `None` when no known format matches. Callers treat such records
/// as having an unknown date rather than failing the whole operation.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // ISO 8601 / RFC 3339 with offset ("Z", "+02:00")
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    // ISO 8601 without offset, optional fractional seconds
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    // A trailing timezone abbreviation ("… EST") defeats the naive formats
    let stripped = strip_tz_abbrev(trimmed);
    let candidate = stripped.as_deref().unwrap_or(trimmed);

    for fmt in &DATETIME_FORMATS {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(candidate, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    for fmt in &DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
            return d
                .and_hms_opt(0, 0, 0)
                .map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }

    warn!(sent_time = raw, "Could not parse SentTime");
    None
}

/// Strip a trailing 3-4 letter uppercase timezone abbreviation, if any.
/// The wall-clock time is kept and interpreted as UTC.
fn strip_tz_abbrev(s: &str) -> Option<String> {
    let (head, tail) = s.rsplit_once(' ')?;
    if (3..=4).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_uppercase()) {
        Some(head.trim_end().to_string())
    } else {
        None
    }
}
