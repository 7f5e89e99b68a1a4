//! Free-text date expression parsing.
//!
//! Turns queries like `"in May"`, `"last week"`, `"from 2025-01-01 to
//! 2025-03-31"` or `"2025-05-10"` into a concrete UTC [`DateRange`].
//!
//! Resolution runs in three stages; the first stage that matches wins:
//!
//! 1. **Month names.** Full English month names are scanned anywhere in the
//!    query, January through December. A hit yields that whole month of the
//!    current year. This stage runs first even when the query carries more
//!    structure: `"last week in May"` means the whole of May, and `"maybe
//!    tuesday"` hits May because "maybe" contains "may". Month mentions
//!    always denote the month.
//! 2. **Compound and relative ranges.** `"from X to Y"`, `"between X and
//!    Y"`, `"on X at Y"` (a one-hour window), and bare period tokens such
//!    as `"today"`, `"last week"`, `"this month"`, `"last year"`.
//! 3. **Single points.** An absolute date or date-time; a bare date covers
//!    that whole day.
//!
//! `None` means no stage recognized the query; callers surface that as an
//! unparseable date query rather than an empty result.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

/// A half-open UTC time range: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `t` falls inside the range. A range with `start >= end`
    /// contains nothing.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%Y-%m-%d %H:%M")
        )
    }
}

/// Full month names, index 0 = January.
const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Parse a free-text date expression relative to `now`.
///
/// `now` anchors every relative expression ("last week", "in May"), so
/// callers that need determinism pass a fixed instant.
pub fn parse(query: &str, now: DateTime<Utc>) -> Option<DateRange> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return None;
    }

    // Stage 1: month names anywhere in the query
    if let Some(range) = month_range(&q, now) {
        return Some(range);
    }

    // Stage 2: compound patterns and relative period tokens
    if let Some(range) = compound_range(&q, now) {
        return Some(range);
    }

    // Stage 3: a single point; a bare date covers that whole day
    parse_point(&q, now).map(|start| DateRange::new(start, start + Duration::days(1)))
}

/// Stage 1: scan for a full month name, January first.
fn month_range(query: &str, now: DateTime<Utc>) -> Option<DateRange> {
    for (idx, name) in MONTHS.iter().enumerate() {
        if query.contains(name) {
            let month = idx as u32 + 1;
            let year = now.year();
            let start = first_of_month(year, month)?;
            let end = if month == 12 {
                first_of_month(year + 1, 1)?
            } else {
                first_of_month(year, month + 1)?
            };
            return Some(DateRange::new(start, end));
        }
    }
    None
}

/// Stage 2: `from X to Y`, `between X and Y`, `on X at Y`, period tokens.
fn compound_range(query: &str, now: DateTime<Utc>) -> Option<DateRange> {
    if let Some((a, b)) = split_pair(query, "from ", " to ") {
        let start = parse_point(a, now)?;
        let end = parse_point_lenient(b, now)?;
        return Some(DateRange::new(start, end));
    }

    if let Some((a, b)) = split_pair(query, "between ", " and ") {
        let start = parse_point(a, now)?;
        let end = parse_point_lenient(b, now)?;
        return Some(DateRange::new(start, end));
    }

    if let Some((a, b)) = split_pair(query, "on ", " at ") {
        let date = parse_point(a, now)?;
        let time = parse_time_of_day(b)?;
        let start = Utc.from_utc_datetime(&date.date_naive().and_time(time));
        return Some(DateRange::new(start, start + Duration::hours(1)));
    }

    period_range(query, now)
}

/// Calendar periods named by a bare token. Weeks start on Monday; periods
/// end at 23:59:59.999999 of their last day. `last_week` and `last week`
/// are the same token.
fn period_range(query: &str, now: DateTime<Utc>) -> Option<DateRange> {
    let token = query
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let today = now.date_naive();

    let (first_day, last_day) = match token.as_str() {
        "today" => (today, today),
        "yesterday" => {
            let d = today - Duration::days(1);
            (d, d)
        }
        "this week" => {
            let monday = monday_of(today);
            (monday, monday + Duration::days(6))
        }
        "last week" => {
            let monday = monday_of(today) - Duration::days(7);
            (monday, monday + Duration::days(6))
        }
        "next week" => {
            let monday = monday_of(today) + Duration::days(7);
            (monday, monday + Duration::days(6))
        }
        "this month" => (
            today.with_day(1)?,
            last_of_month(today.year(), today.month())?,
        ),
        "last month" => {
            let prev = today.with_day(1)? - Duration::days(1);
            (prev.with_day(1)?, prev)
        }
        "next month" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            (
                NaiveDate::from_ymd_opt(year, month, 1)?,
                last_of_month(year, month)?,
            )
        }
        "this year" => (
            NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
            NaiveDate::from_ymd_opt(today.year(), 12, 31)?,
        ),
        "last year" => (
            NaiveDate::from_ymd_opt(today.year() - 1, 1, 1)?,
            NaiveDate::from_ymd_opt(today.year() - 1, 12, 31)?,
        ),
        _ => return None,
    };

    Some(DateRange::new(day_start(first_day), day_end(last_day)))
}

/// Parse one end of a compound pattern, or a stage-3 single point.
fn parse_point(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %I:%M%p",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];
    for fmt in &datetime_formats {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    let date_formats = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];
    for fmt in &date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(day_start(d));
        }
    }

    natural_point(trimmed, now)
}

/// Like [`parse_point`], but retries with just the first word when the full
/// text fails. Covers trailing words after the final endpoint, as in
/// `"from 2025-01-01 to 2025-03-31 please"`.
fn parse_point_lenient(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    parse_point(text, now).or_else(|| {
        let first = text.split_whitespace().next()?;
        if first == text.trim() {
            return None;
        }
        parse_point(first, now)
    })
}

/// Relative single points: today/tomorrow/yesterday, next/last weekday,
/// "in N days", "N weeks ago".
fn natural_point(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let today = now.date_naive();

    match text {
        "today" => return Some(day_start(today)),
        "tomorrow" => return Some(day_start(today + Duration::days(1))),
        "yesterday" => return Some(day_start(today - Duration::days(1))),
        _ => {}
    }

    if let Some(name) = text.strip_prefix("next ") {
        if let Some(target) = weekday_by_name(name) {
            let mut ahead = i64::from(target.num_days_from_monday())
                - i64::from(today.weekday().num_days_from_monday());
            ahead = ahead.rem_euclid(7);
            if ahead == 0 {
                ahead = 7;
            }
            return Some(day_start(today + Duration::days(ahead)));
        }
    }
    if let Some(name) = text.strip_prefix("last ") {
        if let Some(target) = weekday_by_name(name) {
            let mut behind = i64::from(today.weekday().num_days_from_monday())
                - i64::from(target.num_days_from_monday());
            behind = behind.rem_euclid(7);
            if behind == 0 {
                behind = 7;
            }
            return Some(day_start(today - Duration::days(behind)));
        }
    }

    // Offsets stay anchored to the current time of day, not midnight
    if let Some(rest) = text.strip_prefix("in ") {
        let (n, unit) = split_amount(rest)?;
        return Some(now + unit_duration(n, unit)?);
    }
    if let Some(rest) = text.strip_suffix(" ago") {
        let (n, unit) = split_amount(rest)?;
        return Some(now - unit_duration(n, unit)?);
    }

    None
}

/// Clock times accepted on the right side of `"on X at Y"`.
fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let trimmed = text.trim();
    for fmt in ["%H:%M:%S", "%H:%M", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"] {
        if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
            return Some(t);
        }
    }
    // Lenient retry without a trailing word ("at 14:00 sharp")
    let first = trimmed.split_whitespace().next()?;
    if first == trimmed {
        return None;
    }
    for fmt in ["%H:%M:%S", "%H:%M", "%I:%M%p"] {
        if let Ok(t) = NaiveTime::parse_from_str(first, fmt) {
            return Some(t);
        }
    }
    None
}

/// Find `"<lead>X<sep>Y"` anywhere in the query.
/// `X` runs up to the first occurrence of the separator.
fn split_pair<'a>(query: &'a str, lead: &str, sep: &str) -> Option<(&'a str, &'a str)> {
    let lead_pos = query.find(lead)?;
    let rest = &query[lead_pos + lead.len()..];
    let sep_pos = rest.find(sep)?;
    let a = rest[..sep_pos].trim();
    let b = rest[sep_pos + sep.len()..].trim();
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some((a, b))
}

fn weekday_by_name(name: &str) -> Option<Weekday> {
    WEEKDAYS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, wd)| *wd)
}

fn split_amount(text: &str) -> Option<(i64, &str)> {
    let (num, unit) = text.trim().split_once(' ')?;
    Some((num.trim().parse().ok()?, unit.trim()))
}

fn unit_duration(n: i64, unit: &str) -> Option<Duration> {
    match unit {
        "day" | "days" => Some(Duration::days(n)),
        "week" | "weeks" => Some(Duration::days(n * 7)),
        "month" | "months" => Some(Duration::days(n * 30)),
        _ => None,
    }
}

fn monday_of(d: NaiveDate) -> NaiveDate {
    d - Duration::days(i64::from(d.weekday().num_days_from_monday()))
}

fn last_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

fn first_of_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1).map(day_start)
}

fn day_start(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN))
}

/// Inclusive end-of-day instant used by calendar periods.
fn day_end(d: NaiveDate) -> DateTime<Utc> {
    let t = d
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("23:59:59.999999 is a valid wall-clock time");
    Utc.from_utc_datetime(&t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    /// Thursday 2025-05-15, mid-day.
    fn anchor() -> DateTime<Utc> {
        utc(2025, 5, 15, 12, 0, 0)
    }

    #[test]
    fn test_month_name_yields_whole_month() {
        let r = parse("January", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 2, 1, 0, 0, 0));

        let r = parse("in january", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_december_wraps_into_next_year() {
        let r = parse("december", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 12, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2026, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_name_beats_other_structure() {
        // Month scan runs first, so the "last week" part is ignored
        let r = parse("last week in may", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_name_matches_inside_words() {
        // "maybe" contains "may"
        let r = parse("maybe next tuesday", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 1, 0, 0, 0));
    }

    #[test]
    fn test_month_scan_order_is_january_first() {
        // Both month names present; the earlier calendar month wins
        let r = parse("march or january", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_from_to_range() {
        let r = parse("from 2025-01-01 to 2025-03-31", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 3, 31, 0, 0, 0));
    }

    #[test]
    fn test_from_to_embedded_in_sentence() {
        let r = parse("announcements from 2025-01-01 to 2025-02-01 please", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 1, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 2, 1, 0, 0, 0));
    }

    #[test]
    fn test_between_and_range() {
        let r = parse("between 2025-04-01 and 2025-04-15", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 4, 1, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 4, 15, 0, 0, 0));
    }

    #[test]
    fn test_on_at_is_one_hour_window() {
        let r = parse("on 2025-05-10 at 14:00", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 10, 14, 0, 0));
        assert_eq!(r.end, utc(2025, 5, 10, 15, 0, 0));
    }

    #[test]
    fn test_on_at_meridiem_time() {
        let r = parse("on 2025-06-01 at 2:30 pm", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 6, 1, 14, 30, 0));
        assert_eq!(r.end, utc(2025, 6, 1, 15, 30, 0));
    }

    #[test]
    fn test_today_covers_the_day() {
        let r = parse("today", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 15, 0, 0, 0));
        assert!(r.contains(anchor()));
        assert!(!r.contains(utc(2025, 5, 16, 0, 0, 0)));
    }

    #[test]
    fn test_yesterday() {
        let r = parse("yesterday", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 14, 0, 0, 0));
        assert!(!r.contains(utc(2025, 5, 15, 0, 0, 0)));
    }

    #[test]
    fn test_this_week_starts_monday() {
        // Anchor is Thursday 2025-05-15; that week's Monday is 05-12
        let r = parse("this week", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 12, 0, 0, 0));
        assert!(r.contains(utc(2025, 5, 18, 23, 59, 59)));
        assert!(!r.contains(utc(2025, 5, 19, 0, 0, 0)));
    }

    #[test]
    fn test_last_week() {
        let r = parse("last week", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 5, 0, 0, 0));
        assert!(r.contains(utc(2025, 5, 11, 12, 0, 0)));
        assert!(!r.contains(utc(2025, 5, 12, 0, 0, 0)));
    }

    #[test]
    fn test_next_week() {
        let r = parse("next week", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 19, 0, 0, 0));
    }

    #[test]
    fn test_underscore_period_token() {
        assert_eq!(
            parse("last_week", anchor()),
            parse("last week", anchor())
        );
    }

    #[test]
    fn test_this_month_boundaries() {
        let r = parse("this month", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 1, 0, 0, 0));
        assert!(r.contains(utc(2025, 5, 31, 23, 59, 59)));
        assert!(!r.contains(utc(2025, 6, 1, 0, 0, 0)));
    }

    #[test]
    fn test_last_month_boundaries() {
        let r = parse("last month", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 4, 1, 0, 0, 0));
        assert!(r.contains(utc(2025, 4, 30, 12, 0, 0)));
        assert!(!r.contains(utc(2025, 5, 1, 0, 0, 0)));
    }

    #[test]
    fn test_last_month_across_year_boundary() {
        let jan = utc(2025, 1, 10, 9, 0, 0);
        let r = parse("last month", jan).unwrap();
        assert_eq!(r.start, utc(2024, 12, 1, 0, 0, 0));
        assert!(r.contains(utc(2024, 12, 31, 23, 59, 59)));
    }

    #[test]
    fn test_last_year() {
        let r = parse("last year", anchor()).unwrap();
        assert_eq!(r.start, utc(2024, 1, 1, 0, 0, 0));
        assert!(r.contains(utc(2024, 12, 31, 23, 59, 59)));
        assert!(!r.contains(utc(2025, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_bare_date_covers_one_day() {
        let r = parse("2025-05-10", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 10, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 5, 11, 0, 0, 0));
        assert!(r.contains(utc(2025, 5, 10, 23, 59, 59)));
        assert!(!r.contains(utc(2025, 5, 11, 0, 0, 0)));
    }

    #[test]
    fn test_bare_slash_date() {
        let r = parse("5/10/2025", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 10, 0, 0, 0));
    }

    #[test]
    fn test_tomorrow_as_single_point() {
        let r = parse("tomorrow", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 16, 0, 0, 0));
        assert_eq!(r.end, utc(2025, 5, 17, 0, 0, 0));
    }

    #[test]
    fn test_next_weekday() {
        // Anchor Thursday; next Monday is 05-19
        let r = parse("next monday", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 19, 0, 0, 0));
        // Next Thursday skips today entirely
        let r = parse("next thursday", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 22, 0, 0, 0));
    }

    #[test]
    fn test_last_weekday() {
        // Anchor Thursday; last Friday is 05-09
        let r = parse("last friday", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 9, 0, 0, 0));
    }

    #[test]
    fn test_days_ago_anchors_to_time_of_day() {
        let r = parse("3 days ago", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 12, 12, 0, 0));
        assert_eq!(r.end, utc(2025, 5, 13, 12, 0, 0));
    }

    #[test]
    fn test_in_n_weeks() {
        let r = parse("in 2 weeks", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 29, 12, 0, 0));
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let r = parse("  In MAY  ", anchor()).unwrap();
        assert_eq!(r.start, utc(2025, 5, 1, 0, 0, 0));
    }

    #[test]
    fn test_unrecognized_is_none() {
        assert!(parse("whenever works", anchor()).is_none());
        assert!(parse("", anchor()).is_none());
        assert!(parse("   ", anchor()).is_none());
    }

    #[test]
    fn test_backward_range_contains_nothing() {
        let r = parse("from 2025-06-01 to 2025-01-01", anchor()).unwrap();
        assert!(r.start > r.end);
        assert!(!r.contains(utc(2025, 3, 1, 0, 0, 0)));
        assert!(!r.contains(r.start));
        assert!(!r.contains(r.end));
    }

    #[test]
    fn test_range_is_half_open() {
        let r = parse("from 2025-01-01 to 2025-02-01", anchor()).unwrap();
        assert!(r.contains(utc(2025, 1, 1, 0, 0, 0)));
        assert!(r.contains(utc(2025, 1, 31, 23, 59, 59)));
        assert!(!r.contains(utc(2025, 2, 1, 0, 0, 0)));
    }
}
