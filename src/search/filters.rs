//! Record-level filters: sender and date range.

use tracing::debug;

use crate::model::announcement::Announcement;
use crate::parser::date_expr::DateRange;
use crate::parser::sent_time;

use super::sender_match::{SenderMatcher, Substring};

/// Keep records whose sender field contains `wanted`, case-insensitively.
///
/// Callers skip the call entirely when no sender was asked for; an empty
/// `wanted` here matches every record.
pub fn by_sender(records: &[Announcement], wanted: &str) -> Vec<Announcement> {
    by_sender_with(records, wanted, &Substring)
}

/// Sender filter with an injected matching strategy.
pub fn by_sender_with(
    records: &[Announcement],
    wanted: &str,
    matcher: &dyn SenderMatcher,
) -> Vec<Announcement> {
    records
        .iter()
        .filter(|r| matcher.matches(&r.sent_by, wanted))
        .cloned()
        .collect()
}

/// Keep records whose parsed `SentTime` falls inside `range`.
///
/// Records whose timestamp no known format can parse are silently dropped
/// from the result, never treated as errors; each drop is logged by the
/// parser and counted here.
pub fn by_date_range(records: &[Announcement], range: DateRange) -> Vec<Announcement> {
    let mut unparseable = 0usize;
    let kept: Vec<Announcement> = records
        .iter()
        .filter(|r| match sent_time::parse(&r.sent_time) {
            Some(t) => range.contains(t),
            None => {
                unparseable += 1;
                false
            }
        })
        .cloned()
        .collect();

    if unparseable > 0 {
        debug!(
            unparseable,
            kept = kept.len(),
            "Date filter dropped records with unreadable SentTime"
        );
    }
    kept
}
