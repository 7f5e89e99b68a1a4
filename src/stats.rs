//! Feed summary helpers for the `stats` and `list` commands.

use chrono::{DateTime, Utc};

use crate::model::announcement::Announcement;
use crate::parser::sent_time;

/// Indices sorted by sent time (newest first by default).
///
/// Records with unparseable timestamps sort as oldest.
pub fn sort_by_sent_time(records: &[Announcement], ascending: bool) -> Vec<usize> {
    let keys: Vec<Option<DateTime<Utc>>> = records
        .iter()
        .map(|r| sent_time::parse(&r.sent_time))
        .collect();
    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.sort_by(|&a, &b| {
        let cmp = keys[a].cmp(&keys[b]);
        if ascending {
            cmp
        } else {
            cmp.reverse()
        }
    });
    indices
}

/// Oldest and newest parseable sent times across the records.
pub fn date_range(records: &[Announcement]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut bounds: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
    for r in records {
        if let Some(t) = sent_time::parse(&r.sent_time) {
            bounds = Some(match bounds {
                None => (t, t),
                Some((min, max)) => (min.min(t), max.max(t)),
            });
        }
    }
    bounds
}

/// Count how many records carry at least one usable attachment.
pub fn count_with_attachments(records: &[Announcement]) -> usize {
    records
        .iter()
        .filter(|r| r.first_attachment().is_some())
        .count()
}

/// The top N senders by announcement count. Ties break alphabetically so
/// the output is stable.
pub fn top_senders(records: &[Announcement], n: usize) -> Vec<(String, usize)> {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for r in records {
        if r.sent_by.is_empty() {
            continue;
        }
        *counts.entry(r.sent_by.clone()).or_default() += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::announcement::AttachmentRef;

    fn ann(sent_by: &str, sent_time: &str) -> Announcement {
        Announcement {
            sent_by: sent_by.to_string(),
            sent_time: sent_time.to_string(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<Announcement> {
        vec![
            ann("Sierra Robbins", "2025-05-07T14:29:00Z"),
            ann("Jane Smith", "2025-03-01T08:00:00Z"),
            ann("Sierra Robbins", "2025-05-20T08:15:00Z"),
            ann("Principal Ortega", "garbled"),
        ]
    }

    #[test]
    fn test_sort_newest_first() {
        let records = sample();
        let order = sort_by_sent_time(&records, false);
        assert_eq!(order[0], 2); // 2025-05-20
        assert_eq!(order[1], 0); // 2025-05-07
        assert_eq!(order[2], 1); // 2025-03-01
        assert_eq!(order[3], 3); // unparseable last
    }

    #[test]
    fn test_sort_ascending_puts_unparseable_first() {
        let records = sample();
        let order = sort_by_sent_time(&records, true);
        assert_eq!(order[0], 3);
        assert_eq!(order[3], 2);
    }

    #[test]
    fn test_date_range_skips_unparseable() {
        let (min, max) = date_range(&sample()).unwrap();
        assert_eq!(min.to_rfc3339(), "2025-03-01T08:00:00+00:00");
        assert_eq!(max.to_rfc3339(), "2025-05-20T08:15:00+00:00");
    }

    #[test]
    fn test_date_range_empty_or_all_unparseable() {
        assert!(date_range(&[]).is_none());
        assert!(date_range(&[ann("X", "garbled")]).is_none());
    }

    #[test]
    fn test_top_senders_counts_and_order() {
        let top = top_senders(&sample(), 10);
        assert_eq!(top[0], ("Sierra Robbins".to_string(), 2));
        assert_eq!(top.len(), 3);
        // Single-count ties come alphabetically
        assert_eq!(top[1].0, "Jane Smith");
        assert_eq!(top[2].0, "Principal Ortega");
    }

    #[test]
    fn test_top_senders_truncates() {
        let top = top_senders(&sample(), 1);
        assert_eq!(top.len(), 1);
    }

    #[test]
    fn test_count_with_attachments() {
        let mut records = sample();
        records[0].attachments.push(AttachmentRef {
            url: "https://files.example/a.pdf".to_string(),
            filename: "a.pdf".to_string(),
        });
        records[1].attachments.push(AttachmentRef::default()); // no url
        assert_eq!(count_with_attachments(&records), 1);
    }
}
