//! Heuristic relevance scoring for free-text queries.
//!
//! Each announcement gets an integer score from four mutually exclusive
//! tiers, checked in order; the first tier that applies decides:
//!
//! 1. The raw phrase appears verbatim in the combined text: 100, plus 50
//!    when it also appears in the title.
//! 2. The phrase with stop words removed appears in the stop-word-stripped
//!    combined text: 80, plus 40 for a stripped-title hit.
//! 3. At least two keywords present: 60 plus 10 per keyword beyond the
//!    second. Keywords found in the title add half a point each before the
//!    threshold check, so a lone title keyword cannot fake a second match.
//! 4. A single keyword present anywhere: 20, plus 10 in the title.
//!
//! Score 0 means no match; those records are dropped from ranked output.
//! All matching is case-insensitive substring containment.

use crate::model::announcement::Announcement;

/// Common function words excluded from keyword matching.
const STOP_WORDS: [&str; 50] = [
    "a", "about", "after", "all", "an", "and", "any", "are", "as", "at", "be", "been", "being",
    "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have", "in",
    "into", "is", "it", "its", "may", "might", "must", "of", "on", "or", "shall", "should", "that",
    "the", "their", "this", "to", "was", "were", "will", "with", "would", "when", "what",
];

/// Minimum keyword length; shorter tokens are noise.
const MIN_KEYWORD_LEN: usize = 3;

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Drop stop-word tokens and rejoin with single spaces.
fn strip_stop_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|t| !is_stop_word(t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stop-word-filtered tokens of at least [`MIN_KEYWORD_LEN`] characters,
/// in phrase order.
fn keywords_of(phrase: &str) -> Vec<&str> {
    phrase
        .split_whitespace()
        .filter(|t| !is_stop_word(t) && t.len() >= MIN_KEYWORD_LEN)
        .collect()
}

/// Score one announcement against a search phrase.
pub fn score(announcement: &Announcement, phrase: &str) -> u32 {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return 0;
    }

    let title = announcement.title.to_lowercase();
    let combined = announcement.searchable_text();

    // Tier 1: verbatim phrase
    if combined.contains(&phrase) {
        return if title.contains(&phrase) { 150 } else { 100 };
    }

    // Tier 2: phrase and text compared with stop words removed, so
    // "lemonade cookie sale" still matches "Lemonade and Cookie Sale"
    let clean_phrase = strip_stop_words(&phrase);
    if !clean_phrase.is_empty() && strip_stop_words(&combined).contains(&clean_phrase) {
        return if strip_stop_words(&title).contains(&clean_phrase) {
            120
        } else {
            80
        };
    }

    let keywords = keywords_of(&phrase);

    // Tier 3: multi-keyword match. Title hits count an extra half point;
    // the threshold compares the fractional total.
    if keywords.len() >= 2 {
        let mut count = 0.0_f64;
        for &kw in &keywords {
            if combined.contains(kw) {
                count += 1.0;
                if title.contains(kw) {
                    count += 0.5;
                }
            }
        }
        if count >= 2.0 {
            return (60.0 + 10.0 * (count - 2.0)) as u32;
        }
    }

    // Tier 4: first keyword found anywhere
    for &kw in &keywords {
        if combined.contains(kw) {
            return if title.contains(kw) { 30 } else { 20 };
        }
    }

    0
}

/// Score a batch, drop non-matches, and sort best-first.
///
/// The sort is stable, so records with equal scores keep their input
/// order (typically the store's own ordering).
pub fn rank(records: Vec<Announcement>, phrase: &str) -> Vec<Announcement> {
    let mut scored: Vec<(Announcement, u32)> = records
        .into_iter()
        .filter_map(|r| {
            let s = score(&r, phrase);
            (s > 0).then_some((r, s))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(r, _)| r).collect()
}
