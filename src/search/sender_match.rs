//! Sender-name matching strategies.
//!
//! The sender filter contract is case-insensitive substring containment.
//! [`JaroWinkler`] can be layered behind it as a second pass for typo'd
//! names ("Siera Robins"), enabled via the `[search]` config section.

use strsim::jaro_winkler;

/// Decides whether a record's sender field matches a wanted name.
pub trait SenderMatcher: Send + Sync {
    fn matches(&self, sender: &str, wanted: &str) -> bool;
}

/// Case-insensitive substring containment, the default strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Substring;

impl SenderMatcher for Substring {
    fn matches(&self, sender: &str, wanted: &str) -> bool {
        sender.to_lowercase().contains(&wanted.to_lowercase())
    }
}

/// Jaro-Winkler similarity against the full sender name and against each
/// whitespace-separated part of it.
#[derive(Debug, Clone, Copy)]
pub struct JaroWinkler {
    /// Similarity cutoff in `0.0..=1.0`; matches at or above it count.
    pub threshold: f64,
}

impl Default for JaroWinkler {
    fn default() -> Self {
        Self { threshold: 0.85 }
    }
}

impl SenderMatcher for JaroWinkler {
    fn matches(&self, sender: &str, wanted: &str) -> bool {
        let sender = sender.to_lowercase();
        let wanted = wanted.to_lowercase();
        if jaro_winkler(&sender, &wanted) >= self.threshold {
            return true;
        }
        sender
            .split_whitespace()
            .any(|part| jaro_winkler(part, &wanted) >= self.threshold)
    }
}
