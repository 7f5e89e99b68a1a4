//! Search engine: filter criteria, the combined pipeline, and ranking.

pub mod filters;
pub mod relevance;
pub mod sender_match;

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use crate::model::announcement::Announcement;
use crate::parser::date_expr;
use crate::store::AnnouncementStore;

use self::sender_match::SenderMatcher;

/// Optional criteria for one search invocation.
///
/// Empty or whitespace-only strings count as "not given", so callers can
/// pass through CLI arguments unexamined.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Free-text query, ranked by relevance.
    pub search_text: Option<String>,
    /// Sender name, matched as a case-insensitive substring.
    pub sender_name: Option<String>,
    /// Free-text date expression ("in May", "last week", "2025-05-10").
    pub date_query: Option<String>,
}

impl SearchCriteria {
    fn cleaned(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// What one pipeline run produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Matching records, best-first when a text query was given.
    pub announcements: Vec<Announcement>,
    /// Human-readable summary of the applied filters and the result count.
    pub message: String,
    /// Set when the run degraded: unparseable date query or store failure.
    /// The record list is empty in that case.
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn count(&self) -> usize {
        self.announcements.len()
    }

    fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            announcements: Vec::new(),
            error: Some(message.clone()),
            message,
        }
    }
}

/// The combined sender → date → text filter pipeline.
///
/// Filters always run in that order. When the structured filters (sender,
/// date) leave nothing but a text query is present, the text search runs
/// over the full corpus instead, so a misspelled sender cannot suppress a
/// genuine text match.
///
/// The pipeline holds no global state; build one per store. [`run`] never
/// returns an error: every failure mode is folded into the outcome.
///
/// [`run`]: SearchPipeline::run
pub struct SearchPipeline<S> {
    store: S,
    fuzzy_sender: Option<Box<dyn SenderMatcher>>,
}

impl<S: AnnouncementStore> SearchPipeline<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            fuzzy_sender: None,
        }
    }

    /// Add a second-pass sender matcher, tried only when the substring
    /// filter matches nothing.
    pub fn with_fuzzy_sender(mut self, matcher: impl SenderMatcher + 'static) -> Self {
        self.fuzzy_sender = Some(Box::new(matcher));
        self
    }

    /// Run the pipeline with the ambient clock.
    pub fn run(&self, criteria: &SearchCriteria) -> SearchOutcome {
        self.run_at(Utc::now(), criteria)
    }

    /// Run the pipeline against an explicit `now`.
    ///
    /// Date expressions like "last week" resolve relative to `now`, so
    /// tests pass a fixed instant and get deterministic ranges.
    pub fn run_at(&self, now: DateTime<Utc>, criteria: &SearchCriteria) -> SearchOutcome {
        let text = SearchCriteria::cleaned(&criteria.search_text);
        let sender = SearchCriteria::cleaned(&criteria.sender_name);
        let date_query = SearchCriteria::cleaned(&criteria.date_query);

        let all = match self.store.fetch_all() {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Could not fetch announcements");
                return SearchOutcome::failed(format!("Error fetching announcements: {e}"));
            }
        };

        let mut working = all.clone();
        let mut applied: Vec<String> = Vec::new();
        let mut narrowed = false;

        if let Some(wanted) = sender {
            let matched = filters::by_sender(&working, wanted);
            working = if matched.is_empty() {
                match self.fuzzy_sender.as_deref() {
                    Some(matcher) => {
                        debug!(sender = wanted, "No substring sender match, trying fuzzy pass");
                        filters::by_sender_with(&working, wanted, matcher)
                    }
                    None => matched,
                }
            } else {
                matched
            };
            narrowed = true;
            applied.push(format!("from sender '{wanted}'"));
        }

        if let Some(dq) = date_query {
            let range = match date_expr::parse(dq, now) {
                Some(range) => range,
                None => {
                    return SearchOutcome::failed(format!(
                        "Could not parse date query '{dq}'. Please try a different format."
                    ));
                }
            };
            debug!(range = %range, "Applying date filter");
            working = filters::by_date_range(&working, range);
            narrowed = true;
            applied.push(format!(
                "sent between {} and {}",
                range.start.format("%Y-%m-%d"),
                range.end.format("%Y-%m-%d")
            ));
        }

        let mut fell_back = false;
        if let Some(phrase) = text {
            if working.is_empty() && narrowed {
                // Structured filters left nothing; rank the whole corpus
                fell_back = true;
                working = all;
            }
            working = relevance::rank(working, phrase);
            applied.insert(0, format!("matching '{phrase}'"));
        }

        let mut message = if applied.is_empty() {
            format!("Found {} announcement(s).", working.len())
        } else {
            format!("Found {} announcement(s) {}.", working.len(), applied.join(" "))
        };
        if fell_back {
            message.push_str(" Sender/date filters matched nothing; searched the whole feed instead.");
        }

        debug!(count = working.len(), "Search pipeline finished");
        SearchOutcome {
            announcements: working,
            message,
            error: None,
        }
    }
}
