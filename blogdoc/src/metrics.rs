//! Word count and read time
//!
//! Derived from serialized markup on every content change.

use crate::editor::Change;
use crate::editor_config::MetricsConfig;
use regex::Regex;
use std::sync::OnceLock;

/// Word count and estimated read time of the content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentMetrics {
    pub word_count: usize,
    pub read_time_minutes: usize,
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Count words in markup
///
/// Every tag is replaced by a space, so adjacent blocks never run their
/// words together.
pub fn word_count(markup: &str) -> usize {
    tag_regex()
        .replace_all(markup, " ")
        .split_whitespace()
        .count()
}

/// Minutes needed to read `words` at `words_per_minute`, rounded up
pub fn read_time_minutes(words: usize, words_per_minute: usize) -> usize {
    words.div_ceil(words_per_minute.max(1))
}

/// Compute metrics for markup
pub fn measure(markup: &str, words_per_minute: usize) -> ContentMetrics {
    let word_count = word_count(markup);
    ContentMetrics {
        word_count,
        read_time_minutes: read_time_minutes(word_count, words_per_minute),
    }
}

/// Keeps metrics current as change notifications arrive
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    words_per_minute: usize,
    current: ContentMetrics,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

impl MetricsEngine {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            words_per_minute: config.words_per_minute as usize,
            current: ContentMetrics::default(),
        }
    }

    /// Recompute from a change notification
    pub fn on_change(&mut self, change: &Change) -> ContentMetrics {
        self.update(&change.markup)
    }

    pub fn update(&mut self, markup: &str) -> ContentMetrics {
        self.current = measure(markup, self.words_per_minute);
        self.current
    }

    pub fn current(&self) -> ContentMetrics {
        self.current
    }
}
