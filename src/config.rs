//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{HrqlError, Result};

/// Fuzzy score needed to accept a single-word keyword match.
pub const DEFAULT_WORD_MATCH_THRESHOLD: u8 = 50;

/// Fuzzy score needed to accept a phrase match inside the parser.
pub const DEFAULT_PHRASE_MATCH_THRESHOLD: u8 = 80;

/// Row limit used by top/bottom questions that name no number.
pub const DEFAULT_LIMIT: usize = 5;

/// Configuration for question interpretation and execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum fuzzy score (0-100) for single-word keyword extraction.
    pub word_match_threshold: u8,
    /// Minimum fuzzy score (0-100) for phrase-to-column inference.
    pub phrase_match_threshold: u8,
    /// Limit applied when a top/bottom question names no number.
    pub default_limit: usize,
    /// Keep every row tied with the last one inside a group-top cutoff.
    pub keep_group_top_ties: bool,
    /// Number of recent user turns consulted for context.
    pub history_window: usize,
    /// Maximum columns appended when expanding a previous query.
    pub follow_up_extra_columns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            word_match_threshold: DEFAULT_WORD_MATCH_THRESHOLD,
            phrase_match_threshold: DEFAULT_PHRASE_MATCH_THRESHOLD,
            default_limit: DEFAULT_LIMIT,
            keep_group_top_ties: true,
            history_window: 3,
            follow_up_extra_columns: 2,
        }
    }
}

impl EngineConfig {
    /// Creates a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the single-word fuzzy match threshold.
    #[must_use]
    pub fn with_word_match_threshold(mut self, threshold: u8) -> Self {
        self.word_match_threshold = threshold;
        self
    }

    /// Sets the phrase fuzzy match threshold.
    #[must_use]
    pub fn with_phrase_match_threshold(mut self, threshold: u8) -> Self {
        self.phrase_match_threshold = threshold;
        self
    }

    /// Sets the default top/bottom limit.
    #[must_use]
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    /// Sets whether group-top keeps ties at the cutoff.
    #[must_use]
    pub fn with_group_top_ties(mut self, keep: bool) -> Self {
        self.keep_group_top_ties = keep;
        self
    }

    /// Sets the number of recent user turns used for context.
    #[must_use]
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    /// Sets how many columns a follow-up may append.
    #[must_use]
    pub fn with_follow_up_extra_columns(mut self, columns: usize) -> Self {
        self.follow_up_extra_columns = columns;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - a threshold is above 100
    /// - `default_limit` is 0
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("word_match_threshold", self.word_match_threshold),
            ("phrase_match_threshold", self.phrase_match_threshold),
        ] {
            if value > 100 {
                return Err(HrqlError::ValidationError(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }

        if self.default_limit == 0 {
            return Err(HrqlError::ValidationError(
                "default_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
