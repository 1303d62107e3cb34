//! Column resolver: maps user vocabulary onto canonical column names.
//!
//! Resolution first looks for a curated alias inside the phrase and falls
//! back to fuzzy similarity against every canonical name. An alias hit always
//! wins with confidence 100; a fuzzy candidate is only accepted at or above
//! the caller's threshold.

mod fuzzy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::ColumnCatalog;
use crate::text::{contains_phrase, is_stop_word, words};

pub use fuzzy::{ratio, sorted_tokens, token_sort_ratio};

/// Confidence below which a fuzzy interpretation is reported to the user.
pub const NOTE_CONFIDENCE: u8 = 90;

/// Outcome of resolving a phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Matched canonical column, if any.
    pub column: Option<String>,
    /// Confidence 0..=100. Alias hits report 100, misses report 0.
    pub confidence: u8,
    /// True when the match came from the alias table.
    pub via_alias: bool,
}

impl Resolution {
    fn miss() -> Self {
        Resolution {
            column: None,
            confidence: 0,
            via_alias: false,
        }
    }
}

/// A question word that resolved to a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub word: String,
    pub column: String,
    pub confidence: u8,
    pub via_alias: bool,
}

impl KeywordMatch {
    /// Returns the note shown when a word was interpreted loosely.
    #[must_use]
    pub fn interpretation_note(&self) -> Option<String> {
        (!self.via_alias && self.confidence < NOTE_CONFIDENCE).then(|| {
            format!(
                "Interpreting '{}' as '{}' (similarity: {}%)",
                self.word, self.column, self.confidence
            )
        })
    }
}

/// Resolves phrases against a column catalog.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    catalog: Arc<ColumnCatalog>,
}

impl ColumnResolver {
    /// Creates a resolver over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<ColumnCatalog>) -> Self {
        ColumnResolver { catalog }
    }

    /// Returns the catalog this resolver reads.
    #[must_use]
    pub fn catalog(&self) -> &ColumnCatalog {
        &self.catalog
    }

    /// Returns the column whose alias occurs in the phrase, longest alias first.
    /// Aliases only match whole words.
    #[must_use]
    pub fn alias_lookup(&self, phrase: &str) -> Option<&str> {
        let lower = phrase.to_lowercase();
        self.catalog
            .alias_entries()
            .into_iter()
            .find(|(alias, _)| contains_phrase(&lower, alias))
            .map(|(_, column)| column)
    }

    /// Resolves a phrase to a column, accepting fuzzy matches at or above `threshold`.
    #[must_use]
    pub fn resolve(&self, phrase: &str, threshold: u8) -> Resolution {
        if let Some(column) = self.alias_lookup(phrase) {
            return Resolution {
                column: Some(column.to_string()),
                confidence: 100,
                via_alias: true,
            };
        }

        let mut best: Option<(&str, u8)> = None;
        for name in self.catalog.names() {
            let score = token_sort_ratio(phrase, name);
            // Strictly greater keeps the first candidate on ties
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((name, score));
            }
        }

        match best {
            Some((name, score)) if score >= threshold && score > 0 => Resolution {
                column: Some(name.to_string()),
                confidence: score,
                via_alias: false,
            },
            _ => Resolution::miss(),
        }
    }

    /// Resolves each non-filler word of a question on its own.
    #[must_use]
    pub fn extract_keywords(&self, question: &str, threshold: u8) -> Vec<KeywordMatch> {
        let lower = question.to_lowercase();
        let mut matches = Vec::new();
        for word in words(&lower) {
            if is_stop_word(word) || word.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let resolution = self.resolve(word, threshold);
            if let Some(column) = resolution.column {
                matches.push(KeywordMatch {
                    word: word.to_string(),
                    column,
                    confidence: resolution.confidence,
                    via_alias: resolution.via_alias,
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::columns;

    fn resolver() -> ColumnResolver {
        ColumnResolver::new(Arc::new(ColumnCatalog::employees()))
    }

    #[test]
    fn test_alias_wins_with_full_confidence() {
        let r = resolver().resolve("dept", 80);
        assert_eq!(r.column.as_deref(), Some(columns::DEPARTMENT));
        assert_eq!(r.confidence, 100);
        assert!(r.via_alias);
    }

    #[test]
    fn test_misspelling_aliases() {
        let r = resolver();
        assert_eq!(r.resolve("sallary", 80).column.as_deref(), Some(columns::ANNUAL_SALARY));
        assert_eq!(
            r.resolve("perfomance", 80).column.as_deref(),
            Some(columns::PERFORMANCE_SCORE)
        );
        assert_eq!(
            r.resolve("satisfcation", 80).column.as_deref(),
            Some(columns::SATISFACTION_SCORE)
        );
    }

    #[test]
    fn test_longest_alias_first() {
        let r = resolver().resolve("performance level", 80);
        assert_eq!(r.column.as_deref(), Some(columns::PERFORMANCE_LEVEL));
    }

    #[test]
    fn test_alias_needs_word_boundary() {
        // "average" must not hit the "age" alias
        let r = resolver().resolve("average", 80);
        assert_ne!(r.column.as_deref(), Some(columns::AGE));
    }

    #[test]
    fn test_partial_word_falls_to_fuzzy() {
        let r = resolver().resolve("departmental", 80);
        assert_eq!(r.column.as_deref(), Some(columns::DEPARTMENT));
        assert!(!r.via_alias);
        assert!(r.confidence < 100);
    }

    #[test]
    fn test_fuzzy_threshold() {
        let r = resolver();
        let loose = r.resolve("overtme", 50);
        assert_eq!(loose.column.as_deref(), Some(columns::OVERTIME_HOURS));
        assert!(!loose.via_alias);
        let strict = r.resolve("overtme", 80);
        assert_eq!(strict.column, None);
        assert_eq!(strict.confidence, 0);
    }

    #[test]
    fn test_extract_keywords_notes() {
        let matches = resolver().extract_keywords("what is the overtme for dept", 50);
        let overtime = matches.iter().find(|m| m.word == "overtme").unwrap();
        assert_eq!(overtime.column, columns::OVERTIME_HOURS);
        let note = overtime.interpretation_note().unwrap();
        assert!(note.starts_with("Interpreting 'overtme' as 'Overtime_Hours'"));

        let dept = matches.iter().find(|m| m.word == "dept").unwrap();
        assert!(dept.interpretation_note().is_none());
        assert!(matches.iter().all(|m| m.word != "the"));
    }
}
