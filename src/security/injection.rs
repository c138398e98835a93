//! Heuristic SQL injection classifier.
//!
//! Matches category signatures against the quote-aware projection of the
//! query, so content inside legitimate string literals can never trigger a
//! category. Categories are matched independently and non-exclusively; any
//! match is sufficient to flag the query. False positives are preferred over
//! false negatives here.

use crate::security::patterns::{
    PatternLibrary, CAT_OUT_OF_BAND, CAT_TAUTOLOGY,
};
use crate::security::scanner::NormalizedQuery;
use std::sync::Arc;
use tracing::warn;

/// SQL injection classifier.
#[derive(Debug, Clone)]
pub struct SqlInjectionClassifier {
    patterns: Arc<PatternLibrary>,
}

impl SqlInjectionClassifier {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Classify a query. Returns whether it looks like injection and the
    /// names of every matched category.
    pub fn classify(&self, query: &str) -> (bool, Vec<String>) {
        let normalized = NormalizedQuery::new(query);
        let text = &normalized.blanked;

        let mut matched: Vec<String> = self
            .patterns
            .injection
            .iter()
            .filter(|category| category.matches(text))
            .map(|category| category.name.to_string())
            .collect();

        // OR/AND <n>=<n> is a tautology only when both sides are equal; the
        // regex crate has no backreferences, so compare the captures here.
        if !matched.iter().any(|name| name == CAT_TAUTOLOGY) {
            let equal_literals = self
                .patterns
                .numeric_comparison
                .captures_iter(text)
                .any(|caps| caps[1] == caps[2]);
            if equal_literals {
                matched.insert(0, CAT_TAUTOLOGY.to_string());
            }
        }

        // Schema enumeration: information_schema is only suspicious when it
        // arrives through a UNION.
        if !matched.iter().any(|name| name == CAT_OUT_OF_BAND)
            && text.to_lowercase().contains("information_schema")
            && self.patterns.union_select.is_match(text)
        {
            matched.push(CAT_OUT_OF_BAND.to_string());
        }

        let is_injection = !matched.is_empty();
        if is_injection {
            warn!(categories = ?matched, "Injection patterns matched");
        }

        (is_injection, matched)
    }
}
