//! Compiled pattern library.
//!
//! All match rules — injection category signatures and the sensitive-field
//! heuristics used by the masker — are compiled here exactly once at startup
//! and shared read-only (typically behind an `Arc`). Concurrent reads from
//! many in-flight requests need no synchronization. Every pattern is a
//! string constant; compilation failures are programmer errors caught by
//! the test suite.

use regex::Regex;

/// Injection category names, as reported in validation outcomes.
pub const CAT_TAUTOLOGY: &str = "tautology";
pub const CAT_UNION_SELECT: &str = "union-select";
pub const CAT_COMMENT_TRUNCATION: &str = "comment-truncation";
pub const CAT_STACKED_STATEMENTS: &str = "stacked-statements";
pub const CAT_TIMING_PROBE: &str = "timing-probe";
pub const CAT_OUT_OF_BAND: &str = "out-of-band";

/// A named set of signatures for one injection technique.
#[derive(Debug, Clone)]
pub struct PatternCategory {
    pub name: &'static str,
    pub patterns: Vec<Regex>,
}

impl PatternCategory {
    fn new(name: &'static str, patterns: &[&str]) -> Self {
        Self {
            name,
            patterns: patterns
                .iter()
                .map(|p| Regex::new(p).expect("Invalid injection pattern"))
                .collect(),
        }
    }

    /// True if any signature in this category matches.
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }
}

/// Immutable set of compiled match rules.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    /// Injection categories, matched independently and non-exclusively.
    pub injection: Vec<PatternCategory>,
    /// `OR/AND <number> = <number>` — a tautology when both sides are equal.
    pub numeric_comparison: Regex,
    /// `UNION [ALL] SELECT`, also combined with `information_schema` for the
    /// out-of-band category.
    pub union_select: Regex,
    /// Sensitive field-name heuristic for the masker.
    pub sensitive_key: Regex,
    /// Card-like digit run (13–19 digits) in free text.
    pub card_number: Regex,
}

impl PatternLibrary {
    pub fn new() -> Self {
        let union_select =
            Regex::new(r"(?i)\bUNION\s+(?:ALL\s+)?SELECT\b").expect("Invalid UNION pattern");

        let injection = vec![
            PatternCategory::new(
                CAT_TAUTOLOGY,
                &[
                    r"(?i)\bOR\s*''\s*=\s*''",
                    r"(?i)'\s*OR\s*''\s*=\s*'",
                    r"(?i)\bOR\s+TRUE\b",
                ],
            ),
            PatternCategory {
                name: CAT_UNION_SELECT,
                patterns: vec![union_select.clone()],
            },
            PatternCategory::new(
                CAT_COMMENT_TRUNCATION,
                &[r#"['"`]\s*--"#, r#"['"`]\s*/\*"#],
            ),
            PatternCategory::new(
                CAT_STACKED_STATEMENTS,
                &[
                    r"(?i);\s*(?:SELECT|INSERT|UPDATE|DELETE|DROP|ALTER|CREATE|TRUNCATE|GRANT|REVOKE|EXEC|EXECUTE|MERGE)\b",
                ],
            ),
            PatternCategory::new(
                CAT_TIMING_PROBE,
                &[
                    r"(?i)\b(?:SLEEP|BENCHMARK|PG_SLEEP)\s*\(",
                    r"(?i)\bWAITFOR\s+DELAY\b",
                    r"(?i)\bIF\s*\(\s*\d+\s*[=<>]",
                ],
            ),
            PatternCategory::new(
                CAT_OUT_OF_BAND,
                &[
                    r"(?i)\bLOAD_FILE\s*\(",
                    r"(?i)\bINTO\s+(?:OUT|DUMP)FILE\b",
                ],
            ),
        ];

        Self {
            injection,
            numeric_comparison: Regex::new(r"(?i)\b(?:OR|AND)\s+(\d+)\s*=\s*(\d+)")
                .expect("Invalid numeric comparison pattern"),
            union_select,
            sensitive_key: Regex::new(
                r"(?i)(password|passwd|pwd|secret|token|api[_-]?key|private[_-]?key|ssn|social[_-]?security|credit[_-]?card|card[_-]?number|cvv|email|phone|authorization|access[_-]?key)",
            )
            .expect("Invalid sensitive key pattern"),
            card_number: Regex::new(r"\b[0-9]{13,19}\b").expect("Invalid card number pattern"),
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}
