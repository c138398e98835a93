//! Statement-shape policy checks.
//!
//! Coarse allow-list rules applied before the injection classifier: single
//! statement only, read-only leading keyword, bounded length. These report
//! [`CheckKind::StatementPolicy`] so callers can tell "malformed" apart from
//! "malicious".

use crate::security::scanner::NormalizedQuery;
use crate::security::{CheckKind, ValidationOutcome};
use tracing::debug;

/// Leading keywords accepted for read-only analytic access.
const ALLOWED_LEADING_KEYWORDS: &[&str] =
    &["SELECT", "WITH", "SHOW", "DESCRIBE", "DESC", "EXPLAIN"];

/// Statement policy validator.
#[derive(Debug, Clone)]
pub struct StatementPolicyValidator {
    max_query_length: usize,
}

impl Default for StatementPolicyValidator {
    fn default() -> Self {
        Self {
            max_query_length: 10_000,
        }
    }
}

impl StatementPolicyValidator {
    pub fn new(max_query_length: usize) -> Self {
        Self { max_query_length }
    }

    /// Check a query against the statement policy.
    ///
    /// Operates on the quote-aware normalized text, so semicolons and
    /// keywords inside string literals never trip the policy.
    pub fn check_statement(&self, query: &str) -> ValidationOutcome {
        let normalized = NormalizedQuery::new(query);

        if normalized.has_stacked_statement() {
            return ValidationOutcome::rejected(
                CheckKind::StatementPolicy,
                "Multiple statements are not allowed",
            );
        }

        match normalized.leading_keyword() {
            Some(keyword) if ALLOWED_LEADING_KEYWORDS.contains(&keyword.as_str()) => {}
            Some(keyword) => {
                return ValidationOutcome::rejected(
                    CheckKind::StatementPolicy,
                    format!(
                        "Only SELECT, WITH, SHOW, DESCRIBE, and EXPLAIN queries are allowed \
                        (found: {})",
                        keyword
                    ),
                );
            }
            None => {
                return ValidationOutcome::rejected(
                    CheckKind::StatementPolicy,
                    "Query contains no statement",
                );
            }
        }

        if query.len() > self.max_query_length {
            return ValidationOutcome::rejected(
                CheckKind::StatementPolicy,
                format!(
                    "Query exceeds maximum length of {} characters",
                    self.max_query_length
                ),
            );
        }

        debug!("Statement policy passed");
        ValidationOutcome::Valid
    }
}
