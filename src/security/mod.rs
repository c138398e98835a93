//! Query validation: statement policy, injection screening, identifiers.

pub mod identifier;
pub mod injection;
pub mod patterns;
pub mod scanner;
pub mod statement;

pub use identifier::{IdentifierKind, IdentifierValidator};
pub use injection::SqlInjectionClassifier;
pub use patterns::{PatternCategory, PatternLibrary};
pub use scanner::{NormalizedQuery, ScanState};
pub use statement::StatementPolicyValidator;

use serde::{Deserialize, Serialize};

/// Which check produced a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    StatementPolicy,
    Injection,
    Identifier,
}

/// Result of validating one request. Computed before any side-effecting
/// call and always returned as a value, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Rejected {
        reason: String,
        check: CheckKind,
        matched_patterns: Vec<String>,
    },
}

impl ValidationOutcome {
    pub fn rejected(check: CheckKind, reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
            check,
            matched_patterns: Vec::new(),
        }
    }

    pub fn rejected_with_patterns(
        check: CheckKind,
        reason: impl Into<String>,
        matched_patterns: Vec<String>,
    ) -> Self {
        Self::Rejected {
            reason: reason.into(),
            check,
            matched_patterns,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}
