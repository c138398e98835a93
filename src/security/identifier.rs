//! Database and table identifier validation.
//!
//! Structural allow-list: ASCII letters, digits and underscore, no leading
//! digit, bounded length, plus a small denylist of metadata schemas for the
//! database kind. Identifiers are not case-normalized (the underlying store
//! may be case-sensitive); only the denylist comparison is case-insensitive.

use crate::security::{CheckKind, ValidationOutcome};

/// Metadata schemas that must not be introspected directly.
const DATABASE_DENYLIST: &[&str] = &["information_schema", "mysql", "sys", "performance_schema"];

/// Identifier kind, used in rejection messages and denylist selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Database,
    Table,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Table => "table",
        }
    }

    fn denylist(&self) -> &'static [&'static str] {
        match self {
            Self::Database => DATABASE_DENYLIST,
            Self::Table => &[],
        }
    }
}

/// Identifier validator.
#[derive(Debug, Clone)]
pub struct IdentifierValidator {
    max_length: usize,
}

impl Default for IdentifierValidator {
    fn default() -> Self {
        Self { max_length: 64 }
    }
}

impl IdentifierValidator {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Validate a database or table name token.
    pub fn validate_identifier(&self, kind: IdentifierKind, value: &str) -> ValidationOutcome {
        if value.is_empty() {
            return ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!("{} name must not be empty", kind.as_str()),
            );
        }

        if value.len() > self.max_length {
            return ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!(
                    "{} name exceeds maximum length of {} characters",
                    kind.as_str(),
                    self.max_length
                ),
            );
        }

        let mut chars = value.chars();
        let first = chars.next().unwrap_or_default();
        if !(first.is_ascii_alphabetic() || first == '_') {
            return ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!(
                    "{} name must start with a letter or underscore: '{}'",
                    kind.as_str(),
                    value
                ),
            );
        }

        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!(
                    "{} name contains invalid characters: '{}'",
                    kind.as_str(),
                    value
                ),
            );
        }

        let lowered = value.to_lowercase();
        if kind.denylist().contains(&lowered.as_str()) {
            return ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!("{} name '{}' is reserved", kind.as_str(), value),
            );
        }

        ValidationOutcome::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        let validator = IdentifierValidator::default();
        for name in ["analytics_db", "Users", "_staging", "t1"] {
            assert!(
                validator
                    .validate_identifier(IdentifierKind::Database, name)
                    .is_valid(),
                "rejected: {}",
                name
            );
        }
    }

    #[test]
    fn test_leading_digit_rejected() {
        let validator = IdentifierValidator::default();
        let outcome = validator.validate_identifier(IdentifierKind::Table, "1table");
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_invalid_characters_rejected() {
        let validator = IdentifierValidator::default();
        for name in ["../etc", "users; --", "my db", "táble", "a.b"] {
            assert!(
                !validator
                    .validate_identifier(IdentifierKind::Table, name)
                    .is_valid(),
                "accepted: {}",
                name
            );
        }
    }

    #[test]
    fn test_empty_rejected() {
        let validator = IdentifierValidator::default();
        assert!(!validator
            .validate_identifier(IdentifierKind::Database, "")
            .is_valid());
    }

    #[test]
    fn test_database_denylist_case_insensitive() {
        let validator = IdentifierValidator::default();
        for name in ["information_schema", "Information_Schema", "mysql", "SYS"] {
            assert!(
                !validator
                    .validate_identifier(IdentifierKind::Database, name)
                    .is_valid(),
                "accepted: {}",
                name
            );
        }
        // The denylist applies to the database kind only.
        assert!(validator
            .validate_identifier(IdentifierKind::Table, "sys")
            .is_valid());
    }

    #[test]
    fn test_length_bound() {
        let validator = IdentifierValidator::new(8);
        assert!(validator
            .validate_identifier(IdentifierKind::Table, "short")
            .is_valid());
        assert!(!validator
            .validate_identifier(IdentifierKind::Table, "much_too_long_name")
            .is_valid());
    }
}
