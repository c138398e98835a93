//! Per-tool validation routing.
//!
//! Maps a tool name to its validation category and runs the category's
//! ordered checks, short-circuiting on the first rejection. Dispatch is by
//! the closed [`ToolCategory`] enumeration resolved once at startup, not by
//! runtime inspection of argument types.

use crate::config::{GatewayConfig, ToolCategory};
use crate::security::{
    CheckKind, IdentifierKind, IdentifierValidator, PatternLibrary, SqlInjectionClassifier,
    StatementPolicyValidator, ValidationOutcome,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Validation router.
#[derive(Debug, Clone)]
pub struct ValidationRouter {
    categories: HashMap<String, ToolCategory>,
    statement: StatementPolicyValidator,
    injection: SqlInjectionClassifier,
    identifier: IdentifierValidator,
}

impl ValidationRouter {
    pub fn new(config: &GatewayConfig, patterns: Arc<PatternLibrary>) -> Self {
        Self {
            categories: config.tool_categories.clone(),
            statement: StatementPolicyValidator::new(config.security.max_query_length),
            injection: SqlInjectionClassifier::new(patterns),
            identifier: IdentifierValidator::new(config.security.max_identifier_length),
        }
    }

    /// Category assigned to a tool name, defaulting to unrestricted.
    pub fn category_of(&self, name: &str) -> ToolCategory {
        self.categories
            .get(name)
            .copied()
            .unwrap_or(ToolCategory::Unrestricted)
    }

    /// Validate a request. Whether the tool exists at all is the executor's
    /// concern, not this router's.
    pub fn validate(&self, name: &str, arguments: &Value) -> ValidationOutcome {
        let outcome = match self.category_of(name) {
            ToolCategory::QueryExecuting => self.validate_query(arguments),
            ToolCategory::SchemaIntrospectionDatabase => {
                self.validate_identifier_arg(arguments, IdentifierKind::Database)
            }
            ToolCategory::SchemaIntrospectionTable => {
                let outcome = self.validate_identifier_arg(arguments, IdentifierKind::Database);
                if outcome.is_valid() {
                    self.validate_identifier_arg(arguments, IdentifierKind::Table)
                } else {
                    outcome
                }
            }
            ToolCategory::Unrestricted => ValidationOutcome::Valid,
        };

        if let ValidationOutcome::Rejected {
            reason,
            check,
            matched_patterns,
        } = &outcome
        {
            warn!(
                tool = name,
                check = ?check,
                patterns = ?matched_patterns,
                "Request rejected: {}",
                reason
            );
        }

        outcome
    }

    fn validate_query(&self, arguments: &Value) -> ValidationOutcome {
        let query = match arguments.get("query").and_then(Value::as_str) {
            Some(q) if !q.trim().is_empty() => q,
            _ => {
                return ValidationOutcome::rejected(
                    CheckKind::StatementPolicy,
                    "Missing required 'query' argument",
                );
            }
        };

        let outcome = self.statement.check_statement(query);
        if !outcome.is_valid() {
            return outcome;
        }

        let (is_injection, matched) = self.injection.classify(query);
        if is_injection {
            return ValidationOutcome::rejected_with_patterns(
                CheckKind::Injection,
                "Potential SQL injection detected",
                matched,
            );
        }

        ValidationOutcome::Valid
    }

    fn validate_identifier_arg(
        &self,
        arguments: &Value,
        kind: IdentifierKind,
    ) -> ValidationOutcome {
        match arguments.get(kind.as_str()).and_then(Value::as_str) {
            Some(value) => self.identifier.validate_identifier(kind, value),
            None => ValidationOutcome::rejected(
                CheckKind::Identifier,
                format!("Missing required '{}' argument", kind.as_str()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn router() -> ValidationRouter {
        let config = GatewayConfig::default();
        ValidationRouter::new(&config, Arc::new(PatternLibrary::new()))
    }

    #[test]
    fn test_clean_query_passes() {
        let outcome = router().validate("execute_query", &json!({"query": "SELECT 1"}));
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_missing_query_rejected_as_policy() {
        let outcome = router().validate("execute_query", &json!({}));
        match outcome {
            ValidationOutcome::Rejected { check, .. } => {
                assert_eq!(check, CheckKind::StatementPolicy);
            }
            ValidationOutcome::Valid => panic!("missing query accepted"),
        }
    }

    #[test]
    fn test_policy_and_injection_reported_distinctly() {
        let router = router();

        let policy = router.validate("execute_query", &json!({"query": "DROP TABLE users"}));
        assert!(matches!(
            policy,
            ValidationOutcome::Rejected {
                check: CheckKind::StatementPolicy,
                ..
            }
        ));

        let injection = router.validate(
            "execute_query",
            &json!({"query": "SELECT * FROM users WHERE id = 1 OR 1=1"}),
        );
        match injection {
            ValidationOutcome::Rejected {
                check,
                matched_patterns,
                ..
            } => {
                assert_eq!(check, CheckKind::Injection);
                assert!(!matched_patterns.is_empty());
            }
            ValidationOutcome::Valid => panic!("injection accepted"),
        }
    }

    #[test]
    fn test_database_introspection() {
        let router = router();
        assert!(router
            .validate("list_tables", &json!({"database": "analytics_db"}))
            .is_valid());
        assert!(!router
            .validate("list_tables", &json!({"database": "information_schema"}))
            .is_valid());
        assert!(!router.validate("list_tables", &json!({})).is_valid());
    }

    #[test]
    fn test_table_introspection_database_checked_first() {
        let router = router();
        let outcome = router.validate(
            "get_table_schema",
            &json!({"database": "1bad", "table": "also bad"}),
        );
        match outcome {
            ValidationOutcome::Rejected { reason, .. } => {
                assert!(reason.contains("database"), "wrong order: {}", reason);
            }
            ValidationOutcome::Valid => panic!("accepted"),
        }

        assert!(!router
            .validate(
                "get_table_schema",
                &json!({"database": "lake", "table": "../etc"})
            )
            .is_valid());
        assert!(router
            .validate(
                "get_table_schema",
                &json!({"database": "lake", "table": "events"})
            )
            .is_valid());
    }

    #[test]
    fn test_unknown_tool_is_unrestricted() {
        let outcome = router().validate("connection_info", &json!({"anything": "goes"}));
        assert!(outcome.is_valid());
    }
}
