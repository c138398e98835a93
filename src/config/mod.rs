//! Configuration types and builders.
//!
//! All configuration is resolved once at startup and passed into the
//! validators and gateway by value; nothing here is re-read per call.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::env;

/// Validation category a tool name resolves to.
///
/// A closed enumeration: each category carries a fixed, ordered set of
/// checks applied by the router. Tool names not present in the category
/// table are [`ToolCategory::Unrestricted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Carries a `query` argument; statement policy + injection screening.
    QueryExecuting,
    /// Carries a `database` argument; identifier validation.
    SchemaIntrospectionDatabase,
    /// Carries `database` and `table` arguments; identifier validation on both.
    SchemaIntrospectionTable,
    /// No argument-level security checks defined by the gateway.
    Unrestricted,
}

impl ToolCategory {
    /// Parse a category from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "query_executing" | "query" => Some(Self::QueryExecuting),
            "schema_introspection_database" | "database" => Some(Self::SchemaIntrospectionDatabase),
            "schema_introspection_table" | "table" => Some(Self::SchemaIntrospectionTable),
            "unrestricted" | "none" => Some(Self::Unrestricted),
            _ => None,
        }
    }
}

impl TryFrom<&str> for ToolCategory {
    type Error = ConfigError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        Self::parse(s).ok_or_else(|| ConfigError::InvalidValue {
            field: "tool_category".into(),
            message: format!(
                "Unknown tool category: '{}'. Valid categories: query_executing, \
                schema_introspection_database, schema_introspection_table, unrestricted",
                s
            )
            .into(),
        })
    }
}

/// Default tool-name to category table matching the built-in tool set.
pub fn default_tool_categories() -> HashMap<String, ToolCategory> {
    HashMap::from([
        ("execute_query".into(), ToolCategory::QueryExecuting),
        ("list_tables".into(), ToolCategory::SchemaIntrospectionDatabase),
        ("get_table_schema".into(), ToolCategory::SchemaIntrospectionTable),
    ])
}

/// Security validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Maximum accepted SQL query length in bytes.
    pub max_query_length: usize,
    /// Maximum accepted database/table identifier length.
    pub max_identifier_length: usize,
    /// Whether rejection messages echo the matched injection category
    /// names to the caller. When false (the default), category names are
    /// only logged and the caller sees a generic message.
    pub disclose_matched_patterns: bool,
    /// Maximum length of an executor error message before truncation.
    pub max_error_message_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_query_length: 10_000,
            max_identifier_length: 64,
            disclose_matched_patterns: false,
            max_error_message_length: 200,
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub name: Cow<'static, str>,
    pub version: Cow<'static, str>,
    pub security: SecurityConfig,
    /// Tool-name to validation-category table, resolved once at startup.
    pub tool_categories: HashMap<String, ToolCategory>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: "sqlgate-mcp".into(),
            version: env!("CARGO_PKG_VERSION").into(),
            security: SecurityConfig::default(),
            tool_categories: default_tool_categories(),
        }
    }
}

impl GatewayConfig {
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for GatewayConfig with fluent API.
#[derive(Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn max_query_length(mut self, length: usize) -> Self {
        self.config.security.max_query_length = length;
        self
    }

    pub fn max_identifier_length(mut self, length: usize) -> Self {
        self.config.security.max_identifier_length = length;
        self
    }

    pub fn disclose_matched_patterns(mut self, disclose: bool) -> Self {
        self.config.security.disclose_matched_patterns = disclose;
        self
    }

    /// Assign a validation category to a tool name.
    pub fn tool_category(mut self, name: impl Into<String>, category: ToolCategory) -> Self {
        self.config.tool_categories.insert(name.into(), category);
        self
    }

    /// Apply environment variable overrides.
    pub fn from_env(mut self) -> Result<Self> {
        if let Ok(length) = env::var("SQLGATE_MAX_QUERY_LENGTH") {
            self.config.security.max_query_length = length.parse().map_err(|_| {
                ConfigError::InvalidValue {
                    field: "SQLGATE_MAX_QUERY_LENGTH".into(),
                    message: "Invalid length".into(),
                }
            })?;
        }

        if let Ok(length) = env::var("SQLGATE_MAX_IDENTIFIER_LENGTH") {
            self.config.security.max_identifier_length = length.parse().map_err(|_| {
                ConfigError::InvalidValue {
                    field: "SQLGATE_MAX_IDENTIFIER_LENGTH".into(),
                    message: "Invalid length".into(),
                }
            })?;
        }

        if let Ok(disclose) = env::var("SQLGATE_DISCLOSE_PATTERNS") {
            self.config.security.disclose_matched_patterns = disclose.parse().unwrap_or(false);
        }

        Ok(self)
    }

    pub fn build(self) -> Result<GatewayConfig> {
        self.validate()?;
        Ok(self.config)
    }

    fn validate(&self) -> Result<()> {
        if self.config.security.max_query_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_query_length".into(),
                message: "Must be greater than 0".into(),
            }
            .into());
        }
        if self.config.security.max_identifier_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_identifier_length".into(),
                message: "Must be greater than 0".into(),
            }
            .into());
        }
        Ok(())
    }
}
