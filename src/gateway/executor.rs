//! Tool executor seam and registry.
//!
//! The gateway validates and masks; running a tool against an actual
//! database is a collaborator's job, reached through [`ToolExecutor`]. The
//! registry keeps one executor per tool name and is safe for concurrent use.

use crate::error::{ToolError, ToolResult};
use crate::protocol::Tool;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Executes a named tool and returns a JSON-serializable result.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Tool definition advertised to clients.
    fn definition(&self) -> Tool;

    /// Execute with the given arguments. Failure detail is opaque to the
    /// gateway and is sanitized before it reaches a caller.
    async fn execute(&self, arguments: Value) -> ToolResult<Value>;
}

/// Registry of tool executors.
pub struct ExecutorRegistry {
    tools: DashMap<String, Arc<dyn ToolExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    pub fn register<T: ToolExecutor + 'static>(&self, tool: T) {
        let definition = tool.definition();
        debug!("Registering tool executor: {}", definition.name);
        self.tools.insert(definition.name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.get(name).map(|r| Arc::clone(&*r))
    }

    pub fn list(&self) -> Vec<Tool> {
        self.tools.iter().map(|r| r.value().definition()).collect()
    }

    pub async fn execute(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(arguments).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ExecutorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Placeholder executor advertising a tool definition while no database
/// backend is wired in. Always fails with a configuration message.
pub struct UnboundTool {
    definition: Tool,
}

impl UnboundTool {
    pub fn new(definition: Tool) -> Self {
        Self { definition }
    }
}

#[async_trait]
impl ToolExecutor for UnboundTool {
    fn definition(&self) -> Tool {
        self.definition.clone()
    }

    async fn execute(&self, _arguments: Value) -> ToolResult<Value> {
        Err(ToolError::ExecutionFailed(format!(
            "No database backend is configured for '{}'",
            self.definition.name
        )))
    }
}

/// Registry pre-populated with the standard database tool definitions,
/// each bound to [`UnboundTool`] until a real backend replaces it.
pub fn default_registry() -> ExecutorRegistry {
    let registry = ExecutorRegistry::new();

    registry.register(UnboundTool::new(Tool {
        name: "execute_query".into(),
        description: Some(
            "Execute a read-only SQL query. Only SELECT, WITH, SHOW, DESCRIBE, \
            and EXPLAIN statements are accepted."
                .into(),
        ),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The SQL query to execute (read-only)"
                }
            },
            "required": ["query"]
        }),
    }));

    registry.register(UnboundTool::new(Tool {
        name: "list_tables".into(),
        description: Some("List tables in a database.".into()),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "database": {
                    "type": "string",
                    "description": "Database name"
                }
            },
            "required": ["database"]
        }),
    }));

    registry.register(UnboundTool::new(Tool {
        name: "get_table_schema".into(),
        description: Some("Get column and constraint information for a table.".into()),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "database": {
                    "type": "string",
                    "description": "Database name"
                },
                "table": {
                    "type": "string",
                    "description": "Table name"
                }
            },
            "required": ["database", "table"]
        }),
    }));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolExecutor for EchoTool {
        fn definition(&self) -> Tool {
            Tool {
                name: "echo".into(),
                description: Some("Echo arguments back".into()),
                input_schema: serde_json::json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(&self, arguments: Value) -> ToolResult<Value> {
            Ok(arguments)
        }
    }

    #[test]
    fn test_registry() {
        let registry = ExecutorRegistry::new();
        registry.register(EchoTool);

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[tokio::test]
    async fn test_execute() {
        let registry = ExecutorRegistry::new();
        registry.register(EchoTool);

        let result = registry
            .execute("echo", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert_eq!(result["a"], 1);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ExecutorRegistry::new();
        let result = registry.execute("missing", Value::Null).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_default_registry_unbound() {
        let registry = default_registry();
        assert_eq!(registry.len(), 3);

        let result = registry
            .execute("execute_query", serde_json::json!({"query": "SELECT 1"}))
            .await;
        assert!(matches!(result, Err(ToolError::ExecutionFailed(_))));
    }
}
