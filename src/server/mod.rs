//! MCP request handler backed by the tool gateway.

use crate::config::GatewayConfig;
use crate::error::ProtocolResult;
use crate::gateway::{ExecutorRegistry, ToolGateway};
use crate::protocol::{
    CallToolParams, CallToolResult, Handler, InitializeParams, InitializeResult, ListToolsResult,
    ServerCapabilities, ServerInfo, ToolsCapability, MCP_VERSION,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Routes MCP tool calls through the validating gateway.
///
/// Every `tools/call` produces a well-formed response envelope rendered as
/// text content; protocol-level errors are reserved for malformed requests.
pub struct GatewayHandler {
    config: GatewayConfig,
    gateway: ToolGateway,
    executors: Arc<ExecutorRegistry>,
}

impl GatewayHandler {
    pub fn new(config: GatewayConfig, executors: Arc<ExecutorRegistry>) -> Self {
        let gateway = ToolGateway::new(&config, Arc::clone(&executors));
        Self {
            config,
            gateway,
            executors,
        }
    }

    pub fn gateway(&self) -> &ToolGateway {
        &self.gateway
    }
}

#[async_trait]
impl Handler for GatewayHandler {
    async fn initialize(&self, _params: InitializeParams) -> ProtocolResult<InitializeResult> {
        let tool_names: Vec<String> = self
            .executors
            .list()
            .into_iter()
            .map(|t| t.name)
            .collect();

        Ok(InitializeResult {
            protocol_version: MCP_VERSION.into(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
            },
            server_info: ServerInfo {
                name: self.config.name.to_string(),
                version: self.config.version.to_string(),
            },
            instructions: Some(format!(
                "Database gateway with SQL validation and result masking. \
                Available tools: {}.",
                tool_names.join(", ")
            )),
        })
    }

    async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
        let tools = self.executors.list();
        debug!("Listing {} tools", tools.len());

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult> {
        debug!("Tool call: {}", params.name);

        let envelope = self.gateway.handle(&params.name, &params.arguments).await;
        let text = envelope.to_json();

        Ok(if envelope.success {
            CallToolResult::text(text)
        } else {
            CallToolResult::error(text)
        })
    }
}
