//! MCP server loop and method dispatch.

use crate::error::{GatewayError, ProtocolError, ProtocolResult, Result};
use crate::protocol::transport::{StdioTransport, Transport};
use crate::protocol::types::*;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Handler trait for processing MCP requests.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn initialize(&self, params: InitializeParams) -> ProtocolResult<InitializeResult>;

    async fn initialized(&self) -> ProtocolResult<()> {
        Ok(())
    }

    async fn shutdown(&self) -> ProtocolResult<()> {
        Ok(())
    }

    async fn list_tools(&self) -> ProtocolResult<ListToolsResult>;

    async fn call_tool(&self, params: CallToolParams) -> ProtocolResult<CallToolResult>;

    async fn ping(&self) -> ProtocolResult<Value> {
        Ok(serde_json::json!({}))
    }
}

/// MCP server over a transport.
pub struct McpServer<H: Handler> {
    info: ServerInfo,
    handler: Arc<H>,
}

impl<H: Handler> McpServer<H> {
    pub fn new(handler: H, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            handler: Arc::new(handler),
        }
    }

    /// Run the server with stdio transport until EOF or shutdown.
    pub async fn run(self) -> Result<()> {
        self.run_with_transport(Arc::new(StdioTransport::new())).await
    }

    /// Run the server with a custom transport.
    pub async fn run_with_transport<T: Transport + 'static>(self, transport: Arc<T>) -> Result<()> {
        info!(
            "Starting MCP server: {} v{}",
            self.info.name, self.info.version
        );

        loop {
            let request = match transport.read_request().await {
                Ok(Some(request)) => request,
                Ok(None) => {
                    debug!("EOF received, shutting down");
                    break;
                }
                Err(GatewayError::Protocol(ProtocolError::ParseError)) => {
                    let response = JsonRpcResponse::error(None, JsonRpcError::parse_error());
                    if let Err(e) = transport.write_response(&response).await {
                        error!("Failed to send error response: {}", e);
                    }
                    continue;
                }
                Err(e) => {
                    error!("Transport error: {}", e);
                    break;
                }
            };

            let is_notification = request.is_notification();
            let is_shutdown = request.method == "shutdown";

            let response = self.dispatch(request).await;

            if !is_notification {
                if let Err(e) = transport.write_response(&response).await {
                    error!("Failed to send response: {}", e);
                }
            }

            if is_shutdown {
                info!("Shutdown request received");
                break;
            }
        }

        info!("Server stopped");
        Ok(())
    }

    /// Route a request to the handler method and wrap the outcome.
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Dispatching request: {}", request.method);

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params).await,
            "initialized" | "notifications/initialized" => {
                self.handler.initialized().await.map(|()| Value::Null)
            }
            "shutdown" => self.handler.shutdown().await.map(|()| Value::Null),
            "ping" => self.handler.ping().await,
            "tools/list" => to_value(self.handler.list_tools().await),
            "tools/call" => self.handle_call_tool(request.params).await,
            method => {
                warn!("Unknown method: {}", method);
                Err(ProtocolError::MethodNotFound(method.to_string()))
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(request.id, value),
            Err(e) => {
                error!("Request failed: {}", e);
                JsonRpcResponse::error(request.id, JsonRpcError::new(e.code(), e.to_string()))
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> ProtocolResult<Value> {
        let params: InitializeParams = parse_params(params)?;
        info!(
            "Initialize request from {} v{}",
            params.client_info.name, params.client_info.version
        );
        to_value(self.handler.initialize(params).await)
    }

    async fn handle_call_tool(&self, params: Option<Value>) -> ProtocolResult<Value> {
        let params: CallToolParams = parse_params(params)?;
        to_value(self.handler.call_tool(params).await)
    }
}

fn parse_params<P: serde::de::DeserializeOwned>(params: Option<Value>) -> ProtocolResult<P> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| ProtocolError::InvalidParams(e.to_string().into()))?
        .ok_or_else(|| ProtocolError::InvalidParams("Missing params".into()))
}

fn to_value<T: serde::Serialize>(result: ProtocolResult<T>) -> ProtocolResult<Value> {
    let value = result?;
    serde_json::to_value(value).map_err(|e| ProtocolError::InternalError(e.to_string().into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestHandler;

    #[async_trait]
    impl Handler for TestHandler {
        async fn initialize(&self, _params: InitializeParams) -> ProtocolResult<InitializeResult> {
            Ok(InitializeResult {
                protocol_version: MCP_VERSION.into(),
                capabilities: ServerCapabilities::default(),
                server_info: ServerInfo {
                    name: "test".into(),
                    version: "1.0".into(),
                },
                instructions: None,
            })
        }

        async fn list_tools(&self) -> ProtocolResult<ListToolsResult> {
            Ok(ListToolsResult {
                tools: vec![],
                next_cursor: None,
            })
        }

        async fn call_tool(&self, _params: CallToolParams) -> ProtocolResult<CallToolResult> {
            Ok(CallToolResult::text("test"))
        }
    }

    #[tokio::test]
    async fn test_dispatch_initialize() {
        let server = McpServer::new(TestHandler, "test", "0.1.0");
        let request = JsonRpcRequest::new("initialize")
            .with_id(1)
            .with_params(serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "client", "version": "1.0"}
            }));

        let response = server.dispatch(request).await;
        assert!(response.result.is_some());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_method() {
        let server = McpServer::new(TestHandler, "test", "0.1.0");
        let request = JsonRpcRequest::new("unknown/method").with_id(1);

        let response = server.dispatch(request).await;
        assert!(response.result.is_none());
        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn test_dispatch_missing_params() {
        let server = McpServer::new(TestHandler, "test", "0.1.0");
        let request = JsonRpcRequest::new("tools/call").with_id(2);

        let response = server.dispatch(request).await;
        assert_eq!(response.error.unwrap().code, -32602);
    }
}
