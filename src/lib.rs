//! # sqlgate-mcp
//!
//! A security-validating gateway between MCP tool invocations and database
//! execution. Every tool call is screened before it reaches a backend:
//! SQL injection classification, statement policy, identifier validation.
//! Every result is masked on the way out and wrapped in a uniform
//! response envelope.
//!
//! ## Architecture
//!
//! - **protocol**: JSON-RPC 2.0 / MCP types, stdio transport, server loop
//! - **security**: quote-aware query scanner, statement policy, injection
//!   classifier, identifier validator
//! - **masking**: recursive sensitive-data masking of results
//! - **gateway**: validation router, executor seam, response envelopes
//! - **server**: MCP handler wiring the gateway to the protocol layer
//!
//! ## Example
//!
//! ```no_run
//! use sqlgate_mcp::config::GatewayConfig;
//! use sqlgate_mcp::gateway::{default_registry, ToolGateway};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GatewayConfig::builder().from_env()?.build()?;
//! let gateway = ToolGateway::new(&config, Arc::new(default_registry()));
//!
//! let envelope = gateway
//!     .handle(
//!         "execute_query",
//!         &serde_json::json!({"query": "SELECT id FROM users"}),
//!     )
//!     .await;
//! println!("{}", envelope.to_json());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod masking;
pub mod protocol;
pub mod security;
pub mod server;

pub use config::{GatewayConfig, GatewayConfigBuilder, SecurityConfig, ToolCategory};
pub use error::{GatewayError, Result};
pub use gateway::{ExecutorRegistry, ResponseEnvelope, ToolExecutor, ToolGateway};
pub use masking::{DataMasker, MASK_MARKER};
pub use security::{PatternLibrary, ValidationOutcome};
pub use server::GatewayHandler;
