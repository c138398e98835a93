use anyhow::Result;
use sqlgate_mcp::config::GatewayConfig;
use sqlgate_mcp::gateway::default_registry;
use sqlgate_mcp::protocol::McpServer;
use sqlgate_mcp::server::GatewayHandler;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // Stdout carries protocol traffic; all logging goes to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sqlgate_mcp=info,warn")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = GatewayConfig::builder().from_env()?.build()?;
    info!(
        name = %config.name,
        version = %config.version,
        max_query_length = config.security.max_query_length,
        "Starting gateway"
    );

    let executors = Arc::new(default_registry());
    let handler = GatewayHandler::new(config.clone(), executors);

    McpServer::new(handler, config.name.to_string(), config.version.to_string())
        .run()
        .await?;

    Ok(())
}
