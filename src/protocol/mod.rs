//! MCP protocol layer: types, stdio transport, server loop.

pub mod server;
pub mod transport;
pub mod types;

pub use server::{Handler, McpServer};
pub use transport::{StdioTransport, Transport};
pub use types::*;
