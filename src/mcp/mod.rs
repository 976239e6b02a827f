//! MCP surface: tool parameters, dispatch and the rmcp server handler.

pub mod dispatch;
pub mod params;
pub mod server;

pub use dispatch::{Operation, OperationDispatcher};
pub use params::{ReadParams, SearchParams, READ_TOOL, SEARCH_TOOL};
pub use server::McpServer;
