use std::sync::Arc;

use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Implementation, ListToolsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool, ToolsCapability,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer};
use schemars::JsonSchema;

use super::dispatch::OperationDispatcher;
use super::params::{ReadParams, SearchParams, READ_TOOL, SEARCH_TOOL};

#[derive(Clone)]
pub struct McpServer {
    dispatcher: OperationDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: OperationDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn tools() -> Vec<Tool> {
        vec![
            Tool {
                name: SEARCH_TOOL.into(),
                title: Some("Search".to_string()),
                description: Some("Search for files in Azure DevOps repositories".into()),
                input_schema: schema_for::<SearchParams>(),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
            Tool {
                name: READ_TOOL.into(),
                title: Some("Read".to_string()),
                description: Some("Read file content from Azure DevOps".into()),
                input_schema: schema_for::<ReadParams>(),
                output_schema: None,
                annotations: None,
                icons: None,
                meta: None,
            },
        ]
    }
}

fn schema_for<T: JsonSchema>() -> Arc<serde_json::Map<String, serde_json::Value>> {
    let schema = schemars::schema_for!(T);
    match serde_json::to_value(&schema) {
        Ok(serde_json::Value::Object(map)) => Arc::new(map),
        _ => Arc::new(serde_json::Map::new()),
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "devops-mcp".to_string(),
                title: Some("Azure DevOps MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Search code across the configured Azure DevOps project with `search`, \
                 then fetch a file with `read` using the repository and path from a search hit."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: Self::tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatcher
            .dispatch(request.name.as_ref(), request.arguments, context.ct.clone())
            .await
    }
}
