use std::future::Future;
use std::sync::Arc;

use rmcp::model::{CallToolResult, Content, JsonObject};
use rmcp::ErrorData as McpError;
use tokio_util::sync::CancellationToken;

use super::params::{ReadParams, SearchParams, READ_TOOL, SEARCH_TOOL};
use crate::devops::DevOpsApi;
use crate::error::{DevOpsError, Result};
use crate::ops::{ReadOperation, SearchOperation};

/// A validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Search(SearchParams),
    Read(ReadParams),
}

impl Operation {
    /// Validate raw arguments for the named tool. Nothing reaches upstream
    /// unless this succeeds.
    pub fn parse(name: &str, arguments: Option<&JsonObject>) -> Result<Self> {
        let empty = JsonObject::new();
        let arguments = arguments.unwrap_or(&empty);

        match name {
            SEARCH_TOOL => Ok(Operation::Search(SearchParams::from_arguments(arguments)?)),
            READ_TOOL => Ok(Operation::Read(ReadParams::from_arguments(arguments)?)),
            other => Err(DevOpsError::Validation(format!("unknown tool: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Search(_) => SEARCH_TOOL,
            Operation::Read(_) => READ_TOOL,
        }
    }
}

/// Routes tool calls to the operations and maps outcomes to MCP results.
///
/// Holds no per-call state; clones share the same upstream session.
#[derive(Clone)]
pub struct OperationDispatcher {
    search: SearchOperation,
    read: ReadOperation,
}

impl OperationDispatcher {
    pub fn new(api: Arc<dyn DevOpsApi>, project: impl Into<String>) -> Self {
        let project = project.into();
        Self {
            search: SearchOperation::new(api.clone(), project.clone()),
            read: ReadOperation::new(api, project),
        }
    }

    /// Handle one `tools/call`.
    ///
    /// Invalid arguments are a protocol error (`invalid_params`); failures of
    /// the operation itself become an error tool result.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        cancellation: CancellationToken,
    ) -> std::result::Result<CallToolResult, McpError> {
        let operation = Operation::parse(name, arguments.as_ref()).map_err(|e| {
            tracing::warn!("Rejected {} call: {}", name, e);
            McpError::invalid_params(e.to_string(), None)
        })?;

        match self.run(operation, &cancellation).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
        }
    }

    /// Execute a validated operation and encode its result as tool text:
    /// a JSON array for `search`, raw file content for `read`.
    pub async fn run(
        &self,
        operation: Operation,
        cancellation: &CancellationToken,
    ) -> Result<String> {
        match operation {
            Operation::Search(params) => {
                let records = with_cancellation(
                    cancellation,
                    self.search.execute(&params.query, params.repo()),
                )
                .await?;
                tracing::debug!("search {:?} returned {} records", params.query, records.len());
                Ok(serde_json::to_string(&records)?)
            }
            Operation::Read(params) => {
                with_cancellation(
                    cancellation,
                    self.read
                        .execute(&params.repository, &params.path, params.branch.as_deref()),
                )
                .await
            }
        }
    }
}

/// Drop `future` (aborting any in-flight request) once the token fires.
async fn with_cancellation<T>(
    cancellation: &CancellationToken,
    future: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(DevOpsError::Cancelled),
        result = future => result,
    }
}
