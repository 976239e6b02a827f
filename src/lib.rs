pub mod config;
pub mod devops;
pub mod error;
pub mod mcp;
pub mod ops;

pub use config::{AzureDevOpsConfig, Config, ServerConfig};
pub use devops::{DevOpsApi, RepositoryReference, RepositoryResolver, UpstreamSession};
pub use error::{DevOpsError, Result};
pub use mcp::{McpServer, Operation, OperationDispatcher};
pub use ops::{ReadOperation, SearchOperation, SearchRecord};
