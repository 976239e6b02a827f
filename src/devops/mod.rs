//! Azure DevOps upstream: session, sub-clients, wire types and repository resolution.

mod git_client;
pub mod models;
mod resolver;
mod search_client;
mod session;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use uuid::Uuid;

pub use git_client::GitClient;
pub use models::{
    CodeSearchHit, CodeSearchRequest, CodeSearchResponse, GitItem, GitRepository, NamedRef,
};
pub use resolver::{RepositoryReference, RepositoryResolver};
pub use search_client::SearchClient;
pub use session::{Credentials, UpstreamSession};

use crate::error::Result;

/// The upstream calls the operations depend on.
///
/// Implemented by [`UpstreamSession`]; operations only see this trait so they
/// can be driven by an in-memory double in tests.
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    async fn search_code(
        &self,
        project: &str,
        request: &CodeSearchRequest,
    ) -> Result<CodeSearchResponse>;

    async fn list_repositories(&self, project: &str) -> Result<Vec<GitRepository>>;

    async fn get_item(
        &self,
        project: &str,
        repository_id: &Uuid,
        path: &str,
        branch: Option<&str>,
    ) -> Result<GitItem>;
}
