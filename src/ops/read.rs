use std::sync::Arc;

use crate::devops::{DevOpsApi, RepositoryResolver};
use crate::error::Result;

/// Reads one file from a repository of the configured project.
#[derive(Clone)]
pub struct ReadOperation {
    api: Arc<dyn DevOpsApi>,
    project: String,
}

impl ReadOperation {
    pub fn new(api: Arc<dyn DevOpsApi>, project: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into(),
        }
    }

    /// File content at `path`, or an empty string for items without content
    /// (folders, binary placeholders). Upstream failures pass through as-is.
    pub async fn execute(
        &self,
        repository: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<String> {
        let reference = RepositoryResolver::new(self.api.as_ref())
            .resolve(&self.project, repository)
            .await?;

        let item = self
            .api
            .get_item(&self.project, &reference.id, path, branch)
            .await?;

        Ok(item.content.unwrap_or_default())
    }
}
