use uuid::Uuid;

use super::models::{GitItem, GitRepository, ValueList};
use super::session::Connection;
use crate::error::Result;

/// Repository listing and item content (`_apis/git`).
#[derive(Clone)]
pub struct GitClient {
    connection: Connection,
}

impl GitClient {
    pub(crate) fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub async fn get_repositories(&self, project: &str) -> Result<Vec<GitRepository>> {
        let url = self
            .connection
            .url(&[project, "_apis", "git", "repositories"])?;
        tracing::debug!("Listing repositories of project {}", project);

        let list: ValueList<GitRepository> = self
            .connection
            .send(self.connection.get(url), "list repositories")
            .await?;
        Ok(list.value)
    }

    /// Fetch one item with its content. Without `branch` the repository's
    /// default branch is read.
    pub async fn get_item(
        &self,
        project: &str,
        repository_id: &Uuid,
        path: &str,
        branch: Option<&str>,
    ) -> Result<GitItem> {
        let repository_id = repository_id.to_string();
        let url = self.connection.url(&[
            project,
            "_apis",
            "git",
            "repositories",
            repository_id.as_str(),
            "items",
        ])?;
        tracing::debug!(
            "Fetching item {} from repository {} (branch {})",
            path,
            repository_id,
            branch.unwrap_or("<default>")
        );

        let mut request = self.connection.get(url).query(&[
            ("path", path),
            ("includeContent", "true"),
            ("$format", "json"),
        ]);
        if let Some(branch) = branch {
            request = request.query(&[
                ("versionDescriptor.version", branch),
                ("versionDescriptor.versionType", "branch"),
            ]);
        }

        self.connection.send(request, "get item").await
    }
}
