use uuid::Uuid;

use super::models::GitRepository;
use super::DevOpsApi;
use crate::error::{DevOpsError, Result};

/// A repository name resolved to its upstream id. Valid for one call only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReference {
    pub name: String,
    pub id: Uuid,
}

/// Maps a human-given repository name to its id by listing the project.
///
/// Nothing is cached: each call issues a fresh listing so renames upstream are
/// picked up on the next call.
pub struct RepositoryResolver<'a> {
    api: &'a dyn DevOpsApi,
}

impl<'a> RepositoryResolver<'a> {
    pub fn new(api: &'a dyn DevOpsApi) -> Self {
        Self { api }
    }

    pub async fn resolve(&self, project: &str, name: &str) -> Result<RepositoryReference> {
        let repositories = self.api.list_repositories(project).await?;

        match find_repository(&repositories, name) {
            Some(reference) => Ok(reference),
            None => {
                tracing::warn!(
                    "Repository not found: {} ({} repositories in {})",
                    name,
                    repositories.len(),
                    project
                );
                Err(DevOpsError::NotFound(name.to_string()))
            }
        }
    }
}

/// First repository whose name equals `name` ignoring case.
pub fn find_repository(
    repositories: &[GitRepository],
    name: &str,
) -> Option<RepositoryReference> {
    repositories
        .iter()
        .find(|repo| eq_ignore_case(&repo.name, name))
        .map(|repo| RepositoryReference {
            name: repo.name.clone(),
            id: repo.id,
        })
}

/// Lowercases per character: `str::to_lowercase` turns a word-final "Σ" into
/// "ς", which would not equal "σ".
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
