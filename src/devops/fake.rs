//! In-memory `DevOpsApi` double for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::models::{CodeSearchRequest, CodeSearchResponse, GitItem, GitRepository};
use super::DevOpsApi;
use crate::error::{DevOpsError, Result};

#[derive(Default)]
pub(crate) struct FakeApi {
    repositories: Vec<GitRepository>,
    search_response: CodeSearchResponse,
    items: HashMap<(Uuid, String), GitItem>,
    failure: Option<String>,
    hang: bool,
    list_calls: AtomicUsize,
    search_calls: AtomicUsize,
    item_calls: AtomicUsize,
    last_search: Mutex<Option<(String, CodeSearchRequest)>>,
    last_branch: Mutex<Option<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repositories(mut self, repositories: Vec<GitRepository>) -> Self {
        self.repositories = repositories;
        self
    }

    pub fn with_search_response(mut self, response: CodeSearchResponse) -> Self {
        self.search_response = response;
        self
    }

    pub fn with_item(mut self, repository_id: Uuid, path: &str, item: GitItem) -> Self {
        self.items.insert((repository_id, path.to_string()), item);
        self
    }

    /// Every call fails with an upstream error carrying `message`.
    pub fn failing_with(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Every call waits forever.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls() + self.search_calls() + self.item_calls()
    }

    pub fn last_search(&self) -> Option<(String, CodeSearchRequest)> {
        self.last_search.lock().unwrap().clone()
    }

    pub fn last_branch(&self) -> Option<String> {
        self.last_branch.lock().unwrap().clone()
    }

    async fn gate(&self) -> Result<()> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        match &self.failure {
            Some(message) => Err(DevOpsError::Upstream(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DevOpsApi for FakeApi {
    async fn search_code(
        &self,
        project: &str,
        request: &CodeSearchRequest,
    ) -> Result<CodeSearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_search.lock().unwrap() = Some((project.to_string(), request.clone()));
        self.gate().await?;
        Ok(self.search_response.clone())
    }

    async fn list_repositories(&self, _project: &str) -> Result<Vec<GitRepository>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;
        Ok(self.repositories.clone())
    }

    async fn get_item(
        &self,
        _project: &str,
        repository_id: &Uuid,
        path: &str,
        branch: Option<&str>,
    ) -> Result<GitItem> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_branch.lock().unwrap() = branch.map(str::to_string);
        self.gate().await?;
        self.items
            .get(&(*repository_id, path.to_string()))
            .cloned()
            .ok_or_else(|| {
                DevOpsError::Upstream(format!(
                    "get item returned HTTP 404 Not Found: \
                     TF401174: The item '{}' could not be found.",
                    path
                ))
            })
    }
}
