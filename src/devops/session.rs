use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::git_client::GitClient;
use super::models::{ApiErrorBody, CodeSearchRequest, CodeSearchResponse, GitItem, GitRepository};
use super::search_client::SearchClient;
use super::DevOpsApi;
use crate::config::AzureDevOpsConfig;
use crate::error::{DevOpsError, Result};

/// Organization, project and token the session authenticates with.
#[derive(Clone)]
pub struct Credentials {
    pub organization: String,
    pub project: String,
    token: String,
}

impl Credentials {
    pub fn new(
        organization: impl Into<String>,
        project: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            project: project.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Authenticated HTTP context shared by the sub-clients.
#[derive(Clone)]
pub(crate) struct Connection {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    api_version: String,
    timeout: Duration,
}

impl Connection {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: &str,
        credentials: &Credentials,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| DevOpsError::Connection(format!("invalid URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DevOpsError::Connection(format!(
                "URL '{}' cannot be used as a base",
                base_url
            )));
        }

        Ok(Self {
            http,
            base_url,
            token: credentials.token.clone(),
            api_version: api_version.to_string(),
            timeout,
        })
    }

    /// Append percent-encoded path segments to the organization URL.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DevOpsError::Connection(format!("URL '{}' cannot be used as a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn get(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub(crate) fn post(&self, url: Url) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth("", Some(&self.token))
            .query(&[("api-version", self.api_version.as_str())])
    }

    /// Send a request and decode a JSON success body. `what` names the call in errors.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DevOpsError::Upstream(format!("{} timed out after {:?}", what, self.timeout))
            } else {
                DevOpsError::Upstream(format!("{} failed: {}", what, e))
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            DevOpsError::Upstream(format!("failed to read {} response body: {}", what, e))
        })?;

        // Azure DevOps answers a rejected token with a sign-in page and 203.
        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(DevOpsError::Upstream(format!(
                "{} was redirected to sign-in; check the access token",
                what
            )));
        }

        if !status.is_success() {
            return Err(DevOpsError::Upstream(format!(
                "{} returned HTTP {}: {}",
                what,
                status,
                error_message(&body)
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            DevOpsError::Upstream(format!(
                "invalid JSON from {}: {} (body={})",
                what,
                e,
                truncate_for_error(&body)
            ))
        })
    }
}

/// Prefer the `message` of the Azure DevOps error envelope over the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| truncate_for_error(body))
}

pub(crate) fn truncate_for_error(value: &str) -> String {
    const LIMIT: usize = 400;
    match value.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// Connection to one Azure DevOps organization.
///
/// Built once at startup and shared read-only by every tool call.
pub struct UpstreamSession {
    credentials: Credentials,
    git: GitClient,
    search: SearchClient,
}

impl UpstreamSession {
    /// Build the HTTP client and both sub-clients. Performs no network I/O.
    pub fn connect(config: &AzureDevOpsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("devops-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DevOpsError::Connection(format!("failed to build http client: {}", e)))?;
        let credentials = Credentials::new(&config.organization, &config.project, &config.pat);

        let git = GitClient::new(Connection::new(
            http.clone(),
            &config.organization_url(),
            &credentials,
            &config.api_version,
            config.timeout(),
        )?);
        let search = SearchClient::new(Connection::new(
            http,
            &config.search_organization_url(),
            &credentials,
            &config.api_version,
            config.timeout(),
        )?);

        tracing::info!(
            "Azure DevOps session ready for {} (project {})",
            config.organization_url(),
            config.project
        );

        Ok(Self {
            credentials,
            git,
            search,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// List the configured project's repositories once to prove the token works.
    pub async fn verify(&self) -> Result<()> {
        let repositories = self
            .git
            .get_repositories(&self.credentials.project)
            .await
            .map_err(|e| {
                DevOpsError::Connection(format!(
                    "could not reach project '{}': {}",
                    self.credentials.project, e
                ))
            })?;

        tracing::info!(
            "Verified access to project {} ({} repositories)",
            self.credentials.project,
            repositories.len()
        );
        Ok(())
    }
}

#[async_trait]
impl DevOpsApi for UpstreamSession {
    async fn search_code(
        &self,
        project: &str,
        request: &CodeSearchRequest,
    ) -> Result<CodeSearchResponse> {
        self.search.fetch_code_search_results(project, request).await
    }

    async fn list_repositories(&self, project: &str) -> Result<Vec<GitRepository>> {
        self.git.get_repositories(project).await
    }

    async fn get_item(
        &self,
        project: &str,
        repository_id: &Uuid,
        path: &str,
        branch: Option<&str>,
    ) -> Result<GitItem> {
        self.git.get_item(project, repository_id, path, branch).await
    }
}
