//! Process configuration.
//!
//! Settings come from a YAML file (`config.yaml` by default) with the access
//! token optionally overridden by the `AZURE_DEVOPS_PAT` environment variable.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DevOpsError, Result};

/// Environment variable that overrides `azure_devops.pat`.
pub const PAT_ENV_VAR: &str = "AZURE_DEVOPS_PAT";

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_SEARCH_URL: &str = "https://almsearch.dev.azure.com";
pub const DEFAULT_API_VERSION: &str = "7.1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub azure_devops: AzureDevOpsConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Upstream settings. The token is redacted from `Debug` output.
#[derive(Clone, Deserialize)]
pub struct AzureDevOpsConfig {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub pat: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_url")]
    pub search_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_search_url() -> String {
    DEFAULT_SEARCH_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Read the file, apply the environment override and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DevOpsError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_yaml_str(&content)?;
        config.apply_pat_override(std::env::var(PAT_ENV_VAR).ok());
        config.validate()?;

        tracing::debug!(
            "Loaded config from {} (organization={}, project={})",
            path.display(),
            config.azure_devops.organization,
            config.azure_devops.project
        );

        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| DevOpsError::Config(format!("invalid configuration: {}", e)))
    }

    /// Replace the file token with `pat` when it is set and non-empty.
    pub fn apply_pat_override(&mut self, pat: Option<String>) {
        if let Some(pat) = pat.filter(|p| !p.trim().is_empty()) {
            self.azure_devops.pat = pat;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let devops = &self.azure_devops;
        if devops.pat.trim().is_empty() {
            return Err(DevOpsError::Config(format!(
                "Azure DevOps PAT is required (set azure_devops.pat or {})",
                PAT_ENV_VAR
            )));
        }
        if devops.organization.trim().is_empty() {
            return Err(DevOpsError::Config(
                "azure_devops.organization is required".to_string(),
            ));
        }
        if devops.project.trim().is_empty() {
            return Err(DevOpsError::Config(
                "azure_devops.project is required".to_string(),
            ));
        }
        Ok(())
    }
}

impl AzureDevOpsConfig {
    /// `{base_url}/{organization}`, e.g. `https://dev.azure.com/contoso`.
    pub fn organization_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.organization
        )
    }

    pub fn search_organization_url(&self) -> String {
        format!(
            "{}/{}",
            self.search_url.trim_end_matches('/'),
            self.organization
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for AzureDevOpsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureDevOpsConfig")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("pat", &"<redacted>")
            .field("api_version", &self.api_version)
            .field("base_url", &self.base_url)
            .field("search_url", &self.search_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
