//! Tool parameters.
//!
//! Each struct doubles as the published JSON schema and as the typed request
//! produced by validating a raw `tools/call` argument map.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DevOpsError, Result};

pub const SEARCH_TOOL: &str = "search";
pub const READ_TOOL: &str = "read";

/// Parameters for `search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Search query
    pub query: String,
    /// Optional repository name to search in
    #[serde(default)]
    pub repo: Option<String>,
}

/// Parameters for `read`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReadParams {
    /// Repository name
    pub repository: String,
    /// File path
    pub path: String,
    /// Branch to read from (default: the repository's default branch)
    #[serde(default)]
    pub branch: Option<String>,
}

impl SearchParams {
    /// `query` must be a string. `repo` is dropped when absent or not a string.
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            query: required_string(arguments, "query")?,
            repo: optional_string(arguments, "repo"),
        })
    }

    pub fn repo(&self) -> &str {
        self.repo.as_deref().unwrap_or_default()
    }
}

impl ReadParams {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self> {
        Ok(Self {
            repository: required_string(arguments, "repository")?,
            path: required_string(arguments, "path")?,
            branch: optional_string(arguments, "branch").filter(|b| !b.is_empty()),
        })
    }
}

fn required_string(arguments: &Map<String, Value>, key: &str) -> Result<String> {
    match arguments.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(_) => Err(DevOpsError::Validation(format!("{} must be a string", key))),
        None => Err(DevOpsError::Validation(format!("{} is required", key))),
    }
}

fn optional_string(arguments: &Map<String, Value>, key: &str) -> Option<String> {
    arguments.get(key).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn test_search_params_valid() {
        let params =
            SearchParams::from_arguments(&args(json!({"query": "TODO", "repo": "Svc"}))).unwrap();
        assert_eq!(params.query, "TODO");
        assert_eq!(params.repo(), "Svc");
    }

    #[test]
    fn test_search_repo_defaults_to_empty() {
        let params = SearchParams::from_arguments(&args(json!({"query": "TODO"}))).unwrap();
        assert_eq!(params.repo(), "");

        let params =
            SearchParams::from_arguments(&args(json!({"query": "TODO", "repo": 42}))).unwrap();
        assert_eq!(params.repo(), "");

        let params =
            SearchParams::from_arguments(&args(json!({"query": "TODO", "repo": null}))).unwrap();
        assert_eq!(params.repo(), "");
    }

    #[test]
    fn test_search_query_must_be_string() {
        for bad in [json!({"query": 5}), json!({"query": ["a"]}), json!({"query": null})] {
            let err = SearchParams::from_arguments(&args(bad)).unwrap_err();
            assert!(matches!(err, DevOpsError::Validation(ref m) if m.contains("query")));
        }
    }

    #[test]
    fn test_search_query_required() {
        let err = SearchParams::from_arguments(&args(json!({"repo": "Svc"}))).unwrap_err();
        assert!(matches!(err, DevOpsError::Validation(_)));
    }

    #[test]
    fn test_search_empty_query_allowed() {
        let params = SearchParams::from_arguments(&args(json!({"query": ""}))).unwrap();
        assert_eq!(params.query, "");
    }

    #[test]
    fn test_read_params_valid() {
        let params = ReadParams::from_arguments(&args(
            json!({"repository": "Svc", "path": "/src/a.go", "branch": "dev"}),
        ))
        .unwrap();
        assert_eq!(params.repository, "Svc");
        assert_eq!(params.path, "/src/a.go");
        assert_eq!(params.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_read_params_missing_fields() {
        let err = ReadParams::from_arguments(&args(json!({"path": "/a"}))).unwrap_err();
        assert!(matches!(err, DevOpsError::Validation(ref m) if m.contains("repository")));

        let err = ReadParams::from_arguments(&args(json!({"repository": "Svc"}))).unwrap_err();
        assert!(matches!(err, DevOpsError::Validation(ref m) if m.contains("path")));

        let err =
            ReadParams::from_arguments(&args(json!({"repository": "Svc", "path": 1}))).unwrap_err();
        assert!(matches!(err, DevOpsError::Validation(_)));
    }

    #[test]
    fn test_read_branch_ignored_when_not_a_string() {
        let params = ReadParams::from_arguments(&args(
            json!({"repository": "Svc", "path": "/a", "branch": true}),
        ))
        .unwrap();
        assert!(params.branch.is_none());

        let params = ReadParams::from_arguments(&args(
            json!({"repository": "Svc", "path": "/a", "branch": ""}),
        ))
        .unwrap();
        assert!(params.branch.is_none());
    }
}
