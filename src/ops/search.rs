use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::devops::{CodeSearchHit, CodeSearchRequest, DevOpsApi};
use crate::error::Result;

/// Upper bound on hits requested from code search. No paging past it.
pub const MAX_RESULTS: u32 = 1000;

/// One file matched by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    pub repository: String,
    pub path: String,
    pub file_name: String,
    pub project: String,
}

impl SearchRecord {
    /// `None` unless repository, path, file name and project are all present.
    pub fn from_hit(hit: CodeSearchHit) -> Option<Self> {
        Some(Self {
            repository: hit.repository?.name?,
            path: hit.path?,
            file_name: hit.file_name?,
            project: hit.project?.name?,
        })
    }
}

/// Code search scoped to the configured project.
#[derive(Clone)]
pub struct SearchOperation {
    api: Arc<dyn DevOpsApi>,
    project: String,
}

impl SearchOperation {
    pub fn new(api: Arc<dyn DevOpsApi>, project: impl Into<String>) -> Self {
        Self {
            api,
            project: project.into(),
        }
    }

    /// The query text goes through untouched; upstream owns its syntax.
    pub fn build_request(&self, query: &str, repo: &str) -> CodeSearchRequest {
        let mut filters = BTreeMap::new();
        filters.insert("Project".to_string(), vec![self.project.clone()]);
        if !repo.is_empty() {
            filters.insert("Repository".to_string(), vec![repo.to_string()]);
        }

        CodeSearchRequest {
            search_text: query.to_string(),
            skip: 0,
            top: MAX_RESULTS,
            filters,
            include_facets: false,
            include_snippet: true,
        }
    }

    /// Matching files in upstream order. No hits is an empty list.
    pub async fn execute(&self, query: &str, repo: &str) -> Result<Vec<SearchRecord>> {
        let request = self.build_request(query, repo);
        let response = self.api.search_code(&self.project, &request).await?;

        let hits = response.results.unwrap_or_default();
        let total = hits.len();
        let records: Vec<SearchRecord> = hits
            .into_iter()
            .filter_map(SearchRecord::from_hit)
            .collect();

        if records.len() < total {
            tracing::debug!(
                "Dropped {} incomplete search hits for {:?}",
                total - records.len(),
                query
            );
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops::fake::FakeApi;
    use crate::devops::{CodeSearchResponse, NamedRef};
    use crate::error::DevOpsError;

    fn hit(repo: Option<&str>, path: Option<&str>, file: Option<&str>) -> CodeSearchHit {
        CodeSearchHit {
            file_name: file.map(str::to_string),
            path: path.map(str::to_string),
            project: Some(NamedRef::named("HCC")),
            repository: repo.map(NamedRef::named),
        }
    }

    fn operation(api: FakeApi) -> (Arc<FakeApi>, SearchOperation) {
        let api = Arc::new(api);
        let op = SearchOperation::new(api.clone(), "HCC");
        (api, op)
    }

    #[test]
    fn test_request_without_repo_filter() {
        let (_, op) = operation(FakeApi::new());
        let request = op.build_request("TODO", "");

        assert_eq!(request.search_text, "TODO");
        assert_eq!(request.top, MAX_RESULTS);
        assert!(request.include_snippet);
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.filters["Project"], vec!["HCC".to_string()]);
    }

    #[test]
    fn test_request_with_repo_filter() {
        let (_, op) = operation(FakeApi::new());
        let request = op.build_request("ext:go TODO", "Svc");

        assert_eq!(request.search_text, "ext:go TODO");
        assert_eq!(request.filters["Repository"], vec!["Svc".to_string()]);
    }

    #[test]
    fn test_query_passed_verbatim() {
        let (_, op) = operation(FakeApi::new());
        let query = r#""quoted" AND path:/src/* OR (a\b)"#;
        assert_eq!(op.build_request(query, "").search_text, query);
    }

    #[test]
    fn test_from_hit_requires_all_fields() {
        assert!(SearchRecord::from_hit(hit(Some("Svc"), Some("/a.go"), Some("a.go"))).is_some());
        assert!(SearchRecord::from_hit(hit(None, Some("/a.go"), Some("a.go"))).is_none());
        assert!(SearchRecord::from_hit(hit(Some("Svc"), None, Some("a.go"))).is_none());
        assert!(SearchRecord::from_hit(hit(Some("Svc"), Some("/a.go"), None)).is_none());

        let mut no_project = hit(Some("Svc"), Some("/a.go"), Some("a.go"));
        no_project.project = None;
        assert!(SearchRecord::from_hit(no_project).is_none());

        let mut unnamed_repo = hit(Some("Svc"), Some("/a.go"), Some("a.go"));
        unnamed_repo.repository = Some(NamedRef::default());
        assert!(SearchRecord::from_hit(unnamed_repo).is_none());
    }

    #[test]
    fn test_record_json_shape() {
        let record = SearchRecord::from_hit(hit(Some("Svc"), Some("/src/a.go"), Some("a.go")))
            .unwrap();
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"repository":"Svc","path":"/src/a.go","fileName":"a.go","project":"HCC"}"#
        );
    }

    #[tokio::test]
    async fn test_execute_drops_incomplete_and_keeps_order() {
        let response = CodeSearchResponse {
            results: Some(vec![
                hit(Some("B"), Some("/b.rs"), Some("b.rs")),
                hit(None, Some("/x.rs"), Some("x.rs")),
                hit(Some("A"), Some("/a.rs"), Some("a.rs")),
                hit(Some("C"), None, Some("c.rs")),
            ]),
        };
        let (api, op) = operation(FakeApi::new().with_search_response(response));

        let records = op.execute("fn", "").await.unwrap();
        let repos: Vec<_> = records.iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(repos, vec!["B", "A"]);

        let (project, request) = api.last_search().unwrap();
        assert_eq!(project, "HCC");
        assert!(!request.filters.contains_key("Repository"));
    }

    #[tokio::test]
    async fn test_execute_null_results_is_empty() {
        let (_, op) = operation(FakeApi::new());
        let records = op.execute("nothing", "").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_execute_upstream_failure() {
        let (_, op) = operation(FakeApi::new().failing_with("code search returned HTTP 500"));
        let err = op.execute("TODO", "Svc").await.unwrap_err();
        assert!(matches!(err, DevOpsError::Upstream(_)));
    }
}
