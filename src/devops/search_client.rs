use super::models::{CodeSearchRequest, CodeSearchResponse};
use super::session::Connection;
use crate::error::Result;

/// Code search (`_apis/search`), served from the almsearch host.
#[derive(Clone)]
pub struct SearchClient {
    connection: Connection,
}

impl SearchClient {
    pub(crate) fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub async fn fetch_code_search_results(
        &self,
        project: &str,
        request: &CodeSearchRequest,
    ) -> Result<CodeSearchResponse> {
        let url = self
            .connection
            .url(&[project, "_apis", "search", "codesearchresults"])?;
        tracing::debug!(
            "Code search in project {}: {:?} (filters {:?})",
            project,
            request.search_text,
            request.filters
        );

        self.connection
            .send(self.connection.post(url).json(request), "code search")
            .await
    }
}
