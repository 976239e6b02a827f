use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevOpsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Azure DevOps error: {0}")]
    Upstream(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("MCP error: {0}")]
    Mcp(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DevOpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_and_session_errors_are_distinct() {
        let transport = DevOpsError::Mcp("connection closed: initialize request".to_string());
        assert_eq!(
            transport.to_string(),
            "MCP error: connection closed: initialize request"
        );

        let session = DevOpsError::Connection("invalid URL".to_string());
        assert!(session.to_string().starts_with("Connection error:"));
    }
}
