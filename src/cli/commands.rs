use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;

use devops_mcp::error::{DevOpsError, Result};
use devops_mcp::mcp::{Operation, ReadParams, SearchParams};
use devops_mcp::{Config, McpServer, OperationDispatcher, UpstreamSession};

#[derive(Parser)]
#[command(name = "devops-mcp")]
#[command(about = "MCP server for Azure DevOps code search and file reads")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Serve MCP over streamable HTTP on server.host:server.port
    devops-mcp serve

    # Serve MCP over stdio
    devops-mcp serve --transport stdio

    # Search the configured project
    devops-mcp search "TODO" --repo Svc

    # Print a file
    devops-mcp read Svc /src/main.go --branch develop

The access token can be supplied via the AZURE_DEVOPS_PAT environment variable.
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the YAML configuration file
    #[arg(long, global = true, default_value = "config.yaml")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server
    Serve {
        /// Transport to serve MCP over
        #[arg(long, value_enum, default_value_t = Transport::Http)]
        transport: Transport,

        /// Listen host (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Search code in the configured project
    Search {
        /// Search query, passed to Azure DevOps unchanged
        query: String,

        /// Restrict to one repository
        #[arg(long)]
        repo: Option<String>,
    },
    /// Print a file's content
    Read {
        /// Repository name (case-insensitive)
        repository: String,

        /// File path inside the repository
        path: String,

        /// Branch to read from
        #[arg(long)]
        branch: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Stdio,
    Http,
}

fn build_dispatcher(config: &Config) -> Result<(Arc<UpstreamSession>, OperationDispatcher)> {
    let session = Arc::new(UpstreamSession::connect(&config.azure_devops)?);
    let dispatcher = OperationDispatcher::new(session.clone(), &config.azure_devops.project);
    Ok((session, dispatcher))
}

pub async fn run_mcp_server(
    config: &Config,
    transport: Transport,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let (session, dispatcher) = build_dispatcher(config)?;
    session.verify().await?;
    let server = McpServer::new(dispatcher);

    match transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => {
            let mut settings = config.server.clone();
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            serve_http(server, &settings.listen_addr()).await
        }
    }
}

async fn serve_stdio(server: McpServer) -> Result<()> {
    use rmcp::ServiceExt;

    tracing::info!("Serving MCP over stdio");
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = server
        .serve(transport)
        .await
        .map_err(|e| DevOpsError::Mcp(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| DevOpsError::Mcp(e.to_string()))?;

    Ok(())
}

async fn serve_http(server: McpServer, addr: &str) -> Result<()> {
    use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
    use rmcp::transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService,
    };

    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("MCP server listening on http://{}/mcp", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

/// Cancelled on Ctrl-C so a one-shot command aborts its upstream call.
fn interrupt_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

pub async fn search(config: &Config, query: &str, repo: Option<String>) -> Result<()> {
    let (_, dispatcher) = build_dispatcher(config)?;
    let operation = Operation::Search(SearchParams {
        query: query.to_string(),
        repo,
    });

    let output = dispatcher.run(operation, &interrupt_token()).await?;
    println!("{}", output);
    Ok(())
}

pub async fn read(
    config: &Config,
    repository: &str,
    path: &str,
    branch: Option<String>,
) -> Result<()> {
    let (_, dispatcher) = build_dispatcher(config)?;
    let operation = Operation::Read(ReadParams {
        repository: repository.to_string(),
        path: path.to_string(),
        branch,
    });

    let output = dispatcher.run(operation, &interrupt_token()).await?;
    print!("{}", output);
    Ok(())
}
