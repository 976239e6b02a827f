mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};
use devops_mcp::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devops_mcp=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Serve {
            transport,
            host,
            port,
        } => {
            cli::run_mcp_server(&config, transport, host, port).await?;
        }
        Commands::Search { query, repo } => {
            cli::search(&config, &query, repo).await?;
        }
        Commands::Read {
            repository,
            path,
            branch,
        } => {
            cli::read(&config, &repository, &path, branch).await?;
        }
    }

    Ok(())
}
