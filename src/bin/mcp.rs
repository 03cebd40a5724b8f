use clap::Parser;
use dockerfile_ai::config::{AnalyzerConfig, ConfigOverrides};
use dockerfile_ai::mcp::DockerfileAiServer;
use dockerfile_ai::util::{init_logging, LoggingConfig};
use dockerfile_ai::VERSION;
use rmcp::ServiceExt;
use std::path::PathBuf;
use tracing::info;

/// MCP server exposing Dockerfile analysis over stdio
#[derive(Parser, Debug)]
#[command(name = "dockerfile-ai-mcp", version)]
struct McpArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Configuration file (default: ~/.dockerfileai.yaml)"
    )]
    config: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = McpArgs::parse();
    let overrides = ConfigOverrides {
        log_level: args.log_level.clone(),
        ..Default::default()
    };
    let config = AnalyzerConfig::load(args.config.as_deref(), &overrides)
        .inspect_err(|e| eprintln!("Configuration error: {}", e))?;

    // stdout carries the protocol; logs stay on stderr
    init_logging(LoggingConfig::from_settings(&config.logging));
    info!(
        "dockerfile-ai-mcp v{} starting (endpoint {}, model {})",
        VERSION,
        config.ollama.base_url(),
        config.ollama.model
    );

    let service = DockerfileAiServer::from_config(config)?
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| eprintln!("MCP server error: {}", e))?;
    service.waiting().await?;
    Ok(())
}
