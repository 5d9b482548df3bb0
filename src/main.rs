//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration from the environment (and an
//! optional `.env` file, or the file named by `MCP_ENV_FILE`), then serves
//! JSON-RPC over HTTP until Ctrl-C.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use hello_mcp_server::core::{Config, HttpTransport, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment (or MCP_ENV_FILE)
    let config = Config::load().context("Invalid configuration")?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!("Upstream API: {}", config.upstream.api_base);

    let transport = HttpTransport::new(config.http.clone());
    info!("Transport: {}", config.http.description());

    // Create the MCP server
    let server = McpServer::new(config).context("Failed to register tools")?;

    info!("Server initialized");

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; `RUST_LOG` directives are honored on top of `level`.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
