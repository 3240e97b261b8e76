//! YNAB MCP server entry point.
//!
//! Reads configuration (most importantly `YNAB_ACCESS_TOKEN`) from the
//! environment, verifies the token against the YNAB API once for the
//! startup log, then serves MCP tools and prompts over stdio.

mod auth;
mod client;
mod config;
mod error;
mod filter;
mod models;
mod params;
mod prompts;
mod response;
mod server;
#[cfg(test)]
mod testing;
mod widget;

use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::server::YnabMcpServer;

/// Runs the MCP server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client
/// cannot be built, or the stdio transport encounters an error.
async fn run() -> Result<(), Box<dyn core::error::Error>> {
    // Initialise tracing to stderr (stdout is used for MCP stdio transport).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting YNAB MCP server");

    let config = Config::from_env()?;
    tracing::debug!(
        api_base_url = %config.api_base_url,
        callback_url = %config.callback_url,
        read_only = config.read_only,
        timeout_secs = config.request_timeout.as_secs(),
        max_retries = config.max_retries,
        "configuration loaded"
    );
    if config.oauth_placeholders() {
        tracing::warn!("YNAB_CLIENT_ID/YNAB_CLIENT_SECRET are placeholders; OAuth flows disabled");
    }

    // Create MCP server and serve over stdio.
    let mcp_server = YnabMcpServer::new(config)?;
    mcp_server.log_startup_identity().await;
    let transport = (tokio::io::stdin(), tokio::io::stdout());
    let service = mcp_server.serve(transport).await?;

    tracing::info!("MCP server running on stdio");
    let _quit_reason = service.waiting().await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(%err, "fatal error");
        std::process::exit(1);
    }
}
