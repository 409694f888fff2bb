//! QuotaHit MCP server binary.
//!
//! ## Usage
//!
//! ```bash
//! # Run with default database
//! quotahit-mcp
//!
//! # Run with a specific database
//! DATABASE_URL=sqlite://quotahit.db quotahit-mcp
//!
//! # Fail requests when the activity log cannot be written
//! QUOTAHIT_ACTIVITY_LOG=strict quotahit-mcp
//! ```

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotahit_core::AppConfig;
use quotahit_mcp::QuotaHitServer;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    info!(database_url = %config.database_url, "starting QuotaHit MCP server");

    let pool = quotahit_db::connect(&config.database_url).await?;
    quotahit_db::migrations::run_pending(&pool).await?;

    QuotaHitServer::new(pool, config.activity_log).run_stdio().await?;

    Ok(())
}
