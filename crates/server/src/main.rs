//! Checkpool Server - HTTP REST API for the text-checking matcher pool
//!
//! This binary provides an HTTP server exposing the matcher pool via REST
//! endpoints with authentication and rate limiting. Matchers are
//! registered by embedding applications; run standalone it serves an empty
//! pool.

use server::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;

    // Start server
    server::start_server(config).await?;

    Ok(())
}
