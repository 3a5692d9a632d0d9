//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that open the memory
//! engine and wire it into the MCP tool handler.

use crate::tools::OlivettiTools;
use anyhow::{Context, Result};
use olivetti::config::OlivettiConfig;
use olivetti::memory::MemoryEngine;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open the engine and restore the latest snapshot.
/// Returns (engine, config) wrapped in Arc for sharing.
fn setup_shared_state(
    config: OlivettiConfig,
) -> Result<(Arc<Mutex<MemoryEngine>>, Arc<OlivettiConfig>)> {
    let engine = MemoryEngine::open(&config).with_context(|| {
        format!(
            "failed to open memory at {}",
            config.resolved_snapshot_path().display()
        )
    })?;
    tracing::info!(
        snapshot = %engine.store().path().display(),
        encoder = %engine.encoder().name(),
        banks = engine.state().banks.len(),
        "memory engine ready"
    );

    Ok((Arc::new(Mutex::new(engine)), Arc::new(config)))
}

/// Checkpoint once more on shutdown so a failed write-through gets retried.
fn final_checkpoint(engine: &Mutex<MemoryEngine>) {
    match engine.lock() {
        Ok(engine) => {
            if let Err(e) = engine.save() {
                tracing::error!(error = %e, "final checkpoint failed");
            }
        }
        Err(e) => tracing::error!(error = %e, "engine lock poisoned at shutdown"),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: OlivettiConfig) -> Result<()> {
    tracing::info!("starting Olivetti MCP server on stdio");

    let (engine, config) = setup_shared_state(config)?;

    let tools = OlivettiTools::new(Arc::clone(&engine), config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running — waiting for client");

    server.waiting().await?;
    final_checkpoint(&engine);
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: OlivettiConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting Olivetti MCP server on SSE/HTTP");

    let (engine, config) = setup_shared_state(config)?;

    let service_engine = Arc::clone(&engine);
    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(OlivettiTools::new(service_engine.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down SSE server");
        })
        .await?;

    final_checkpoint(&engine);
    Ok(())
}
