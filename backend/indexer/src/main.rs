//! Crowdfunding Indexer
//!
//! Standalone service that:
//! 1. Polls Soroban RPC `getEvents` for the Crowdfunding contract
//! 2. Decodes and stores every event in SQLite
//! 3. Serves the history, donor totals and vote tallies over REST

mod api;
mod config;
mod db;
mod errors;
mod events;
mod poller;
mod rpc;

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::api::ApiState;
use crate::config::Config;
use crate::rpc::RpcClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load .env file if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    config.validate()?;

    info!(
        "Crowdfunding indexer starting - contract {}, RPC {}",
        config.contract_id, config.rpc_url
    );

    let pool = db::init_pool(&config.database_url)
        .await
        .context("failed to open database")?;
    let rpc = RpcClient::new(&config)?;

    let cancel = CancellationToken::new();
    let poller = tokio::spawn(poller::run(
        pool.clone(),
        rpc,
        config.clone(),
        cancel.clone(),
    ));

    let app = api::router(Arc::new(ApiState { pool }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("REST API listening on http://{addr}");

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    poller.await?;
    info!("Indexer stopped");
    Ok(())
}
