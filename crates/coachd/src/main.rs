//! coachd - MR Coach dashboard daemon
//!
//! Serves aggregated statistics and listings over the feedback records the
//! review pipeline persists. Strictly read-only: the pipeline is the only
//! writer of the store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use coach_core::init_tracing;
use coach_state::SurrealFeedbackStore;

mod routes;

use routes::{build_router, AppContext};

/// Local fallback store when no SURREALDB_URL is configured.
const DEFAULT_DB_URL: &str = "surrealkv://.coach/db";

#[derive(Parser)]
#[command(name = "coachd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MR Coach feedback dashboard", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Feedback store URL
    #[arg(long, env = "SURREALDB_URL")]
    db_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let db_url = cli.db_url.unwrap_or_else(|| {
        info!(
            "No SURREALDB_URL configured, using local persistence: {}",
            DEFAULT_DB_URL
        );
        DEFAULT_DB_URL.to_string()
    });

    if let Some(path) = db_url.strip_prefix("surrealkv://") {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create database directory {path}"))?;
    }

    let store = SurrealFeedbackStore::connect(&db_url)
        .await
        .context("Failed to connect to feedback store")?;

    let ctx = Arc::new(AppContext {
        store: Arc::new(store),
    });

    let addr: SocketAddr = format!("0.0.0.0:{}", cli.port).parse()?;
    let router = build_router(ctx);

    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
