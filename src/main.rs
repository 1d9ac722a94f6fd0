//! gitgate - Browse git repositories behind per-repository permissions
//!
//! # Usage
//! ```bash
//! gitgate --registry registry.json                 # Start server on 127.0.0.1:3001
//! gitgate --registry registry.json -p 8080         # Different port
//! gitgate --registry registry.json --user-header x-forwarded-user
//! ```
//!
//! Authentication happens upstream: a reverse proxy sets the username header.

use anyhow::Context;
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gitgate::{AppState, Cli, Registry, ServerConfig, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quieter for production)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let registry = Registry::load(&cli.registry)
        .with_context(|| format!("failed to load registry {}", cli.registry.display()))?;
    let state = AppState::new(registry, ServerConfig::from(&cli));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Serving registry {} on http://{}", cli.registry.display(), addr);
    println!("  gitgate listening on http://{}", addr);
    println!("  Press Ctrl+C to stop");

    // Set up graceful shutdown
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
