//! # Lightning-Gateway RS
//!
//! Simulated payment gateway backend.
//!
//! ## Usage
//!
//! ```bash
//! # Reproducible settlement for local testing
//! export TEST_MODE=true
//! export TEST_PROCESSING_DELAY=1000
//! export TEST_PAYMENT_SUCCESS=true
//!
//! # Run the server
//! lightning-gateway
//! ```

use pay_api::{routes, state::AppConfig, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let config = AppConfig::from_env()?;
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Settlement mode: {}", state.processor.settlement_mode());

    if !is_prod {
        for entry in routes::route_table().entries() {
            info!("  {:<10} {:<40} {}", entry.methods, entry.path, entry.access);
        }
    }

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Lightning-Gateway starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Lightning-Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

fn print_banner() {
    println!(
        r#"
  ⚡ Lightning-Gateway RS ⚡
  ━━━━━━━━━━━━━━━━━━━━━━━━━
  Simulated payment gateway
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
