use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common_error::api::handlers::AppStateInner;
use common_error::api::routes::create_router;
use common_error::config::Config;
use common_error::metrics;

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Starting graceful shutdown...");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,common_error=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting common-error demo v{}", env!("CARGO_PKG_VERSION"));

    metrics::registry::init_metrics();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Configuration loaded successfully");

    if config.errors.print_stack_trace {
        warn!("Stack traces are included in error responses; do not enable this in production");
    }

    let mapper = Arc::new(
        config
            .errors
            .build_mapper()
            .context("Failed to build exception mapper")?,
    );
    let state = Arc::new(AppStateInner::default());

    let app = create_router(state, mapper);

    let addr = config.server_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind server")?;

    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");

    Ok(())
}
