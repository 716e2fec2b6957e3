//! Bookstore server - binary entry point
//!
//! Loads the snapshots, starts the report scheduler, serves the REST API until
//! Ctrl+C, then stops the scheduler and writes the snapshots back.

use std::sync::Arc;

use bookstore::api::{create_router, AppState};
use bookstore::utils::cleanup_temp_files;
use bookstore::{Config, Context, ReportScheduler, Stores};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("{} v{}", bookstore::NAME, bookstore::VERSION);
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Reports directory: {}", config.reports_dir.display());
    tracing::info!("Listen address: {}", config.listen_addr);

    for dir in [&config.data_dir, &config.reports_dir] {
        match cleanup_temp_files(dir) {
            Ok(0) => {}
            Ok(n) => tracing::warn!("Removed {} leftover temp files from {}", n, dir.display()),
            Err(e) => tracing::warn!("Failed to clean temp files in {}: {}", dir.display(), e),
        }
    }

    let ctx = Context::background();
    let stores = Stores::new();
    if let Err(e) = stores.load_all(&ctx, &config.data_dir) {
        tracing::error!("Failed to load snapshots: {}", e);
        std::process::exit(1);
    }

    let scheduler = match ReportScheduler::spawn(stores.clone(), &config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!("Failed to start report scheduler: {}", e);
            std::process::exit(1);
        }
    };

    let app = create_router(Arc::new(AppState::from_config(stores.clone(), &config)));
    let served = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(listener) => {
            tracing::info!("Listening on {}", config.listen_addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
        }
        Err(e) => Err(e),
    };
    if let Err(e) = served {
        tracing::error!("Server error: {}", e);
    }

    scheduler.shutdown();

    if let Err(e) = stores.save_all(&ctx, &config.data_dir) {
        tracing::error!("Failed to save snapshots: {}", e);
    }
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, initiating shutdown...");
}
