use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use focus_api::background::rate_limit_sweep;
use focus_api::config::ServerConfig;
use focus_api::router::build_app_router;
use focus_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.database_path.display(),
        "Loaded server configuration"
    );

    // --- Database ---
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
    }

    let pool = focus_db::create_pool(&config.database_path)
        .await
        .context("Failed to open database")?;
    tracing::info!("Database connection pool created");

    focus_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    let applied = focus_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(applied, "Database migrations applied");

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let state = AppState::new(pool.clone(), config.clone());

    // --- Background tasks ---
    let cancel = CancellationToken::new();
    let sweep_handle = rate_limit_sweep::spawn_sweeper(state.rate_limiter.clone(), cancel.clone());

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!(%addr, "Starting server");

    let server_cancel = cancel.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { server_cancel.cancelled().await })
        .await
    });

    tokio::select! {
        result = &mut server => {
            // The server only returns on its own when something went wrong.
            cancel.cancel();
            result.context("Server task panicked")?.context("Server error")?;
        }
        () = shutdown_signal() => {
            cancel.cancel();
            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(Ok(Ok(()))) => tracing::info!("Server drained in-flight requests"),
                Ok(Ok(Err(e))) => tracing::error!(error = %e, "Server error during shutdown"),
                Ok(Err(e)) => tracing::error!(error = %e, "Server task panicked during shutdown"),
                Err(_) => {
                    tracing::warn!(
                        timeout_secs = shutdown_timeout.as_secs(),
                        "Shutdown timeout elapsed, aborting in-flight requests"
                    );
                    server.abort();
                }
            }
        }
    }

    // --- Post-shutdown cleanup ---
    let _ = tokio::time::timeout(Duration::from_secs(5), sweep_handle).await;
    tracing::info!("Rate limit sweep stopped");

    pool.close().await;
    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
