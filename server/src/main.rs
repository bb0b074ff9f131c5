//! Event Q&A HTTP server.

use anyhow::Context;
use axum::http::HeaderValue;
use eventqa_core::environment::SystemClock;
use eventqa_core::invite::LinkBuilder;
use eventqa_postgres::{PgDatabase, PgIdentityProvider};
use eventqa_server::{Config, mail, metrics};
use eventqa_web::{AppState, build_router, cors_layer};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventqa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Event Q&A server...");

    let config = Config::from_env()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        mail_provider = ?config.mail.provider,
        "Configuration loaded"
    );

    metrics::install_exporter(config.metrics.address()?)?;

    info!("Connecting to PostgreSQL...");
    let database =
        PgDatabase::connect(&config.postgres.url, &config.postgres.pool_options()).await?;
    database.migrate().await?;
    info!("Database migrations applied");

    let identity = PgIdentityProvider::new(database.pool().clone());
    let notifier = mail::notifier_from_config(&config.mail)?;

    let state = AppState::new(
        Arc::new(database),
        Arc::new(identity),
        notifier,
        Arc::new(SystemClock),
        LinkBuilder::new(config.server.ui_url.clone()),
    );

    let allowed_origin = config
        .server
        .cors_allowed_origin
        .as_deref()
        .map(HeaderValue::from_str)
        .transpose()
        .context("Invalid CORS_ALLOWED_ORIGIN")?;
    let app = build_router(state).layer(cors_layer(allowed_origin));

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result??;
            info!("Server stopped");
            return Ok(());
        }
        () = shutdown_signal() => {}
    }

    let _ = stop_tx.send(());
    let grace = Duration::from_secs(config.server.shutdown_timeout);
    match tokio::time::timeout(grace, server).await {
        Ok(result) => result??,
        Err(_) => warn!(timeout_secs = grace.as_secs(), "Shutdown timed out, dropping open connections"),
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
