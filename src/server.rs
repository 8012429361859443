//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, background workers and the Axum server
//! lifecycle, including graceful shutdown.

use crate::application::services::{AuthService, ClickIngestionService, LinkService, RedirectService};
use crate::application::workers::{ExpirationSweeper, run_click_worker};
use crate::config::Config;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{
    ClickRepository, DomainRepository, LinkRepository, TokenRepository, UserRepository,
};
use crate::infrastructure::geoip::build_geo_lookup;
use crate::infrastructure::notifier::build_notifier;
use crate::infrastructure::persistence::{
    PgClickRepository, PgDomainRepository, PgLinkRepository, PgTokenRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Creates the connection pool from the `DB_*` pool settings.
///
/// # Errors
///
/// Returns an error if the database is unreachable.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Background click worker and expiration sweeper
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the server stops accepting connections, the sweeper is
/// cancelled and the click worker drains the queue before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - The SMTP transport cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let domain_repository: Arc<dyn DomainRepository> =
        Arc::new(PgDomainRepository::new(pool.clone()));
    let click_repository: Arc<dyn ClickRepository> = Arc::new(PgClickRepository::new(pool.clone()));
    let user_repository: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let token_repository: Arc<dyn TokenRepository> = Arc::new(PgTokenRepository::new(pool.clone()));

    // Click pipeline
    let (click_tx, click_rx) = mpsc::channel::<ClickEvent>(config.click_queue_capacity);
    let geo = build_geo_lookup(config.geoip_db_path.as_deref());
    let ingestion = Arc::new(ClickIngestionService::new(
        click_repository,
        geo,
        config.geo_lookup_timeout(),
    ));
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        ingestion,
        config.click_worker_concurrency,
    ));

    // Expiration sweeper
    let notifier =
        build_notifier(config.smtp.as_ref()).context("Failed to set up SMTP notifier")?;
    let sweeper = ExpirationSweeper::new(
        link_repository.clone(),
        user_repository,
        notifier,
        config.sweep_interval(),
    )
    .start();

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            link_repository.clone(),
            domain_repository.clone(),
        )),
        redirect_service: Arc::new(RedirectService::new(link_repository, click_tx)),
        auth_service: Arc::new(AuthService::new(
            token_repository,
            config.token_signing_secret.clone(),
        )),
        domain_repository,
    };

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    // The router owns the last click sender, so the queue closes once
    // serving has finished.
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped, shutting down workers");

    sweeper.stop().await;

    if let Err(e) = click_worker.await {
        tracing::error!(error = %e, "click worker panicked");
    }

    pool.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
