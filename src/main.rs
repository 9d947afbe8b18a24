//! Warden server: session and access control for multi-tenant clinics.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use warden_api::{AppState, build_router};
use warden_auth::{AuthorizationGate, PasswordHasher, SessionManager, SessionStore, TokenCodec};
use warden_cache::CacheManager;
use warden_core::config::AppConfig;
use warden_core::config::logging::LogFormat;
use warden_database::repositories::{PgPolicyStore, TenantRepository, UserRepository};
use warden_database::seed::Seeder;
use warden_database::{DatabasePool, migration};
use warden_worker::jobs::{CacheProbeJob, SessionSweepJob};
use warden_worker::{CronScheduler, build_alert_sink};

/// Upper bound on waiting for queued alerts at shutdown.
const ALERT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Warden command line.
#[derive(Debug, Parser)]
#[command(name = "warden-server", version, about = "Session and access control server")]
struct Cli {
    /// Configuration overlay to load from `config/<env>.toml`.
    /// Falls back to `WARDEN_ENV`, then `development`.
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run migrations, seed, and serve HTTP (default).
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Apply migrations, seed initial data, and exit.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env = cli
        .env
        .or_else(|| std::env::var("WARDEN_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    let config = AppConfig::load(&env).context("failed to load configuration")?;
    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let db = DatabasePool::connect(&config.database).await?;
            migration::run_migrations(db.pool()).await?;
            db.close().await;
            Ok(())
        }
        Command::Seed => {
            let db = DatabasePool::connect(&config.database).await?;
            migration::run_migrations(db.pool()).await?;
            seed(&config, &db).await?;
            db.close().await;
            Ok(())
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn seed(config: &AppConfig, db: &DatabasePool) -> anyhow::Result<()> {
    let users = UserRepository::new(db.pool().clone());
    let tenants = TenantRepository::new(db.pool().clone());
    let policies = PgPolicyStore::load(db.pool().clone()).await?;
    let gate = AuthorizationGate::new(Arc::new(policies));
    Seeder::new(&users, &tenants, &gate).run(&config.seed).await?;
    tracing::info!("Seeding complete");
    Ok(())
}

/// Main server run function.
async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));

    // ── Database ─────────────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    migration::run_migrations(db.pool()).await?;

    // ── Cache ────────────────────────────────────────────────────
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Authorization ────────────────────────────────────────────
    let users = Arc::new(UserRepository::new(db.pool().clone()));
    let tenants = TenantRepository::new(db.pool().clone());
    let policies = Arc::new(PgPolicyStore::load(db.pool().clone()).await?);
    let gate = Arc::new(
        AuthorizationGate::new(policies)
            .with_timeout(Duration::from_millis(config.session.operation_timeout_ms)),
    );
    Seeder::new(&users, &tenants, &gate).run(&config.seed).await?;

    // ── Alerts & sessions ────────────────────────────────────────
    let (alerts, alert_worker) = build_alert_sink(&config.alert)?;
    let codec = Arc::new(TokenCodec::new(&config.auth).context("invalid token signing key")?);
    let store = Arc::new(SessionStore::new(Arc::clone(&cache), &config.session));
    let session_manager = Arc::new(SessionManager::new(
        codec,
        Arc::clone(&store),
        users.clone(),
        Arc::new(PasswordHasher::new()),
        Arc::clone(&alerts),
        &config.auth,
    ));

    // ── Housekeeping ─────────────────────────────────────────────
    let mut scheduler = if config.worker.enabled {
        let scheduler = CronScheduler::new(config.worker.clone()).await?;
        scheduler
            .register_default_tasks(
                SessionSweepJob::new(store.as_ref().clone()),
                CacheProbeJob::new(Arc::clone(&cache), Arc::clone(&alerts)),
            )
            .await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Housekeeping scheduler disabled");
        None
    };

    // ── HTTP ─────────────────────────────────────────────────────
    let state = AppState::new(
        Arc::new(config.clone()),
        cache,
        session_manager,
        gate,
        users,
        alerts,
    )
    .with_database(Arc::new(db.clone()));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Warden listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    // ── Shutdown ─────────────────────────────────────────────────
    tracing::info!("Shutting down background tasks...");
    if let Some(scheduler) = scheduler.as_mut()
        && let Err(e) = scheduler.shutdown().await
    {
        tracing::warn!(error = %e, "Scheduler shutdown failed");
    }
    drop(scheduler);
    db.close().await;

    if let Some(handle) = alert_worker
        && tokio::time::timeout(ALERT_DRAIN_TIMEOUT, handle).await.is_err()
    {
        tracing::warn!("Alert queue not drained before shutdown");
    }

    tracing::info!("Warden shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
