//! Recruit Daemon - Main Entry Point
//!
//! Composition root: configuration, logging, SQLite adapters, application
//! services, background tasks and the JSON-RPC server.

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{DaemonConfig, LogFormat};
use recruit_api_rpc::{RpcServer, RpcServerConfig, RpcServices};
use recruit_core::application::{
    notification_channel, shutdown_channel, ApplicationLifecycleManager, CompanyAccessResolver,
    EventLog, ExpirySweeper, JobPublishingManager, SubscriptionGate, SubscriptionManager,
};
use recruit_core::port::id_provider::UuidProvider;
use recruit_core::port::time_provider::SystemTimeProvider;
use recruit_core::port::{IdProvider, TimeProvider};
use recruit_infra_sqlite::{
    create_pool, run_migrations, SqliteApplicationRepository, SqliteCompanyRepository,
    SqliteCvLookup, SqliteEventRepository, SqliteJobRepository, SqliteNotificationRepository,
    SqliteSubscriptionRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration
    let config = DaemonConfig::load()?;

    // 2. Logging (+ optional OpenTelemetry layer)
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .context("Invalid log filter")?;

    let fmt_layer = match config.logging.format {
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(writer).boxed(),
    };

    let (tracer, telemetry_error) = match telemetry::init_tracer(&config.telemetry) {
        Ok(tracer) => (tracer, None),
        Err(e) => (None, Some(e)),
    };

    #[cfg(feature = "telemetry")]
    let otel_layer = tracer.map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));
    #[cfg(not(feature = "telemetry"))]
    let otel_layer = tracer.map(|()| tracing_subscriber::layer::Identity::new());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    info!("Recruit daemon v{} starting...", VERSION);
    if let Some(e) = telemetry_error {
        warn!(error = %e, "OpenTelemetry disabled (continuing without it)");
    }

    // 3. Database
    prepare_database_dir(&config)?;
    info!(database = %config.database.url, "Initializing database...");

    let pool = create_pool(&config.database.url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Dependencies (DI wiring)
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);

    let jobs = Arc::new(SqliteJobRepository::new(pool.clone()));
    let applications = Arc::new(SqliteApplicationRepository::new(pool.clone()));
    let event_store = Arc::new(SqliteEventRepository::new(pool.clone()));
    let companies = Arc::new(SqliteCompanyRepository::new(pool.clone()));
    let subscriptions = Arc::new(SqliteSubscriptionRepository::new(pool.clone()));
    let notifications = Arc::new(SqliteNotificationRepository::new(pool.clone()));
    let cv_lookup = Arc::new(SqliteCvLookup::new(pool.clone()));

    let access = Arc::new(CompanyAccessResolver::new(
        companies.clone(),
        companies.clone(),
    ));
    let gate = Arc::new(SubscriptionGate::new(
        subscriptions.clone(),
        subscriptions.clone(),
        id_provider.clone(),
        time_provider.clone(),
        config.free_plan,
    ));
    let events = Arc::new(EventLog::new(
        event_store,
        id_provider.clone(),
        time_provider.clone(),
    ));
    let (notifier, notification_worker) =
        notification_channel(notifications, id_provider.clone(), time_provider.clone());

    let lifecycle = Arc::new(ApplicationLifecycleManager::new(
        jobs.clone(),
        applications,
        events,
        access.clone(),
        gate.clone(),
        cv_lookup,
        notifier,
        id_provider.clone(),
        time_provider.clone(),
    ));
    let publishing = Arc::new(JobPublishingManager::new(
        jobs,
        access.clone(),
        gate.clone(),
        id_provider.clone(),
        time_provider.clone(),
        config.jobs,
    ));
    let subscription_manager = Arc::new(SubscriptionManager::new(
        access,
        gate,
        subscriptions.clone(),
        subscriptions,
        id_provider,
        time_provider,
    ));

    // 5. Background tasks
    let (shutdown_tx, shutdown_token) = shutdown_channel();

    info!("Starting notification worker...");
    let notification_handle = tokio::spawn(notification_worker.run(shutdown_token.clone()));

    info!(
        interval_secs = config.sweep.interval_secs,
        "Starting expiry sweeper..."
    );
    let sweeper = ExpirySweeper::new(publishing.clone(), config.sweep.interval_secs);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown_token));

    // 6. JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_server = RpcServer::new(
        RpcServerConfig::from(&config.rpc),
        RpcServices {
            lifecycle,
            publishing,
            subscriptions: subscription_manager,
        },
    );
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready");
    info!("Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown: stop intake first, then let workers flush
    if let Err(e) = rpc_handle.stop() {
        error!(error = %e, "RPC server stop failed");
    }
    rpc_handle.stopped().await;

    shutdown_tx.shutdown();
    for (name, handle) in [
        ("notification worker", notification_handle),
        ("expiry sweeper", sweeper_handle),
    ] {
        if tokio::time::timeout(SHUTDOWN_GRACE, handle).await.is_err() {
            warn!(task = name, "Background task did not stop in time");
        }
    }

    telemetry::shutdown();
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}

/// Create the parent directory of a file-backed database
fn prepare_database_dir(config: &DaemonConfig) -> Result<()> {
    if config.is_in_memory_db() {
        return Ok(());
    }

    let path = config
        .database
        .url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    Ok(())
}
