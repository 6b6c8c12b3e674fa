use std::sync::Arc;

use remix_pipeline::collaborators::Collaborators;
use remix_pipeline::toolkit::Toolkit;
use remix_pipeline::PipelineRunner;
use remix_worker::config::WorkerConfig;
use remix_worker::poller::QueuePoller;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remix_worker=debug,remix_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();
    tracing::info!(worker = %config.worker_name, "Worker starting");

    let database_url = config
        .database_url
        .as_deref()
        .expect("DATABASE_URL must be set");

    let pool = remix_db::create_pool(database_url, config.connect_timeout)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    remix_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    remix_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let runner = PipelineRunner::new(Collaborators::uniform(Arc::new(Toolkit::from_env())));
    let poller = QueuePoller::new(pool, runner, config.worker_name, config.poll_interval);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    poller.run(cancel).await;
    tracing::info!("Worker stopped");
}

/// Wait for SIGINT or SIGTERM. The in-flight job, if any, still completes.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT (Ctrl-C), finishing current job"),
        () = terminate => tracing::info!("Received SIGTERM, finishing current job"),
    }
}
