use std::sync::Arc;

use remix_api::config::ServerConfig;
use remix_api::router::build_app_router;
use remix_api::state::AppState;
use remix_pipeline::collaborators::Collaborators;
use remix_pipeline::config::DispatchConfig;
use remix_pipeline::toolkit::Toolkit;
use remix_pipeline::{Dispatcher, PipelineRunner};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remix_api=debug,remix_pipeline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // --- Dispatch backend (chosen once) ---
    let toolkit = Arc::new(Toolkit::from_env());
    let storage = toolkit.storage().clone();
    let runner = PipelineRunner::new(Collaborators::uniform(toolkit));
    let dispatcher = Arc::new(Dispatcher::connect(&DispatchConfig::from_env(), runner).await);

    let state = AppState {
        config: Arc::new(config.clone()),
        dispatcher: Arc::clone(&dispatcher),
        storage,
    };
    let app = build_app_router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, backend = dispatcher.backend_name(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, draining jobs");
    dispatcher.shutdown().await;
    tracing::info!("Shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
