//! Baggage reconciliation server entry point.

mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use baggage_api::{AppState, router as api_router};
use baggage_common::Config;
use baggage_core::RepositoryStore;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::scheduler::{ServiceExecutor, run_scheduler};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baggage=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting baggage reconciliation server...");

    let config = Config::load()?;

    let db = baggage_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    baggage_db::migrate(&db).await?;
    info!("Migrations completed");

    let store = Arc::new(RepositoryStore::new(Arc::new(db)));
    let state = AppState::new(store, &config.reconciliation);

    if config.scheduler.enabled {
        let executor = Arc::new(ServiceExecutor::new(
            state.pass_service.clone(),
            state.notification_service.clone(),
        ));
        run_scheduler(
            Duration::from_secs(config.scheduler.pass_interval_secs),
            Duration::from_secs(config.scheduler.cleanup_interval_secs),
            executor,
        );
        info!(
            pass_interval_secs = config.scheduler.pass_interval_secs,
            "Reconciliation scheduler started"
        );
    }

    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
