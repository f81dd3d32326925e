//! Votehall server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use votehall_api::{
    ConnectionRegistry, RegistryLimits, display_ws_handler, middleware::AppState,
    router as api_router, vote_ws_handler,
};
use votehall_common::Config;
use votehall_core::{EventLocks, EventService, ResultsService, SessionService};
use votehall_db::repositories::{
    CandidateRepository, DisplayStateRepository, EventCandidateRepository, EventRepository,
    VoteRepository,
};

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

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "votehall=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting votehall server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = votehall_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    votehall_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let event_repo = EventRepository::new(Arc::clone(&db));
    let slot_repo = EventCandidateRepository::new(Arc::clone(&db));
    let candidate_repo = CandidateRepository::new(Arc::clone(&db));
    let vote_repo = VoteRepository::new(Arc::clone(&db));
    let display_repo = DisplayStateRepository::new(Arc::clone(&db));

    // Per-event mutation locks shared by everything that drives the
    // state machine
    let locks = EventLocks::new();

    // Initialize services
    let event_service = EventService::new(
        event_repo.clone(),
        slot_repo.clone(),
        candidate_repo.clone(),
        vote_repo.clone(),
        display_repo.clone(),
        locks.clone(),
        config.voting.default_duration_sec,
    );
    let session_service = SessionService::new(
        event_repo.clone(),
        slot_repo.clone(),
        vote_repo.clone(),
        display_repo,
        locks,
    );
    let results_service =
        ResultsService::new(event_repo, slot_repo, candidate_repo, vote_repo);

    // Initialize connection registry
    let registry = ConnectionRegistry::new(RegistryLimits {
        max_connections: config.realtime.max_connections as usize,
        max_per_event: config.realtime.max_per_event as usize,
    });

    // Create app state
    let state = AppState {
        event_service,
        session_service,
        results_service,
        registry,
    };

    // Build router
    let app = Router::new()
        .route("/ws/vote/{link}", get(vote_ws_handler))
        .route("/ws/display/{link}", get(display_ws_handler))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
