use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use companion_api::background::sweep;
use companion_api::config::ServerConfig;
use companion_api::router::build_app_router;
use companion_api::state::AppState;
use companion_core::profile::default_profiles;
use companion_db::repositories::CompanionRepo;
use companion_genai::{GenAiClient, GenAiConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "companion_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = companion_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    companion_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    companion_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready, migrations applied");

    let defaults = default_profiles().expect("Bundled companion profiles are invalid");
    let seeded = CompanionRepo::seed_if_empty(&pool, &defaults)
        .await
        .expect("Failed to seed companion profiles");
    if seeded > 0 {
        tracing::info!(seeded, "Seeded default companion profiles");
    }

    // --- Event bus ---
    let event_bus = Arc::new(companion_events::EventBus::default());
    let persistence_handle = tokio::spawn(companion_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- Generative AI ---
    let genai = GenAiClient::new(GenAiConfig::from_env());
    if !genai.config().is_configured() {
        tracing::warn!("GENAI_API_KEY is not set; chat, speech and profile drafts are disabled");
    }

    // --- Account sweep ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = tokio::spawn(sweep::run(
        pool.clone(),
        Arc::clone(&event_bus),
        Duration::from_secs(config.subscription_sweep_interval_secs),
        sweep_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        genai: Arc::new(genai),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    sweep_cancel.cancel();
    let _ = tokio::time::timeout(grace, sweep_handle).await;

    // Dropping the last sender closes the channel and ends persistence.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, persistence_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
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
