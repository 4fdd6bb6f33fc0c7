//! Claim Intake - API Server Binary
//!
//! This binary starts the HTTP API that hosts claim intake wizards for the
//! mobile client.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin intake-api
//!
//! # Run with environment variables
//! INTAKE_PORT=8080 INTAKE_SUBMISSION_BASE_URL=https://claims.example.lk/api cargo run --bin intake-api
//! ```
//!
//! # Environment Variables
//!
//! * `INTAKE_HOST` - Server host (default: 0.0.0.0)
//! * `INTAKE_PORT` - Server port (default: 8080)
//! * `INTAKE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `INTAKE_SUBMISSION_BASE_URL` - Base URL of the claims backend
//! * `INTAKE_SUBMISSION_TOKEN` - Bearer token for the claims backend
//! * `INTAKE_SUBMISSION_TIMEOUT_SECS` - Per-submission timeout (default: 30)
//! * `INTAKE_SESSION_IDLE_TIMEOUT_SECS` - Idle time before a wizard is closed (default: 1800)
//! * `INTAKE_SESSION_SWEEP_INTERVAL_SECS` - Idle wizard sweep interval (default: 60)

use std::net::SocketAddr;
use std::sync::Arc;

use domain_intake::{InMemoryDraftStore, RestSubmissionAdapter};
use interface_api::{config::ApiConfig, create_router, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Loads configuration, initializes logging, wires the claims backend
/// adapter and saved-drafts store, and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - The HTTP client for the claims backend cannot be built
/// - The configured address is invalid
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        claims_backend = %config.submission_base_url,
        "Starting Claim Intake API Server"
    );

    let submission_port = Arc::new(RestSubmissionAdapter::new(config.submission_config())?);
    let draft_store = Arc::new(InMemoryDraftStore::new());

    let state = AppState::new(config.clone(), submission_port, draft_store);
    let reaper = state.spawn_session_reaper();
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from the environment, falling back to defaults
/// when it cannot be parsed.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid INTAKE_* configuration ({}), using defaults", e);
        ApiConfig::default()
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// Lets in-flight requests, including pending claim submissions, complete
/// before the process exits.
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
