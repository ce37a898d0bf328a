//! booking-server — table booking admission service
//!
//! Long-running service that:
//! - Decides admit/reject for booking requests against a SQLite store
//! - Reschedules and cancels existing bookings
//! - Answers availability queries for a table and slot

use booking_server::{Config, api, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "booking_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();

    tracing::info!("Starting booking-server (env: {})", config.environment);

    // Initialize application state (pools + migrations)
    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("booking-server HTTP listening on {addr}");

    // Graceful shutdown: stop accepting requests, then cancel the shutdown
    // token so in-flight admission transactions roll back instead of
    // committing after the server stopped.
    let shutdown = state.shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}
