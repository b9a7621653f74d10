// Load configuration
// Set up logging
// Open the SQLite cache database
// Start the cache sweeper
// Start HTTP server

use retrofit_forecast_service::{api, cache, config::Config, db, state::AppState};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting retrofit-forecast-service");

    let config = Config::from_env();
    tracing::info!("Configuration loaded: {:?}", config);

    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established");

    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(cache::sweeper::run(
        db_pool.clone(),
        config.cache_ttl,
        config.sweep_interval,
        shutdown.clone(),
    ));

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let app_state = Arc::new(AppState::new(config, db_pool));
    let app = api::create_router(app_state).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    shutdown.cancel();
    sweeper.await?;

    Ok(())
}
