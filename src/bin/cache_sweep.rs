use retrofit_forecast_service::{cache::sweeper, config::Config, db::{connection, forecast_cache}};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = Config::from_env();
    let pool = connection::establish_connection(&config.database_url).await?;

    let removed = sweeper::sweep_once(&pool, config.cache_ttl, chrono::Utc::now()).await?;
    let remaining = forecast_cache::count_entries(&pool).await?;
    info!("Removed {} expired cache rows, {} remain", removed, remaining);

    Ok(())
}
